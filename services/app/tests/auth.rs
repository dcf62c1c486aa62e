//! Auth flows: sign-up, session fetch and sign-out

mod support;

use std::sync::Arc;

use backend::Query;
use backend::models::AccountInfo;
use common::error::Error;

use app::auth::AuthService;
use app::models::NewUser;
use support::*;

fn auth(
    databases: &Arc<MockDatabases>,
    storage: &Arc<MockStorage>,
    account: &Arc<MockAccount>,
) -> AuthService {
    AuthService::new(
        account.clone(),
        Arc::new(MockAvatars),
        user_repo(databases, storage),
    )
}

fn signup() -> NewUser {
    NewUser {
        name: "Ada Lovelace".to_string(),
        email: "  Ada@Example.COM ".to_string(),
        password: "s3cret".to_string(),
        username: None,
    }
}

#[tokio::test]
async fn sign_up_creates_the_account_and_the_profile() {
    init_tracing();
    let databases = MockDatabases::new();
    let storage = MockStorage::new();
    let account = MockAccount::new();
    let auth = auth(&databases, &storage, &account);

    let user = auth.create_user_account(signup()).await.unwrap();

    let accounts = account.created.lock().unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].email, "ada@example.com");

    let created = databases.created.lock().unwrap();
    assert_eq!(created.len(), 1);
    let (collection, doc) = &created[0];
    assert_eq!(collection, "users");
    assert_eq!(doc["accountId"].as_str().unwrap(), accounts[0].id);
    assert_eq!(
        doc["imageUrl"].as_str().unwrap(),
        "https://cdn.test/avatars/ada-lovelace"
    );

    let pattern = regex::Regex::new(r"^ada_lovelace\d{1,3}$").unwrap();
    assert!(pattern.is_match(&user.username));
}

#[tokio::test]
async fn invalid_sign_up_makes_no_backend_call() {
    let databases = MockDatabases::new();
    let storage = MockStorage::new();
    let account = MockAccount::new();
    let auth = auth(&databases, &storage, &account);

    let mut missing_email = signup();
    missing_email.email = "   ".to_string();
    let err = auth.create_user_account(missing_email).await.unwrap_err();

    assert!(matches!(err, Error::Validation(_)));
    assert!(account.created.lock().unwrap().is_empty());
    assert!(databases.created.lock().unwrap().is_empty());
}

#[tokio::test]
async fn profile_write_failure_leaves_the_account_and_propagates() {
    let databases = MockDatabases::new();
    let storage = MockStorage::new();
    let account = MockAccount::new();
    databases
        .fail_create
        .store(true, std::sync::atomic::Ordering::SeqCst);
    let auth = auth(&databases, &storage, &account);

    let err = auth.create_user_account(signup()).await.unwrap_err();

    assert!(matches!(err, Error::Transport(_)));
    // The backend account was created and cannot be rolled back from here.
    assert_eq!(account.created.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn current_user_is_none_without_a_session() {
    let databases = MockDatabases::new();
    let storage = MockStorage::new();
    let account = MockAccount::new();
    let auth = auth(&databases, &storage, &account);

    assert_eq!(auth.get_current_user().await.unwrap(), None);
    assert_eq!(databases.list_calls(), 0);
}

#[tokio::test]
async fn current_user_resolves_the_profile_for_the_session() {
    let databases = MockDatabases::new();
    let storage = MockStorage::new();
    let account = MockAccount::new();
    account.set_current(AccountInfo {
        id: "acc-1".to_string(),
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
    });
    databases.push_page(vec![user_doc("user-1", "acc-1", "Ada")]);
    let auth = auth(&databases, &storage, &account);

    let user = auth.get_current_user().await.unwrap().unwrap();

    assert_eq!(user.id, "user-1");
    assert_eq!(
        databases.listed.lock().unwrap()[0],
        vec![Query::equal("accountId", "acc-1")]
    );
}

#[tokio::test]
async fn current_user_is_none_without_a_profile_record() {
    let databases = MockDatabases::new();
    let storage = MockStorage::new();
    let account = MockAccount::new();
    account.set_current(AccountInfo {
        id: "acc-1".to_string(),
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
    });
    databases.push_page(vec![]);
    let auth = auth(&databases, &storage, &account);

    assert_eq!(auth.get_current_user().await.unwrap(), None);
}

#[tokio::test]
async fn sign_in_then_sign_out_round_trips_the_session() {
    let databases = MockDatabases::new();
    let storage = MockStorage::new();
    let account = MockAccount::new();
    account.set_current(AccountInfo {
        id: "acc-1".to_string(),
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
    });
    let auth = auth(&databases, &storage, &account);

    let session = auth.sign_in("ada@example.com", "s3cret").await.unwrap();
    assert_eq!(session.user_id, "acc-1");

    auth.sign_out().await.unwrap();
    assert_eq!(
        account.deleted_sessions.lock().unwrap().clone(),
        vec!["current".to_string()]
    );
    assert!(matches!(auth.get_account().await, Err(Error::NotFound(_))));
}
