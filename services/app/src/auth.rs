//! Account lifecycle flows: sign-up, sign-in, session fetch and sign-out

use std::sync::Arc;

use backend::models::{AccountInfo, Session};
use backend::{Account, Avatars};
use common::error::{Error, Result};
use tracing::{info, warn};
use uuid::Uuid;

use crate::entity;
use crate::models::{NewUser, User, UserProfile};
use crate::repositories::UserRepository;

/// Auth flows on top of the account service and the user repository
#[derive(Clone)]
pub struct AuthService {
    account: Arc<dyn Account>,
    avatars: Arc<dyn Avatars>,
    users: UserRepository,
}

impl AuthService {
    /// Create a new auth service
    pub fn new(account: Arc<dyn Account>, avatars: Arc<dyn Avatars>, users: UserRepository) -> Self {
        Self {
            account,
            avatars,
            users,
        }
    }

    /// Create a backend account and its profile record
    ///
    /// Not atomic: when the profile write fails the account already exists
    /// and the platform offers no client-side way to remove it, so an
    /// inconsistency window remains. The orphaned account id is logged
    /// before the error propagates.
    pub async fn create_user_account(&self, user: NewUser) -> Result<User> {
        let user = entity::new_user(user)?;
        let username = user.username.clone().unwrap_or_default();
        info!(email = %user.email, username = %username, "creating user account");

        let account = self
            .account
            .create(
                &Uuid::new_v4().to_string(),
                &user.email,
                &user.password,
                &user.name,
            )
            .await?;
        let avatar_url = self.avatars.initials_url(&account.name)?;

        let profile = UserProfile {
            account_id: account.id.clone(),
            name: account.name.clone(),
            email: account.email.clone(),
            username,
            image_url: avatar_url,
        };
        match self.users.save_user(&profile).await {
            Ok(saved) => Ok(saved),
            Err(err) => {
                warn!(
                    account_id = %account.id,
                    "profile write failed after account creation, account is orphaned"
                );
                Err(err)
            }
        }
    }

    /// Start an email/password session
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        info!(email, "signing in");
        self.account.create_email_session(email, password).await
    }

    /// The currently authenticated backend account
    pub async fn get_account(&self) -> Result<AccountInfo> {
        self.account.get().await
    }

    /// Profile record for the active session
    ///
    /// `Ok(None)` means "not logged in": no active session, or no profile
    /// record matching the account. Transport failures surface as errors.
    pub async fn get_current_user(&self) -> Result<Option<User>> {
        let account = match self.account.get().await {
            Ok(account) => account,
            Err(Error::NotFound(_)) => return Ok(None),
            Err(err) => return Err(err),
        };
        self.users.find_by_account_id(&account.id).await
    }

    /// End the current session
    pub async fn sign_out(&self) -> Result<()> {
        info!("signing out");
        self.account.delete_session("current").await
    }
}
