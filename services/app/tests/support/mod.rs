//! Shared mock backend services and fixtures for integration tests

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use backend::models::{AccountInfo, DocumentList, FileInput, Session, StoredFile};
use backend::{Account, Avatars, BackendConfig, Databases, Query, Storage};
use chrono::Utc;
use common::error::{Error, Result};
use serde_json::{Value, json};

use app::Client;
use app::repositories::UserRepository;
use app::repositories::post::PostRepository;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_test_writer()
        .try_init();
}

pub fn test_config() -> Arc<BackendConfig> {
    Arc::new(BackendConfig {
        endpoint: "http://localhost/v1".to_string(),
        project_id: "test".to_string(),
        api_key: None,
        database_id: "db".to_string(),
        user_collection_id: "users".to_string(),
        post_collection_id: "posts".to_string(),
        saves_collection_id: "saves".to_string(),
        storage_id: "media".to_string(),
    })
}

pub fn png(name: &str) -> FileInput {
    FileInput::new(name, "image/png", vec![0x89, 0x50, 0x4e, 0x47])
}

pub fn post_doc(id: &str, creator: &str, caption: &str) -> Value {
    json!({
        "$id": id,
        "creator": creator,
        "caption": caption,
        "imageUrl": format!("https://cdn.test/img-{id}/preview"),
        "imageId": format!("img-{id}"),
        "location": "",
        "tags": [],
        "likes": [],
        "$createdAt": Utc::now(),
        "$updatedAt": Utc::now(),
    })
}

pub fn user_doc(id: &str, account_id: &str, name: &str) -> Value {
    json!({
        "$id": id,
        "accountId": account_id,
        "name": name,
        "email": format!("{id}@example.com"),
        "username": id,
        "bio": "",
        "imageUrl": format!("https://cdn.test/avatars/{id}"),
        "imageId": "",
        "liked": [],
        "save": [],
        "$createdAt": Utc::now(),
        "$updatedAt": Utc::now(),
    })
}

/// In-memory database service with scripted list responses
#[derive(Default)]
pub struct MockDatabases {
    pub docs: Mutex<HashMap<String, Value>>,
    pub pages: Mutex<VecDeque<Vec<Value>>>,
    pub listed: Mutex<Vec<Vec<Query>>>,
    pub created: Mutex<Vec<(String, Value)>>,
    pub deleted: Mutex<Vec<(String, String)>>,
    pub fail_create: AtomicBool,
    pub fail_update: AtomicBool,
}

impl MockDatabases {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn seed(&self, id: &str, doc: Value) {
        self.docs.lock().unwrap().insert(id.to_string(), doc);
    }

    pub fn push_page(&self, docs: Vec<Value>) {
        self.pages.lock().unwrap().push_back(docs);
    }

    pub fn list_calls(&self) -> usize {
        self.listed.lock().unwrap().len()
    }
}

#[async_trait]
impl Databases for MockDatabases {
    async fn create_document(
        &self,
        _database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Value,
    ) -> Result<Value> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(Error::Transport("create rejected".to_string()));
        }
        let mut doc = data;
        if let Some(map) = doc.as_object_mut() {
            map.insert("$id".to_string(), json!(document_id));
            map.insert("$createdAt".to_string(), json!(Utc::now()));
            map.insert("$updatedAt".to_string(), json!(Utc::now()));
        }
        self.created
            .lock()
            .unwrap()
            .push((collection_id.to_string(), doc.clone()));
        self.docs
            .lock()
            .unwrap()
            .insert(document_id.to_string(), doc.clone());
        Ok(doc)
    }

    async fn get_document(
        &self,
        _database_id: &str,
        _collection_id: &str,
        document_id: &str,
    ) -> Result<Value> {
        self.docs
            .lock()
            .unwrap()
            .get(document_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(document_id.to_string()))
    }

    async fn list_documents(
        &self,
        _database_id: &str,
        _collection_id: &str,
        queries: &[Query],
    ) -> Result<DocumentList> {
        self.listed.lock().unwrap().push(queries.to_vec());
        let documents = self.pages.lock().unwrap().pop_front().unwrap_or_default();
        Ok(DocumentList {
            total: documents.len() as u64,
            documents,
        })
    }

    async fn update_document(
        &self,
        _database_id: &str,
        _collection_id: &str,
        document_id: &str,
        data: Value,
    ) -> Result<Value> {
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(Error::Transport("update rejected".to_string()));
        }
        let mut docs = self.docs.lock().unwrap();
        let doc = docs
            .get_mut(document_id)
            .ok_or_else(|| Error::NotFound(document_id.to_string()))?;
        if let (Some(target), Some(patch)) = (doc.as_object_mut(), data.as_object()) {
            for (key, value) in patch {
                target.insert(key.clone(), value.clone());
            }
            target.insert("$updatedAt".to_string(), json!(Utc::now()));
        }
        Ok(doc.clone())
    }

    async fn delete_document(
        &self,
        _database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> Result<()> {
        self.deleted
            .lock()
            .unwrap()
            .push((collection_id.to_string(), document_id.to_string()));
        self.docs.lock().unwrap().remove(document_id);
        Ok(())
    }
}

/// Storage service recording uploads and deletions
#[derive(Default)]
pub struct MockStorage {
    pub uploads: Mutex<Vec<String>>,
    pub deletions: Mutex<Vec<String>>,
    pub fail_upload: AtomicBool,
    pub fail_preview: AtomicBool,
    pub fail_delete: AtomicBool,
}

impl MockStorage {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn uploaded_ids(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn deleted_ids(&self) -> Vec<String> {
        self.deletions.lock().unwrap().clone()
    }
}

#[async_trait]
impl Storage for MockStorage {
    async fn create_file(
        &self,
        _bucket_id: &str,
        file_id: &str,
        file: FileInput,
    ) -> Result<StoredFile> {
        if self.fail_upload.load(Ordering::SeqCst) {
            return Err(Error::Transport("upload rejected".to_string()));
        }
        self.uploads.lock().unwrap().push(file_id.to_string());
        Ok(StoredFile {
            id: file_id.to_string(),
            name: file.name,
        })
    }

    fn file_preview(&self, _bucket_id: &str, file_id: &str) -> Result<String> {
        if self.fail_preview.load(Ordering::SeqCst) {
            return Err(Error::Preview("preview unavailable".to_string()));
        }
        Ok(format!("https://cdn.test/{file_id}/preview"))
    }

    async fn delete_file(&self, _bucket_id: &str, file_id: &str) -> Result<()> {
        self.deletions.lock().unwrap().push(file_id.to_string());
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(Error::Transport("delete rejected".to_string()));
        }
        Ok(())
    }
}

/// Account service with a single in-memory session slot
#[derive(Default)]
pub struct MockAccount {
    pub current: Mutex<Option<AccountInfo>>,
    pub created: Mutex<Vec<AccountInfo>>,
    pub deleted_sessions: Mutex<Vec<String>>,
    pub fail_create: AtomicBool,
}

impl MockAccount {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_current(&self, info: AccountInfo) {
        *self.current.lock().unwrap() = Some(info);
    }
}

#[async_trait]
impl Account for MockAccount {
    async fn create(
        &self,
        account_id: &str,
        email: &str,
        _password: &str,
        name: &str,
    ) -> Result<AccountInfo> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(Error::Transport("account rejected".to_string()));
        }
        let info = AccountInfo {
            id: account_id.to_string(),
            name: name.to_string(),
            email: email.to_string(),
        };
        self.created.lock().unwrap().push(info.clone());
        *self.current.lock().unwrap() = Some(info.clone());
        Ok(info)
    }

    async fn create_email_session(&self, _email: &str, _password: &str) -> Result<Session> {
        let user_id = self
            .current
            .lock()
            .unwrap()
            .as_ref()
            .map(|info| info.id.clone())
            .unwrap_or_default();
        Ok(Session {
            id: "session-1".to_string(),
            user_id,
            secret: "secret-1".to_string(),
            expire: None,
        })
    }

    async fn get(&self) -> Result<AccountInfo> {
        self.current
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| Error::NotFound("no active session".to_string()))
    }

    async fn delete_session(&self, session_id: &str) -> Result<()> {
        self.deleted_sessions
            .lock()
            .unwrap()
            .push(session_id.to_string());
        *self.current.lock().unwrap() = None;
        Ok(())
    }
}

/// Deterministic avatar URLs
pub struct MockAvatars;

impl Avatars for MockAvatars {
    fn initials_url(&self, name: &str) -> Result<String> {
        Ok(format!(
            "https://cdn.test/avatars/{}",
            name.to_lowercase().replace(' ', "-")
        ))
    }
}

pub fn post_repo(databases: &Arc<MockDatabases>, storage: &Arc<MockStorage>) -> PostRepository {
    PostRepository::new(test_config(), databases.clone(), storage.clone())
}

pub fn user_repo(databases: &Arc<MockDatabases>, storage: &Arc<MockStorage>) -> UserRepository {
    UserRepository::new(test_config(), databases.clone(), storage.clone())
}

pub fn client(
    databases: &Arc<MockDatabases>,
    storage: &Arc<MockStorage>,
    account: &Arc<MockAccount>,
) -> Client {
    Client::with_services(
        test_config(),
        databases.clone(),
        storage.clone(),
        account.clone(),
        Arc::new(MockAvatars),
    )
}
