//! Wire models exchanged with the backend platform

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One page of documents from a list operation
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentList {
    pub total: u64,
    pub documents: Vec<Value>,
}

/// Backend account record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccountInfo {
    #[serde(rename = "$id")]
    pub id: String,
    pub name: String,
    pub email: String,
}

/// An authenticated session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(rename = "$id")]
    pub id: String,
    pub user_id: String,
    /// Secret echoed back to the backend on subsequent calls
    #[serde(default)]
    pub secret: String,
    #[serde(default)]
    pub expire: Option<DateTime<Utc>>,
}

/// Metadata for a stored file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredFile {
    #[serde(rename = "$id")]
    pub id: String,
    pub name: String,
}

/// An in-memory file handed to the storage service for upload
#[derive(Debug, Clone, Default)]
pub struct FileInput {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl FileInput {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
        }
    }
}
