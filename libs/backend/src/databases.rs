//! Database service boundary

use async_trait::async_trait;
use common::error::Result;
use serde_json::Value;

use crate::models::DocumentList;
use crate::query::Query;

/// Document CRUD against named database/collection identifiers
#[async_trait]
pub trait Databases: Send + Sync {
    /// Create a document with a caller-chosen id
    async fn create_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Value,
    ) -> Result<Value>;

    /// Fetch a single document; `Error::NotFound` when absent
    async fn get_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> Result<Value>;

    /// List documents matching the given query descriptors
    async fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
        queries: &[Query],
    ) -> Result<DocumentList>;

    /// Patch a document and return the updated record
    async fn update_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Value,
    ) -> Result<Value>;

    /// Delete a document
    async fn delete_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> Result<()>;
}
