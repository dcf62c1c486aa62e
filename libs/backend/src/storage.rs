//! Storage service boundary

use async_trait::async_trait;
use common::error::Result;

use crate::models::{FileInput, StoredFile};

/// File upload, preview derivation and deletion within a storage bucket
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload a file under a caller-chosen id
    async fn create_file(&self, bucket_id: &str, file_id: &str, file: FileInput)
    -> Result<StoredFile>;

    /// Derive the preview URL for a stored file
    ///
    /// Previews use a fixed 2000x2000 crop, top gravity and full quality.
    fn file_preview(&self, bucket_id: &str, file_id: &str) -> Result<String>;

    /// Delete a stored file
    async fn delete_file(&self, bucket_id: &str, file_id: &str) -> Result<()>;
}
