//! Backend connection configuration

use std::env;

/// Identifiers for the backend project and its collections
///
/// A plain value passed explicitly into every service and repository so
/// tests can substitute their own; there is no process-wide singleton.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// Base URL of the backend REST API (e.g. "https://cloud.example.com/v1")
    pub endpoint: String,
    /// Project identifier sent with every request
    pub project_id: String,
    /// Optional server API key for trusted contexts
    pub api_key: Option<String>,
    /// Database holding the application collections
    pub database_id: String,
    /// Users collection
    pub user_collection_id: String,
    /// Posts collection
    pub post_collection_id: String,
    /// Saved-post join records collection
    pub saves_collection_id: String,
    /// Storage bucket for uploaded images
    pub storage_id: String,
}

impl BackendConfig {
    /// Create a new BackendConfig from environment variables
    pub fn from_env() -> Self {
        Self {
            endpoint: env::var("PHOTOGRAM_ENDPOINT")
                .unwrap_or_else(|_| "http://localhost/v1".to_string()),
            project_id: env::var("PHOTOGRAM_PROJECT_ID")
                .unwrap_or_else(|_| "photogram".to_string()),
            api_key: env::var("PHOTOGRAM_API_KEY").ok(),
            database_id: env::var("PHOTOGRAM_DATABASE_ID")
                .unwrap_or_else(|_| "photogram".to_string()),
            user_collection_id: env::var("PHOTOGRAM_USER_COLLECTION_ID")
                .unwrap_or_else(|_| "users".to_string()),
            post_collection_id: env::var("PHOTOGRAM_POST_COLLECTION_ID")
                .unwrap_or_else(|_| "posts".to_string()),
            saves_collection_id: env::var("PHOTOGRAM_SAVES_COLLECTION_ID")
                .unwrap_or_else(|_| "saves".to_string()),
            storage_id: env::var("PHOTOGRAM_STORAGE_ID").unwrap_or_else(|_| "media".to_string()),
        }
    }
}
