//! Account service boundary

use async_trait::async_trait;
use common::error::Result;

use crate::models::{AccountInfo, Session};

/// Account and session lifecycle
#[async_trait]
pub trait Account: Send + Sync {
    /// Create a backend account
    async fn create(
        &self,
        account_id: &str,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<AccountInfo>;

    /// Start an email/password session
    async fn create_email_session(&self, email: &str, password: &str) -> Result<Session>;

    /// The currently authenticated account; `Error::NotFound` when no
    /// session is active
    async fn get(&self) -> Result<AccountInfo>;

    /// Delete a session by id ("current" for the active one)
    async fn delete_session(&self, session_id: &str) -> Result<()>;
}
