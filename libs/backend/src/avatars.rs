//! Avatar service boundary

use common::error::Result;

/// Generated avatar images
pub trait Avatars: Send + Sync {
    /// URL of an initials-based avatar image for the given display name
    fn initials_url(&self, name: &str) -> Result<String>;
}
