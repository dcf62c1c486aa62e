//! Error taxonomy for the data-access layer
//!
//! Every fallible operation in the workspace returns [`Result`]; failures
//! are never swallowed into empty results.

use thiserror::Error;

/// Failure categories for backend-facing operations
///
/// The type is `Clone` so the cache can hand one failed fetch to every
/// caller that was awaiting the same in-flight request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed caller input, raised before any network call
    #[error("invalid input: {0}")]
    Validation(String),

    /// File upload failed
    #[error("file upload failed: {0}")]
    Upload(String),

    /// Preview derivation failed after a successful upload
    #[error("preview derivation failed: {0}")]
    Preview(String),

    /// Requested record is absent
    #[error("not found: {0}")]
    NotFound(String),

    /// Backend call failed in transit or was rejected
    #[error("backend call failed: {0}")]
    Transport(String),

    /// Backend payload did not match the expected shape
    #[error("unexpected backend payload: {0}")]
    Decode(String),
}

impl Error {
    /// Wrap a serde error as a decode failure
    pub fn decode(err: serde_json::Error) -> Self {
        Error::Decode(err.to_string())
    }
}

/// Type alias for Result with the shared [`Error`]
pub type Result<T> = std::result::Result<T, Error>;
