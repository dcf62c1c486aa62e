//! Client for the managed backend platform
//!
//! The platform provides account, database, storage and avatar services.
//! Each service is exposed as a trait so repositories can be tested against
//! substitutes; [`HttpClient`] implements all of them over the platform
//! REST API.

pub mod account;
pub mod avatars;
pub mod client;
pub mod config;
pub mod databases;
pub mod models;
pub mod query;
pub mod storage;

pub use account::Account;
pub use avatars::Avatars;
pub use client::HttpClient;
pub use config::BackendConfig;
pub use databases::Databases;
pub use query::Query;
pub use storage::Storage;
