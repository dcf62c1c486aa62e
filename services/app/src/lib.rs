//! Photogram data-access layer
//!
//! Domain models, the entity factory, user/post repositories, auth flows
//! and the cached client surface consumed by the UI.

pub mod auth;
pub mod entity;
pub mod models;
pub mod queries;
pub mod repositories;

pub use queries::{Client, PostFeed, QueryKey};
