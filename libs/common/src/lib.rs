//! Common library for the Photogram application
//!
//! This crate provides shared functionality used across the Photogram
//! crates: the error taxonomy for backend operations and the query cache
//! backing the cached client surface.

pub mod cache;
pub mod error;
