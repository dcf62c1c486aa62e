//! Domain models for the Photogram data layer

pub mod post;
pub mod user;

pub use post::{NewPost, Post, UpdatePost};
pub use user::{NewUser, SavedRecord, UpdateUser, User, UserProfile};
