//! User model and related payloads

use backend::models::FileInput;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User profile record as stored in the users collection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "$id")]
    pub id: String,
    /// Backend account backing this profile
    pub account_id: String,
    pub name: String,
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub bio: String,
    pub image_url: String,
    #[serde(default)]
    pub image_id: String,
    /// Ids of posts this user has liked
    #[serde(default)]
    pub liked: Vec<String>,
    /// Saved-post join records owned by this user
    #[serde(default)]
    pub save: Vec<SavedRecord>,
    #[serde(rename = "$createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "$updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Join record linking a user to a saved post
///
/// Distinct from the `likes` array stored on the post itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SavedRecord {
    #[serde(rename = "$id")]
    pub id: String,
    pub user: String,
    pub post: String,
}

/// Sign-up payload
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    /// Derived from the name when not supplied
    pub username: Option<String>,
}

/// Profile record persisted on sign-up
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub account_id: String,
    pub name: String,
    pub email: String,
    pub username: String,
    pub image_url: String,
}

/// Profile update payload
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    pub user_id: String,
    pub name: String,
    pub bio: String,
    /// Current avatar reference, kept when no new file is attached
    pub image_url: String,
    pub image_id: String,
    /// A non-empty list replaces the avatar image
    pub files: Vec<FileInput>,
}
