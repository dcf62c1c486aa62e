//! Post model and related payloads

use backend::models::FileInput;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Post record as stored in the posts collection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(rename = "$id")]
    pub id: String,
    /// Id of the user who created the post
    pub creator: String,
    pub caption: String,
    pub image_url: String,
    pub image_id: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Ids of users who liked this post; overwritten wholesale by like
    /// operations
    #[serde(default)]
    pub likes: Vec<String>,
    #[serde(rename = "$createdAt")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "$updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// New post payload
///
/// `tags` is a comma-separated string until persistence, where it is split
/// into an array.
#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub user_id: String,
    pub caption: String,
    pub files: Vec<FileInput>,
    pub location: String,
    pub tags: String,
}

/// Post update payload
#[derive(Debug, Clone, Default)]
pub struct UpdatePost {
    pub post_id: String,
    pub caption: String,
    /// Current image reference, kept when no new file is attached
    pub image_url: String,
    pub image_id: String,
    /// A non-empty list replaces the image
    pub files: Vec<FileInput>,
    pub location: String,
    pub tags: String,
}
