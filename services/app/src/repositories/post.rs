//! Post repository: create, read, list, mutate and delete posts

use std::sync::Arc;

use backend::{BackendConfig, Databases, Query, Storage};
use common::error::{Error, Result};
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use crate::entity;
use crate::models::{NewPost, Post, SavedRecord, UpdatePost};
use crate::repositories::decode;
use crate::repositories::image::{discard_image, image_preview, upload_image};

/// Number of posts returned by the recent-posts listing
const RECENT_POSTS_LIMIT: u32 = 20;
/// Page size for the cursor-paginated feed
pub const FEED_PAGE_SIZE: u32 = 9;

/// Post repository for backend document and storage operations
#[derive(Clone)]
pub struct PostRepository {
    config: Arc<BackendConfig>,
    databases: Arc<dyn Databases>,
    storage: Arc<dyn Storage>,
}

impl PostRepository {
    /// Create a new post repository
    pub fn new(
        config: Arc<BackendConfig>,
        databases: Arc<dyn Databases>,
        storage: Arc<dyn Storage>,
    ) -> Self {
        Self {
            config,
            databases,
            storage,
        }
    }

    /// Create a post, uploading its image first
    ///
    /// Compensating actions: the uploaded file is deleted when preview
    /// derivation or the record write fails. The steps are not atomic; a
    /// crash between them can orphan the uploaded file.
    pub async fn create_post(&self, post: NewPost) -> Result<Post> {
        let post = entity::new_post(post)?;
        info!(user_id = %post.user_id, "creating post");

        let uploaded = upload_image(
            self.storage.as_ref(),
            &self.config.storage_id,
            post.files[0].clone(),
        )
        .await?;
        let image_url =
            match image_preview(self.storage.as_ref(), &self.config.storage_id, &uploaded.id) {
                Ok(url) => url,
                Err(err) => {
                    discard_image(self.storage.as_ref(), &self.config.storage_id, &uploaded.id)
                        .await;
                    return Err(err);
                }
            };

        let data = json!({
            "creator": post.user_id,
            "caption": post.caption,
            "imageUrl": image_url,
            "imageId": uploaded.id,
            "location": post.location,
            "tags": entity::split_tags(&post.tags),
        });
        let written = self
            .databases
            .create_document(
                &self.config.database_id,
                &self.config.post_collection_id,
                &Uuid::new_v4().to_string(),
                data,
            )
            .await;
        match written {
            Ok(document) => decode(document),
            Err(err) => {
                discard_image(self.storage.as_ref(), &self.config.storage_id, &uploaded.id).await;
                Err(err)
            }
        }
    }

    /// Update a post, optionally replacing its image
    ///
    /// The previous image file is deleted only after the new reference is
    /// durably stored; a failing record write rolls back the new upload and
    /// leaves the original record and image untouched.
    pub async fn update_post(&self, post: UpdatePost) -> Result<Post> {
        info!(post_id = %post.post_id, "updating post");
        let has_new_file = !post.files.is_empty();
        let mut image_url = post.image_url.clone();
        let mut image_id = post.image_id.clone();

        if has_new_file {
            let uploaded = upload_image(
                self.storage.as_ref(),
                &self.config.storage_id,
                post.files[0].clone(),
            )
            .await?;
            match image_preview(self.storage.as_ref(), &self.config.storage_id, &uploaded.id) {
                Ok(url) => {
                    image_url = url;
                    image_id = uploaded.id;
                }
                Err(err) => {
                    discard_image(self.storage.as_ref(), &self.config.storage_id, &uploaded.id)
                        .await;
                    return Err(err);
                }
            }
        }

        let data = json!({
            "caption": post.caption,
            "imageUrl": image_url,
            "imageId": image_id,
            "location": post.location,
            "tags": entity::split_tags(&post.tags),
        });
        let written = self
            .databases
            .update_document(
                &self.config.database_id,
                &self.config.post_collection_id,
                &post.post_id,
                data,
            )
            .await;
        let document = match written {
            Ok(document) => document,
            Err(err) => {
                if has_new_file {
                    discard_image(self.storage.as_ref(), &self.config.storage_id, &image_id).await;
                }
                return Err(err);
            }
        };

        if has_new_file && !post.image_id.is_empty() {
            discard_image(self.storage.as_ref(), &self.config.storage_id, &post.image_id).await;
        }

        decode(document)
    }

    /// Delete a post record and its image file
    ///
    /// Returns `Ok(false)` without touching the backend when either id is
    /// missing.
    pub async fn delete_post(&self, post_id: &str, image_id: &str) -> Result<bool> {
        if post_id.is_empty() || image_id.is_empty() {
            debug!("delete_post called without both identifiers, skipping");
            return Ok(false);
        }
        info!(post_id, "deleting post");
        self.databases
            .delete_document(
                &self.config.database_id,
                &self.config.post_collection_id,
                post_id,
            )
            .await?;
        self.storage
            .delete_file(&self.config.storage_id, image_id)
            .await?;
        Ok(true)
    }

    /// Overwrite the post's likes list
    ///
    /// Last-writer-wins: concurrent likes can race and lose updates, as the
    /// backend offers no server-side set semantics for this field.
    pub async fn like_post(&self, post_id: &str, likes: Vec<String>) -> Result<Post> {
        debug!(post_id, count = likes.len(), "updating likes");
        let document = self
            .databases
            .update_document(
                &self.config.database_id,
                &self.config.post_collection_id,
                post_id,
                json!({ "likes": likes }),
            )
            .await?;
        decode(document)
    }

    /// Fetch a post by record id
    pub async fn get_post_by_id(&self, post_id: &str) -> Result<Post> {
        if post_id.is_empty() {
            return Err(Error::Validation("missing post id".to_string()));
        }
        let document = self
            .databases
            .get_document(
                &self.config.database_id,
                &self.config.post_collection_id,
                post_id,
            )
            .await?;
        decode(document)
    }

    /// Posts created by a user, newest first
    pub async fn get_user_posts(&self, user_id: &str) -> Result<Vec<Post>> {
        if user_id.is_empty() {
            return Ok(Vec::new());
        }
        let queries = [
            Query::equal("creator", user_id),
            Query::order_desc("$createdAt"),
        ];
        self.list(&queries).await
    }

    /// The newest posts, capped at the recent-posts limit
    pub async fn get_recent_posts(&self) -> Result<Vec<Post>> {
        let queries = [
            Query::order_desc("$createdAt"),
            Query::limit(RECENT_POSTS_LIMIT),
        ];
        self.list(&queries).await
    }

    /// Posts whose caption matches the search term
    pub async fn search_posts(&self, term: &str) -> Result<Vec<Post>> {
        let queries = [Query::search("caption", term)];
        self.list(&queries).await
    }

    /// One page of the paginated feed, ordered by most recent update
    pub async fn get_posts_page(&self, cursor: Option<&str>) -> Result<Vec<Post>> {
        let mut queries = vec![Query::order_desc("$updatedAt"), Query::limit(FEED_PAGE_SIZE)];
        if let Some(cursor) = cursor {
            queries.push(Query::cursor_after(cursor)?);
        }
        self.list(&queries).await
    }

    /// Create a saved-post join record
    pub async fn save_post(&self, user_id: &str, post_id: &str) -> Result<SavedRecord> {
        info!(user_id, post_id, "saving post");
        let data = json!({ "user": user_id, "post": post_id });
        let document = self
            .databases
            .create_document(
                &self.config.database_id,
                &self.config.saves_collection_id,
                &Uuid::new_v4().to_string(),
                data,
            )
            .await?;
        decode(document)
    }

    /// Delete a saved-post join record
    pub async fn delete_saved_post(&self, saved_record_id: &str) -> Result<()> {
        info!(saved_record_id, "deleting saved-post record");
        self.databases
            .delete_document(
                &self.config.database_id,
                &self.config.saves_collection_id,
                saved_record_id,
            )
            .await
    }

    async fn list(&self, queries: &[Query]) -> Result<Vec<Post>> {
        let list = self
            .databases
            .list_documents(
                &self.config.database_id,
                &self.config.post_collection_id,
                queries,
            )
            .await?;
        list.documents.into_iter().map(decode).collect()
    }
}
