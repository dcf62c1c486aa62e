//! Repositories translating domain operations into backend calls
//!
//! Every operation returns an explicit `Result`; failures are surfaced to
//! the caller, never degraded into empty values.

use std::sync::Arc;

use backend::models::{FileInput, StoredFile};
use backend::{BackendConfig, Databases, Query, Storage};
use common::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{UpdateUser, User, UserProfile};
use crate::repositories::image::{discard_image, image_preview, upload_image};

pub mod post;

pub(crate) fn decode<T: DeserializeOwned>(document: Value) -> Result<T> {
    serde_json::from_value(document).map_err(Error::decode)
}

/// Image handling shared by the post and user repositories
pub(crate) mod image {
    use super::*;

    /// Upload a file under a fresh id, mapping any failure to `Upload`
    pub(crate) async fn upload_image(
        storage: &dyn Storage,
        bucket_id: &str,
        file: FileInput,
    ) -> Result<StoredFile> {
        storage
            .create_file(bucket_id, &Uuid::new_v4().to_string(), file)
            .await
            .map_err(|err| Error::Upload(err.to_string()))
    }

    /// Derive the preview URL for an uploaded file, mapping any failure to
    /// `Preview`
    pub(crate) fn image_preview(
        storage: &dyn Storage,
        bucket_id: &str,
        file_id: &str,
    ) -> Result<String> {
        storage
            .file_preview(bucket_id, file_id)
            .map_err(|err| Error::Preview(err.to_string()))
    }

    /// Best-effort file deletion used for compensating actions; the primary
    /// error must not be masked by a failing cleanup
    pub(crate) async fn discard_image(storage: &dyn Storage, bucket_id: &str, file_id: &str) {
        if let Err(err) = storage.delete_file(bucket_id, file_id).await {
            warn!(file_id, %err, "failed to delete orphaned image file");
        }
    }
}

/// User repository for backend document operations
#[derive(Clone)]
pub struct UserRepository {
    config: Arc<BackendConfig>,
    databases: Arc<dyn Databases>,
    storage: Arc<dyn Storage>,
}

impl UserRepository {
    /// Create a new user repository
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

    /// Persist a new user profile record
    pub async fn save_user(&self, profile: &UserProfile) -> Result<User> {
        info!(username = %profile.username, "saving user profile");
        let data = serde_json::to_value(profile).map_err(Error::decode)?;
        let document = self
            .databases
            .create_document(
                &self.config.database_id,
                &self.config.user_collection_id,
                &Uuid::new_v4().to_string(),
                data,
            )
            .await?;
        decode(document)
    }

    /// Fetch a user profile by record id
    pub async fn get_user_by_id(&self, user_id: &str) -> Result<User> {
        let document = self
            .databases
            .get_document(
                &self.config.database_id,
                &self.config.user_collection_id,
                user_id,
            )
            .await?;
        decode(document)
    }

    /// List users, newest first, optionally capped
    pub async fn get_users(&self, limit: Option<u32>) -> Result<Vec<User>> {
        let mut queries = vec![Query::order_desc("$createdAt")];
        if let Some(limit) = limit {
            queries.push(Query::limit(limit));
        }
        let list = self
            .databases
            .list_documents(
                &self.config.database_id,
                &self.config.user_collection_id,
                &queries,
            )
            .await?;
        list.documents.into_iter().map(decode).collect()
    }

    /// Find the profile record backing a backend account
    pub async fn find_by_account_id(&self, account_id: &str) -> Result<Option<User>> {
        let queries = [Query::equal("accountId", account_id)];
        let list = self
            .databases
            .list_documents(
                &self.config.database_id,
                &self.config.user_collection_id,
                &queries,
            )
            .await?;
        match list.documents.into_iter().next() {
            Some(document) => Ok(Some(decode(document)?)),
            None => Ok(None),
        }
    }

    /// Update a profile record, replacing the avatar image when a new file
    /// is attached
    ///
    /// The previous avatar file is deleted only after the new reference is
    /// durably stored; a failing record write rolls back the new upload.
    pub async fn update_user(&self, update: UpdateUser) -> Result<User> {
        info!(user_id = %update.user_id, "updating user profile");
        let has_new_file = !update.files.is_empty();
        let mut image_url = update.image_url.clone();
        let mut image_id = update.image_id.clone();

        if has_new_file {
            let uploaded = upload_image(
                self.storage.as_ref(),
                &self.config.storage_id,
                update.files[0].clone(),
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
            "name": update.name,
            "bio": update.bio,
            "imageUrl": image_url,
            "imageId": image_id,
        });
        let written = self
            .databases
            .update_document(
                &self.config.database_id,
                &self.config.user_collection_id,
                &update.user_id,
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

        if has_new_file && !update.image_id.is_empty() {
            discard_image(
                self.storage.as_ref(),
                &self.config.storage_id,
                &update.image_id,
            )
            .await;
        }

        decode(document)
    }
}
