//! HTTP implementation of the backend service traits

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::error::{Error, Result};
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::account::Account;
use crate::avatars::Avatars;
use crate::config::BackendConfig;
use crate::databases::Databases;
use crate::models::{AccountInfo, DocumentList, FileInput, Session, StoredFile};
use crate::query::Query;
use crate::storage::Storage;

/// Client for the backend REST API
///
/// Implements every service trait over one shared `reqwest` client. The
/// session secret obtained from `create_email_session` is retained and sent
/// with subsequent requests until the session is deleted.
#[derive(Clone)]
pub struct HttpClient {
    http: reqwest::Client,
    config: BackendConfig,
    session: Arc<RwLock<Option<String>>>,
}

impl HttpClient {
    pub fn new(config: BackendConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            session: Arc::new(RwLock::new(None)),
        }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.endpoint.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let mut builder = self
            .http
            .request(method, self.url(path))
            .header("X-Project-Id", &self.config.project_id);
        if let Some(key) = &self.config.api_key {
            builder = builder.header("X-Api-Key", key);
        }
        let session = self.session.read().ok().and_then(|slot| slot.clone());
        if let Some(secret) = session {
            builder = builder.header("X-Session-Token", secret);
        }
        builder
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder
            .send()
            .await
            .map_err(|err| Error::Transport(err.to_string()))?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(Self::error_message(response).await));
        }
        if !status.is_success() {
            let message = Self::error_message(response).await;
            return Err(Error::Transport(format!("{status}: {message}")));
        }
        Ok(response)
    }

    async fn error_message(response: Response) -> String {
        match response.json::<Value>().await {
            Ok(body) => body
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("backend error")
                .to_string(),
            Err(_) => "backend error".to_string(),
        }
    }

    async fn json<T: DeserializeOwned>(response: Response) -> Result<T> {
        response
            .json()
            .await
            .map_err(|err| Error::Decode(err.to_string()))
    }

    fn documents_path(database_id: &str, collection_id: &str) -> String {
        format!("databases/{database_id}/collections/{collection_id}/documents")
    }
}

#[async_trait]
impl Databases for HttpClient {
    async fn create_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Value,
    ) -> Result<Value> {
        debug!(collection_id, document_id, "creating document");
        let body = json!({ "documentId": document_id, "data": data });
        let path = Self::documents_path(database_id, collection_id);
        let response = self.send(self.request(Method::POST, &path).json(&body)).await?;
        Self::json(response).await
    }

    async fn get_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> Result<Value> {
        debug!(collection_id, document_id, "fetching document");
        let path = format!(
            "{}/{document_id}",
            Self::documents_path(database_id, collection_id)
        );
        let response = self.send(self.request(Method::GET, &path)).await?;
        Self::json(response).await
    }

    async fn list_documents(
        &self,
        database_id: &str,
        collection_id: &str,
        queries: &[Query],
    ) -> Result<DocumentList> {
        debug!(collection_id, count = queries.len(), "listing documents");
        let path = Self::documents_path(database_id, collection_id);
        let mut builder = self.request(Method::GET, &path);
        for query in queries {
            builder = builder.query(&[("queries[]", query.to_wire().to_string())]);
        }
        let response = self.send(builder).await?;
        Self::json(response).await
    }

    async fn update_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
        data: Value,
    ) -> Result<Value> {
        debug!(collection_id, document_id, "updating document");
        let path = format!(
            "{}/{document_id}",
            Self::documents_path(database_id, collection_id)
        );
        let body = json!({ "data": data });
        let response = self
            .send(self.request(Method::PATCH, &path).json(&body))
            .await?;
        Self::json(response).await
    }

    async fn delete_document(
        &self,
        database_id: &str,
        collection_id: &str,
        document_id: &str,
    ) -> Result<()> {
        debug!(collection_id, document_id, "deleting document");
        let path = format!(
            "{}/{document_id}",
            Self::documents_path(database_id, collection_id)
        );
        self.send(self.request(Method::DELETE, &path)).await?;
        Ok(())
    }
}

#[async_trait]
impl Storage for HttpClient {
    async fn create_file(
        &self,
        bucket_id: &str,
        file_id: &str,
        file: FileInput,
    ) -> Result<StoredFile> {
        info!(bucket_id, file_id, name = %file.name, "uploading file");
        let part = reqwest::multipart::Part::bytes(file.bytes)
            .file_name(file.name)
            .mime_str(&file.mime_type)
            .map_err(|err| Error::Transport(err.to_string()))?;
        let form = reqwest::multipart::Form::new()
            .text("fileId", file_id.to_string())
            .part("file", part);
        let path = format!("storage/buckets/{bucket_id}/files");
        let response = self
            .send(self.request(Method::POST, &path).multipart(form))
            .await?;
        Self::json(response).await
    }

    fn file_preview(&self, bucket_id: &str, file_id: &str) -> Result<String> {
        if file_id.is_empty() {
            return Err(Error::Preview("missing file id".to_string()));
        }
        let path = format!("storage/buckets/{bucket_id}/files/{file_id}/preview");
        let url = Url::parse_with_params(
            &self.url(&path),
            &[
                ("width", "2000"),
                ("height", "2000"),
                ("gravity", "top"),
                ("quality", "100"),
                ("project", self.config.project_id.as_str()),
            ],
        )
        .map_err(|err| Error::Preview(err.to_string()))?;
        Ok(url.to_string())
    }

    async fn delete_file(&self, bucket_id: &str, file_id: &str) -> Result<()> {
        info!(bucket_id, file_id, "deleting file");
        let path = format!("storage/buckets/{bucket_id}/files/{file_id}");
        self.send(self.request(Method::DELETE, &path)).await?;
        Ok(())
    }
}

#[async_trait]
impl Account for HttpClient {
    async fn create(
        &self,
        account_id: &str,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<AccountInfo> {
        info!(email, "creating backend account");
        let body = json!({
            "userId": account_id,
            "email": email,
            "password": password,
            "name": name,
        });
        let response = self
            .send(self.request(Method::POST, "account").json(&body))
            .await?;
        Self::json(response).await
    }

    async fn create_email_session(&self, email: &str, password: &str) -> Result<Session> {
        info!(email, "creating email session");
        let body = json!({ "email": email, "password": password });
        let response = self
            .send(self.request(Method::POST, "account/sessions/email").json(&body))
            .await?;
        let session: Session = Self::json(response).await?;
        if let Ok(mut slot) = self.session.write() {
            *slot = Some(session.secret.clone());
        }
        Ok(session)
    }

    async fn get(&self) -> Result<AccountInfo> {
        let response = self.send(self.request(Method::GET, "account")).await?;
        Self::json(response).await
    }

    async fn delete_session(&self, session_id: &str) -> Result<()> {
        info!(session_id, "deleting session");
        let path = format!("account/sessions/{session_id}");
        self.send(self.request(Method::DELETE, &path)).await?;
        if let Ok(mut slot) = self.session.write() {
            *slot = None;
        }
        Ok(())
    }
}

impl Avatars for HttpClient {
    fn initials_url(&self, name: &str) -> Result<String> {
        let url = Url::parse_with_params(
            &self.url("avatars/initials"),
            &[("name", name), ("project", self.config.project_id.as_str())],
        )
        .map_err(|err| Error::Transport(err.to_string()))?;
        Ok(url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> BackendConfig {
        BackendConfig {
            endpoint: "https://cloud.example.com/v1/".to_string(),
            project_id: "photogram".to_string(),
            api_key: None,
            database_id: "db".to_string(),
            user_collection_id: "users".to_string(),
            post_collection_id: "posts".to_string(),
            saves_collection_id: "saves".to_string(),
            storage_id: "media".to_string(),
        }
    }

    #[test]
    fn urls_join_without_duplicate_slashes() {
        let client = HttpClient::new(test_config());
        assert_eq!(
            client.url("/account/sessions/email"),
            "https://cloud.example.com/v1/account/sessions/email"
        );
    }

    #[test]
    fn preview_url_pins_the_crop_parameters() {
        let client = HttpClient::new(test_config());
        let url = client.file_preview("media", "file-1").unwrap();
        assert!(url.starts_with(
            "https://cloud.example.com/v1/storage/buckets/media/files/file-1/preview"
        ));
        assert!(url.contains("width=2000"));
        assert!(url.contains("height=2000"));
        assert!(url.contains("gravity=top"));
        assert!(url.contains("quality=100"));
    }

    #[test]
    fn preview_requires_a_file_id() {
        let client = HttpClient::new(test_config());
        assert!(matches!(
            client.file_preview("media", ""),
            Err(Error::Preview(_))
        ));
    }

    #[test]
    fn initials_url_encodes_the_name() {
        let client = HttpClient::new(test_config());
        let url = client.initials_url("Ada Lovelace").unwrap();
        assert!(url.contains("name=Ada+Lovelace") || url.contains("name=Ada%20Lovelace"));
    }
}
