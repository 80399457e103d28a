use crate::config::{KeyStrategy, ServiceConfig};
use crate::services::storage::{StorageService, StoredObject};
use crate::utils::auth::TokenValidator;
use crate::utils::content_type::content_type_for;
use crate::utils::object_key::{build_object_key, trailing_segment};
use anyhow::{Result, anyhow};
use bytes::Bytes;
use chrono::Utc;
use std::sync::Arc;

/// A file received from a multipart upload.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// A stored object prepared for a `Content-Disposition: attachment` response.
pub struct Attachment {
    pub object: StoredObject,
    pub content_type: &'static str,
    pub file_name: String,
}

/// Outcome of a token-guarded download.
pub enum TokenDownload {
    Granted(Attachment),
    Denied,
}

pub struct FileService {
    storage: Arc<dyn StorageService>,
    token_validator: Arc<dyn TokenValidator>,
    return_url: String,
    key_strategy: KeyStrategy,
}

impl FileService {
    pub fn new(
        storage: Arc<dyn StorageService>,
        token_validator: Arc<dyn TokenValidator>,
        config: &ServiceConfig,
    ) -> Self {
        Self {
            storage,
            token_validator,
            return_url: config.return_url.clone(),
            key_strategy: config.key_strategy,
        }
    }

    /// Stores the file under a generated key and returns its public locator.
    /// `None` in, `None` out: nothing is written.
    pub async fn upload(&self, file: Option<UploadedFile>) -> Result<Option<String>> {
        let Some(file) = file else {
            return Ok(None);
        };

        let key = build_object_key(
            &file.file_name,
            Utc::now().timestamp_millis(),
            self.key_strategy,
        );

        tracing::info!(
            "⬆️  Uploading '{}' as '{}' ({} bytes)",
            file.file_name,
            key,
            file.data.len()
        );

        self.storage
            .put_object(&key, file.data, file.content_type.as_deref())
            .await?;

        Ok(Some(format!("{}{}", self.return_url, key)))
    }

    pub async fn fetch(&self, key: &str) -> Result<StoredObject> {
        self.storage.get_object(key).await
    }

    /// Deletes the object named by the last segment of `path`.
    pub async fn delete_by_path(&self, path: &str) -> Result<()> {
        let key = trailing_segment(path);
        if key.is_empty() {
            return Err(anyhow!("No object key in path '{}'", path));
        }

        tracing::info!("🗑️  Deleting object '{}'", key);
        self.storage.delete_object(key).await
    }

    pub async fn fetch_with_token(&self, path: &str, token: &str) -> Result<TokenDownload> {
        if !self.token_validator.validate(token) {
            tracing::warn!("Download token rejected for '{}'", path);
            return Ok(TokenDownload::Denied);
        }

        let object = self.fetch(path).await?;

        Ok(TokenDownload::Granted(Attachment {
            object,
            content_type: content_type_for(path),
            file_name: trailing_segment(path).to_string(),
        }))
    }
}
