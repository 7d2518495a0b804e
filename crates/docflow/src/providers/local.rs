//! Local filesystem blob store

use async_trait::async_trait;
use std::path::PathBuf;

use crate::error::{Error, Result};

use super::blob_store::BlobStore;

/// Blob store backed by a local directory
pub struct LocalBlobStore {
    /// Directory holding stored blobs
    storage_dir: PathBuf,
}

impl LocalBlobStore {
    /// Create a new local blob store, creating the directory if needed.
    pub fn new(storage_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&storage_dir)?;
        Ok(Self { storage_dir })
    }

    /// Path for a blob. Keys are flattened so they cannot escape the store.
    fn blob_path(&self, key: &str) -> PathBuf {
        let safe_key: String = key
            .chars()
            .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
            .collect();
        self.storage_dir.join(safe_key)
    }

    /// Path for a blob's metadata sidecar.
    fn meta_path(&self, key: &str) -> PathBuf {
        let mut path = self.blob_path(key).into_os_string();
        path.push(".meta.json");
        PathBuf::from(path)
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
struct BlobMeta {
    key: String,
    size: u64,
    content_type: String,
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> Result<()> {
        let blob_path = self.blob_path(key);
        let meta_path = self.meta_path(key);

        tokio::fs::write(&blob_path, data)
            .await
            .map_err(|e| Error::blob_store(format!("Failed to write blob {}: {}", key, e)))?;

        let meta = BlobMeta {
            key: key.to_string(),
            size: data.len() as u64,
            content_type: content_type.to_string(),
        };
        let meta_json = serde_json::to_string_pretty(&meta)?;
        tokio::fs::write(&meta_path, meta_json)
            .await
            .map_err(|e| Error::blob_store(format!("Failed to write blob metadata {}: {}", key, e)))?;

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        let blob_path = self.blob_path(key);
        tokio::fs::read(&blob_path)
            .await
            .map_err(|e| Error::blob_store(format!("Failed to read blob {}: {}", key, e)))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.blob_path(key).exists())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let blob_path = self.blob_path(key);
        let meta_path = self.meta_path(key);

        if blob_path.exists() {
            tokio::fs::remove_file(&blob_path)
                .await
                .map_err(|e| Error::blob_store(format!("Failed to delete blob {}: {}", key, e)))?;
        }
        if meta_path.exists() {
            tokio::fs::remove_file(&meta_path).await.map_err(|e| {
                Error::blob_store(format!("Failed to delete blob metadata {}: {}", key, e))
            })?;
        }

        Ok(())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.storage_dir.exists())
    }

    fn name(&self) -> &str {
        "local-filesystem"
    }
}
