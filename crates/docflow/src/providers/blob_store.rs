//! Blob store provider trait for raw document bytes

use async_trait::async_trait;

use crate::error::Result;

/// Trait for durable blob storage keyed by an opaque string.
///
/// Implementations:
/// - `LocalBlobStore`: local filesystem
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store raw bytes under the given key.
    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> Result<()>;

    /// Retrieve raw bytes by key.
    async fn get(&self, key: &str) -> Result<Vec<u8>>;

    /// Check whether a blob exists.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Delete a blob.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Check if the store is healthy.
    async fn health_check(&self) -> Result<bool>;

    /// Provider name for logging.
    fn name(&self) -> &str;
}
