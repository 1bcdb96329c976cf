//! Blob storage backends.

pub mod filesystem;
pub mod memory;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

/// Blob storage backend trait
#[async_trait]
pub trait BlobStorage: Send + Sync {
    /// Store content with the given key
    async fn put(&self, key: &str, content: Bytes) -> Result<()>;

    /// Retrieve content by key
    async fn get(&self, key: &str) -> Result<Bytes>;

    /// Check if key exists
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Delete content by key
    async fn delete(&self, key: &str) -> Result<()>;
}
