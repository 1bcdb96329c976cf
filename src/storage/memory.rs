//! In-memory blob storage backend, used in tests and memory-store deployments.

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::BlobStorage;
use crate::error::{AppError, Result};

/// In-memory blob storage
#[derive(Default)]
pub struct MemoryStorage {
    blobs: RwLock<HashMap<String, Bytes>>,
}

impl MemoryStorage {
    /// Create empty storage
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStorage for MemoryStorage {
    async fn put(&self, key: &str, content: Bytes) -> Result<()> {
        let mut blobs = self.blobs.write().await;
        blobs.insert(key.to_string(), content);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        let blobs = self.blobs.read().await;
        blobs
            .get(key)
            .cloned()
            .ok_or_else(|| AppError::Storage(format!("Failed to read {}: no such blob", key)))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let blobs = self.blobs.read().await;
        Ok(blobs.contains_key(key))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut blobs = self.blobs.write().await;
        blobs
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| AppError::Storage(format!("Failed to delete {}: no such blob", key)))
    }
}
