use std::io;

use bytes::Bytes;

use crate::domain::BlobKey;

/// Immutable byte payloads addressed by key. External collaborator; the store
/// never interprets document content.
#[async_trait::async_trait]
pub trait BlobStore: Send + Sync {
    async fn put(&self, key: &BlobKey, data: Bytes) -> Result<(), BlobStoreError>;

    async fn get(&self, key: &BlobKey) -> Result<Vec<u8>, BlobStoreError>;

    async fn delete(&self, key: &BlobKey) -> Result<(), BlobStoreError>;

    /// Returns the stored size in bytes; `NotFound` if the key is absent.
    async fn head(&self, key: &BlobKey) -> Result<u64, BlobStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum BlobStoreError {
    #[error("blob not found: {0}")]
    NotFound(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
