use std::sync::Arc;

use bytes::Bytes;
use object_store::memory::InMemory;
use object_store::path::Path as StorePath;
use object_store::{ObjectStore, PutPayload};

use crate::application::ports::{BlobStore, BlobStoreError};
use crate::domain::BlobKey;

/// In-memory blob store for tests and throwaway environments.
#[derive(Default)]
pub struct InMemoryBlobStore {
    inner: Arc<InMemory>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(InMemory::new()),
        }
    }
}

#[async_trait::async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, key: &BlobKey, data: Bytes) -> Result<(), BlobStoreError> {
        let path = StorePath::from(key.as_str());
        self.inner
            .put(&path, PutPayload::from(data))
            .await
            .map_err(|e| BlobStoreError::Unavailable(e.to_string()))?;
        Ok(())
    }

    async fn get(&self, key: &BlobKey) -> Result<Vec<u8>, BlobStoreError> {
        let path = StorePath::from(key.as_str());
        let result = match self.inner.get(&path).await {
            Ok(r) => r,
            Err(object_store::Error::NotFound { .. }) => {
                return Err(BlobStoreError::NotFound(key.to_string()));
            }
            Err(e) => return Err(BlobStoreError::Unavailable(e.to_string())),
        };
        let bytes = result
            .bytes()
            .await
            .map_err(|e| BlobStoreError::Unavailable(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn delete(&self, key: &BlobKey) -> Result<(), BlobStoreError> {
        let path = StorePath::from(key.as_str());
        match self.inner.delete(&path).await {
            Ok(()) => Ok(()),
            Err(object_store::Error::NotFound { .. }) => {
                Err(BlobStoreError::NotFound(key.to_string()))
            }
            Err(e) => Err(BlobStoreError::Unavailable(e.to_string())),
        }
    }

    async fn head(&self, key: &BlobKey) -> Result<u64, BlobStoreError> {
        let path = StorePath::from(key.as_str());
        match self.inner.head(&path).await {
            Ok(meta) => Ok(meta.size as u64),
            Err(object_store::Error::NotFound { .. }) => {
                Err(BlobStoreError::NotFound(key.to_string()))
            }
            Err(e) => Err(BlobStoreError::Unavailable(e.to_string())),
        }
    }
}
