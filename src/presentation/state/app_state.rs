use std::sync::Arc;

use crate::application::ports::{BlobStore, ChunkQueue, JobRepository};
use crate::application::services::DocumentLifecycleService;

#[derive(Clone)]
pub struct AppState {
    pub lifecycle: Arc<DocumentLifecycleService>,
    pub blob_store: Arc<dyn BlobStore>,
    pub jobs: Arc<dyn JobRepository>,
    pub queue: Arc<dyn ChunkQueue>,
}
