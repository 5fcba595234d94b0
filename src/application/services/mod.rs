mod chunk_worker;
mod lifecycle_service;

pub use chunk_worker::{ChunkWorker, ChunkWorkerError, WorkerConfig};
pub use lifecycle_service::{DocumentLifecycleService, LifecycleError};
