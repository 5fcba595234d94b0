mod blob_store;
mod chunk_queue;
mod chunk_repository;
mod document_repository;
mod job_repository;
mod repository_error;
mod text_extractor;
mod text_splitter;

pub use blob_store::{BlobStore, BlobStoreError};
pub use chunk_queue::{CancelOutcome, ChunkQueue, JobDelivery, QueueError};
pub use chunk_repository::ChunkRepository;
pub use document_repository::{CasResult, DocumentFilter, DocumentRepository};
pub use job_repository::JobRepository;
pub use repository_error::RepositoryError;
pub use text_extractor::{ExtractorError, TextExtractor};
pub use text_splitter::{ChunkPolicy, PolicyError, TextSplitter, TextSplitterError};
