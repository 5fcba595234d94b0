mod blob_key;
mod chunk;
mod document;
mod document_status;
mod job;
mod job_status;
mod media_type;

pub use blob_key::BlobKey;
pub use chunk::{Chunk, ChunkId, DocumentId};
pub use document::{Document, NewDocument};
pub use document_status::DocumentStatus;
pub use job::{ChunkJob, JobId};
pub use job_status::JobStatus;
pub use media_type::MediaType;
