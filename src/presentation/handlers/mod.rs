mod documents;
mod health;
mod jobs;
mod responses;

pub use documents::{
    approve_handler, delete_document_handler, get_document_handler, list_chunks_handler,
    list_documents_handler, reject_handler, request_chunking_handler, submit_document_handler,
};
pub use health::health_handler;
pub use jobs::{cancel_job_handler, job_status_handler};
pub use responses::{ChunkResponse, DocumentResponse, ErrorResponse, JobResponse};
