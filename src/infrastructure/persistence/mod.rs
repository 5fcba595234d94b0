mod memory_repositories;
mod pg_chunk_repository;
mod pg_document_repository;
mod pg_job_repository;
mod pg_pool;
mod schema;

pub use memory_repositories::{
    InMemoryChunkRepository, InMemoryDocumentRepository, InMemoryJobRepository,
};
pub use pg_chunk_repository::PgChunkRepository;
pub use pg_document_repository::PgDocumentRepository;
pub use pg_job_repository::PgJobRepository;
pub use pg_pool::create_pool;
pub use schema::ensure_schema;
