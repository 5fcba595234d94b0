use async_trait::async_trait;

use crate::domain::{Chunk, DocumentId};

use super::RepositoryError;

#[async_trait]
pub trait ChunkRepository: Send + Sync {
    /// Replaces the whole chunk set for a document in one transaction, so
    /// readers never observe a partial batch. Re-running with the same batch
    /// leaves exactly one set stored.
    async fn replace_for_document(
        &self,
        document_id: DocumentId,
        chunks: &[Chunk],
    ) -> Result<(), RepositoryError>;

    /// Chunks ordered by ordinal.
    async fn list_for_document(
        &self,
        document_id: DocumentId,
    ) -> Result<Vec<Chunk>, RepositoryError>;

    async fn delete_for_document(&self, document_id: DocumentId) -> Result<(), RepositoryError>;
}
