use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Document, DocumentId, DocumentStatus};

use super::RepositoryError;

/// Outcome of a compare-and-set status update. `Conflict` carries the status
/// actually observed at commit time so callers can report the illegal
/// transition precisely.
#[derive(Debug, Clone)]
pub enum CasResult {
    Updated(Document),
    Conflict(DocumentStatus),
}

#[derive(Debug, Clone, Default)]
pub struct DocumentFilter {
    pub owner_id: Option<Uuid>,
    pub status: Option<DocumentStatus>,
}

#[async_trait]
pub trait DocumentRepository: Send + Sync {
    async fn create(&self, document: &Document) -> Result<(), RepositoryError>;

    async fn get_by_id(&self, id: DocumentId) -> Result<Option<Document>, RepositoryError>;

    async fn list(&self, filter: &DocumentFilter) -> Result<Vec<Document>, RepositoryError>;

    /// Atomically moves the document to `next` if its current status is one of
    /// `expected`. Two concurrent callers racing on the same transition get
    /// exactly one `Updated`; the loser gets `Conflict`.
    ///
    /// `detail` is stored in `rejection_reason` when `next` is `Rejected` and
    /// in `failure_detail` when `next` is `ChunkFailed`; it is ignored for
    /// every other target status.
    async fn compare_and_set_status(
        &self,
        id: DocumentId,
        expected: &[DocumentStatus],
        next: DocumentStatus,
        detail: Option<&str>,
    ) -> Result<CasResult, RepositoryError>;

    async fn delete(&self, id: DocumentId) -> Result<(), RepositoryError>;
}
