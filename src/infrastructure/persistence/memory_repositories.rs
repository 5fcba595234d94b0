use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::application::ports::{
    CasResult, ChunkRepository, DocumentFilter, DocumentRepository, JobRepository, RepositoryError,
};
use crate::domain::{Chunk, ChunkJob, Document, DocumentId, DocumentStatus, JobId, JobStatus};

/// Mutex-guarded map repositories for tests and database-less deployments.
/// Status updates run under the lock, which gives the same linearizable
/// compare-and-set the Postgres implementation gets from its conditional
/// UPDATE.
#[derive(Default)]
pub struct InMemoryDocumentRepository {
    documents: Mutex<HashMap<DocumentId, Document>>,
}

impl InMemoryDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn create(&self, document: &Document) -> Result<(), RepositoryError> {
        let mut documents = self.documents.lock().await;
        if documents.contains_key(&document.id) {
            return Err(RepositoryError::ConstraintViolation(format!(
                "document already exists: {}",
                document.id
            )));
        }
        documents.insert(document.id, document.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: DocumentId) -> Result<Option<Document>, RepositoryError> {
        Ok(self.documents.lock().await.get(&id).cloned())
    }

    async fn list(&self, filter: &DocumentFilter) -> Result<Vec<Document>, RepositoryError> {
        let documents = self.documents.lock().await;
        let mut result: Vec<Document> = documents
            .values()
            .filter(|d| filter.owner_id.is_none_or(|owner| d.owner_id == owner))
            .filter(|d| filter.status.is_none_or(|status| d.status == status))
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }

    async fn compare_and_set_status(
        &self,
        id: DocumentId,
        expected: &[DocumentStatus],
        next: DocumentStatus,
        detail: Option<&str>,
    ) -> Result<CasResult, RepositoryError> {
        let mut documents = self.documents.lock().await;
        let document = documents
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;

        if !expected.contains(&document.status) {
            return Ok(CasResult::Conflict(document.status));
        }

        document.status = next;
        document.updated_at = Utc::now();
        match next {
            DocumentStatus::Rejected => {
                document.rejection_reason = detail.map(String::from);
            }
            DocumentStatus::ChunkFailed => {
                document.failure_detail = detail.map(String::from);
            }
            DocumentStatus::Chunking | DocumentStatus::Chunked => {
                document.failure_detail = None;
            }
            _ => {}
        }

        Ok(CasResult::Updated(document.clone()))
    }

    async fn delete(&self, id: DocumentId) -> Result<(), RepositoryError> {
        self.documents
            .lock()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))
    }
}

#[derive(Default)]
pub struct InMemoryChunkRepository {
    chunks: Mutex<HashMap<DocumentId, Vec<Chunk>>>,
}

impl InMemoryChunkRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChunkRepository for InMemoryChunkRepository {
    async fn replace_for_document(
        &self,
        document_id: DocumentId,
        chunks: &[Chunk],
    ) -> Result<(), RepositoryError> {
        let mut sorted = chunks.to_vec();
        sorted.sort_by_key(|c| c.ordinal);
        self.chunks.lock().await.insert(document_id, sorted);
        Ok(())
    }

    async fn list_for_document(
        &self,
        document_id: DocumentId,
    ) -> Result<Vec<Chunk>, RepositoryError> {
        Ok(self
            .chunks
            .lock()
            .await
            .get(&document_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn delete_for_document(&self, document_id: DocumentId) -> Result<(), RepositoryError> {
        self.chunks.lock().await.remove(&document_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryJobRepository {
    jobs: Mutex<HashMap<JobId, ChunkJob>>,
}

impl InMemoryJobRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobRepository for InMemoryJobRepository {
    async fn create(&self, job: &ChunkJob) -> Result<(), RepositoryError> {
        self.jobs.lock().await.insert(job.id, job.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: JobId) -> Result<Option<ChunkJob>, RepositoryError> {
        Ok(self.jobs.lock().await.get(&id).cloned())
    }

    async fn update_status(
        &self,
        id: JobId,
        status: JobStatus,
        error_message: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let mut jobs = self.jobs.lock().await;
        let job = jobs
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(id.as_uuid().to_string()))?;
        job.status = status;
        job.error_message = error_message.map(String::from);
        job.updated_at = Utc::now();
        Ok(())
    }

    async fn list_by_status(&self, status: JobStatus) -> Result<Vec<ChunkJob>, RepositoryError> {
        let jobs = self.jobs.lock().await;
        let mut result: Vec<ChunkJob> = jobs
            .values()
            .filter(|j| j.status == status)
            .cloned()
            .collect();
        result.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(result)
    }
}
