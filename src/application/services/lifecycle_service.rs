use std::sync::Arc;

use crate::application::ports::{
    BlobStore, BlobStoreError, CasResult, ChunkQueue, ChunkRepository, DocumentFilter,
    DocumentRepository, JobRepository, QueueError, RepositoryError, TextExtractor,
};
use crate::domain::{Chunk, ChunkJob, Document, DocumentId, DocumentStatus, JobId, NewDocument};

/// Owns the document status state machine. Every transition is a
/// compare-and-set against the metadata store, so concurrent callers racing
/// on the same document resolve to exactly one winner.
pub struct DocumentLifecycleService {
    documents: Arc<dyn DocumentRepository>,
    chunks: Arc<dyn ChunkRepository>,
    blob_store: Arc<dyn BlobStore>,
    extractor: Arc<dyn TextExtractor>,
    queue: Arc<dyn ChunkQueue>,
    jobs: Arc<dyn JobRepository>,
}

impl DocumentLifecycleService {
    pub fn new(
        documents: Arc<dyn DocumentRepository>,
        chunks: Arc<dyn ChunkRepository>,
        blob_store: Arc<dyn BlobStore>,
        extractor: Arc<dyn TextExtractor>,
        queue: Arc<dyn ChunkQueue>,
        jobs: Arc<dyn JobRepository>,
    ) -> Self {
        Self {
            documents,
            chunks,
            blob_store,
            extractor,
            queue,
            jobs,
        }
    }

    /// Creates a document in `pending`. Fails fast on a media type no
    /// registered extractor can handle and on blob keys that are not already
    /// durably stored; in either case no document is created.
    #[tracing::instrument(skip(self, new), fields(title = %new.title))]
    pub async fn submit(&self, new: NewDocument) -> Result<Document, LifecycleError> {
        if !self.extractor.supports(new.media_type) {
            return Err(LifecycleError::UnsupportedMediaType(
                new.media_type.as_mime().to_string(),
            ));
        }

        if new.title.trim().is_empty() {
            return Err(LifecycleError::Validation("title must not be empty".into()));
        }
        if new.blob_keys.is_empty() {
            return Err(LifecycleError::Validation(
                "document must reference at least one stored file".into(),
            ));
        }
        if let (Some(from), Some(until)) = (new.valid_from, new.valid_until) {
            if until < from {
                return Err(LifecycleError::Validation(
                    "valid_until must not precede valid_from".into(),
                ));
            }
        }

        for key in &new.blob_keys {
            match self.blob_store.head(key).await {
                Ok(_) => {}
                Err(BlobStoreError::NotFound(_)) => {
                    return Err(LifecycleError::Validation(format!(
                        "blob not found in store: {}",
                        key
                    )));
                }
                Err(e) => return Err(LifecycleError::BlobStore(e)),
            }
        }

        let document = Document::submit(new);
        self.documents.create(&document).await?;

        tracing::info!(
            document_id = %document.id,
            media_type = %document.media_type,
            blobs = document.blob_keys.len(),
            "Document submitted"
        );
        Ok(document)
    }

    /// `pending → approved`.
    #[tracing::instrument(skip(self), fields(document_id = %id))]
    pub async fn approve(&self, id: DocumentId) -> Result<Document, LifecycleError> {
        self.transition(id, &[DocumentStatus::Pending], DocumentStatus::Approved, None)
            .await
    }

    /// `pending → rejected`, recording the reason.
    #[tracing::instrument(skip(self, reason), fields(document_id = %id))]
    pub async fn reject(&self, id: DocumentId, reason: &str) -> Result<Document, LifecycleError> {
        self.transition(
            id,
            &[DocumentStatus::Pending],
            DocumentStatus::Rejected,
            Some(reason),
        )
        .await
    }

    /// `approved | chunk_failed → chunking`, enqueuing exactly one job. The
    /// CAS is the guard against a second outstanding job: a concurrent caller
    /// loses the CAS and gets `InvalidState` without enqueuing anything.
    #[tracing::instrument(skip(self), fields(document_id = %id))]
    pub async fn request_chunking(&self, id: DocumentId) -> Result<JobId, LifecycleError> {
        let document = self
            .transition(
                id,
                &[DocumentStatus::Approved, DocumentStatus::ChunkFailed],
                DocumentStatus::Chunking,
                None,
            )
            .await?;

        let job = ChunkJob::new(document.id);
        let job_id = job.id;
        self.jobs.create(&job).await?;

        if let Err(e) = self.queue.enqueue(job).await {
            // The document would otherwise be stuck in `chunking` with no job
            // behind it; park it in chunk_failed so a retry stays possible.
            let detail = format!("enqueue failed: {}", e);
            let _ = self
                .documents
                .compare_and_set_status(
                    id,
                    &[DocumentStatus::Chunking],
                    DocumentStatus::ChunkFailed,
                    Some(&detail),
                )
                .await;
            return Err(LifecycleError::Queue(e));
        }

        tracing::info!(job_id = %job_id.as_uuid(), "Chunk job enqueued");
        Ok(job_id)
    }

    /// `chunking → chunked`, atomically replacing any prior chunk set.
    /// Redelivered completions land on an already-`chunked` document and are
    /// absorbed as no-ops: the replace is idempotent and the CAS conflict on
    /// `chunked` is not an error.
    #[tracing::instrument(skip(self, chunks), fields(document_id = %id, chunks = chunks.len()))]
    pub async fn complete_chunking(
        &self,
        id: DocumentId,
        chunks: Vec<Chunk>,
    ) -> Result<(), LifecycleError> {
        // Guard before touching the chunk table: a stale completion (for
        // example a redelivery landing after a cancel already failed the
        // document) must not leave a chunk batch behind on a document that
        // never reached the chunking path.
        let current = self.get_document(id).await?;
        if !matches!(
            current.status,
            DocumentStatus::Chunking | DocumentStatus::Chunked
        ) {
            return Err(LifecycleError::InvalidState {
                document_id: id,
                expected: "chunking".into(),
                actual: current.status.as_str().into(),
            });
        }

        self.chunks.replace_for_document(id, &chunks).await?;

        match self
            .documents
            .compare_and_set_status(id, &[DocumentStatus::Chunking], DocumentStatus::Chunked, None)
            .await?
        {
            CasResult::Updated(_) => {
                tracing::info!("Chunking completed");
                Ok(())
            }
            CasResult::Conflict(DocumentStatus::Chunked) => {
                tracing::debug!("Duplicate chunk completion absorbed");
                Ok(())
            }
            CasResult::Conflict(actual) => Err(LifecycleError::InvalidState {
                document_id: id,
                expected: "chunking".into(),
                actual: actual.as_str().into(),
            }),
        }
    }

    /// `chunking → chunk_failed`, recording the error detail. Retryable via
    /// `request_chunking`. Duplicate failure reports for the same job are
    /// absorbed the same way duplicate completions are.
    #[tracing::instrument(skip(self, error), fields(document_id = %id))]
    pub async fn fail_chunking(&self, id: DocumentId, error: &str) -> Result<(), LifecycleError> {
        match self
            .documents
            .compare_and_set_status(
                id,
                &[DocumentStatus::Chunking],
                DocumentStatus::ChunkFailed,
                Some(error),
            )
            .await?
        {
            CasResult::Updated(_) => {
                tracing::warn!(error, "Chunking failed");
                Ok(())
            }
            CasResult::Conflict(DocumentStatus::ChunkFailed) => Ok(()),
            CasResult::Conflict(actual) => Err(LifecycleError::InvalidState {
                document_id: id,
                expected: "chunking".into(),
                actual: actual.as_str().into(),
            }),
        }
    }

    pub async fn get_document(&self, id: DocumentId) -> Result<Document, LifecycleError> {
        self.documents
            .get_by_id(id)
            .await?
            .ok_or(LifecycleError::NotFound(id))
    }

    pub async fn list_documents(
        &self,
        filter: &DocumentFilter,
    ) -> Result<Vec<Document>, LifecycleError> {
        Ok(self.documents.list(filter).await?)
    }

    pub async fn list_chunks(&self, id: DocumentId) -> Result<Vec<Chunk>, LifecycleError> {
        // Surface a 404-style error for unknown documents rather than an
        // empty list.
        self.get_document(id).await?;
        Ok(self.chunks.list_for_document(id).await?)
    }

    /// Removes chunks, stored blobs, and finally the document row.
    #[tracing::instrument(skip(self), fields(document_id = %id))]
    pub async fn delete_document(&self, id: DocumentId) -> Result<(), LifecycleError> {
        let document = self.get_document(id).await?;

        self.chunks.delete_for_document(id).await?;
        for key in &document.blob_keys {
            match self.blob_store.delete(key).await {
                Ok(()) | Err(BlobStoreError::NotFound(_)) => {}
                Err(e) => return Err(LifecycleError::BlobStore(e)),
            }
        }
        self.documents.delete(id).await?;

        tracing::info!("Document deleted");
        Ok(())
    }

    async fn transition(
        &self,
        id: DocumentId,
        expected: &[DocumentStatus],
        next: DocumentStatus,
        detail: Option<&str>,
    ) -> Result<Document, LifecycleError> {
        // Distinguish "no such document" from "wrong state" up front; the CAS
        // itself only reports the conflict.
        let current = self.get_document(id).await?;

        match self
            .documents
            .compare_and_set_status(id, expected, next, detail)
            .await?
        {
            CasResult::Updated(document) => {
                tracing::info!(from = %current.status, to = %next, "Status transition");
                Ok(document)
            }
            CasResult::Conflict(actual) => Err(LifecycleError::InvalidState {
                document_id: id,
                expected: expected
                    .iter()
                    .map(|s| s.as_str())
                    .collect::<Vec<_>>()
                    .join("|"),
                actual: actual.as_str().into(),
            }),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("validation: {0}")]
    Validation(String),
    #[error("invalid state: document {document_id} is {actual}, expected {expected}")]
    InvalidState {
        document_id: DocumentId,
        expected: String,
        actual: String,
    },
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),
    #[error("document not found: {0}")]
    NotFound(DocumentId),
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
    #[error("blob store: {0}")]
    BlobStore(#[from] BlobStoreError),
    #[error("queue: {0}")]
    Queue(#[from] QueueError),
}
