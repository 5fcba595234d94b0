use std::sync::Arc;
use std::time::Duration;

use tracing::Instrument;

use crate::application::ports::{
    BlobStore, BlobStoreError, ChunkQueue, ExtractorError, JobDelivery, JobRepository, QueueError,
    RepositoryError, TextExtractor, TextSplitter, TextSplitterError,
};
use crate::application::services::{DocumentLifecycleService, LifecycleError};
use crate::domain::{Chunk, JobStatus};

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Deliveries per job before a transient failure becomes terminal.
    pub max_attempts: u32,
    /// Bound on each blob store fetch; expiry nacks the job instead of
    /// hanging the worker.
    pub io_timeout: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            io_timeout: Duration::from_secs(30),
        }
    }
}

/// Pulls chunk jobs off the queue and drives each one through
/// fetch → extract → split → persist. Several workers may run against the
/// same queue; the queue is their only coordination point.
pub struct ChunkWorker {
    queue: Arc<dyn ChunkQueue>,
    blob_store: Arc<dyn BlobStore>,
    extractor: Arc<dyn TextExtractor>,
    splitter: Arc<dyn TextSplitter>,
    lifecycle: Arc<DocumentLifecycleService>,
    jobs: Arc<dyn JobRepository>,
    config: WorkerConfig,
}

impl ChunkWorker {
    pub fn new(
        queue: Arc<dyn ChunkQueue>,
        blob_store: Arc<dyn BlobStore>,
        extractor: Arc<dyn TextExtractor>,
        splitter: Arc<dyn TextSplitter>,
        lifecycle: Arc<DocumentLifecycleService>,
        jobs: Arc<dyn JobRepository>,
        config: WorkerConfig,
    ) -> Self {
        Self {
            queue,
            blob_store,
            extractor,
            splitter,
            lifecycle,
            jobs,
            config,
        }
    }

    pub async fn run(self) {
        tracing::info!("Chunk worker started");
        loop {
            let delivery = match self.queue.dequeue().await {
                Ok(d) => d,
                Err(QueueError::Closed) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "Dequeue failed");
                    continue;
                }
            };

            let span = tracing::info_span!(
                "chunk_job",
                job_id = %delivery.job.id.as_uuid(),
                document_id = %delivery.job.document_id,
                attempt = delivery.attempt,
            );

            if let Err(e) = self.process_delivery(&delivery).instrument(span).await {
                // A single document's failure must never take the worker
                // down with it.
                tracing::error!(error = %e, "Chunk job processing error");
            }
        }
        tracing::info!("Chunk worker stopped: queue closed");
    }

    async fn process_delivery(&self, delivery: &JobDelivery) -> Result<(), ChunkWorkerError> {
        let job_id = delivery.job.id;
        let doc_id = delivery.job.document_id;

        self.jobs
            .update_status(job_id, JobStatus::Running, None)
            .await?;

        let outcome = self.run_pipeline(delivery).await;

        match outcome {
            Ok(chunks) => {
                let count = chunks.len();
                match self.lifecycle.complete_chunking(doc_id, chunks).await {
                    Ok(()) => {
                        self.jobs
                            .update_status(job_id, JobStatus::Succeeded, None)
                            .await?;
                        self.queue.ack(job_id).await?;
                        tracing::info!(chunks = count, "Chunk job succeeded");
                        Ok(())
                    }
                    Err(e @ LifecycleError::Repository(_)) => {
                        self.handle_transient(delivery, e.to_string()).await
                    }
                    Err(e) => self.handle_permanent(delivery, e.to_string()).await,
                }
            }
            Err(ChunkWorkerError::Cancelled) => {
                self.handle_permanent(delivery, "cancelled".to_string())
                    .await
            }
            Err(e) if e.is_transient() => self.handle_transient(delivery, e.to_string()).await,
            Err(e) => self.handle_permanent(delivery, e.to_string()).await,
        }
    }

    async fn run_pipeline(&self, delivery: &JobDelivery) -> Result<Vec<Chunk>, ChunkWorkerError> {
        let job_id = delivery.job.id;
        let doc_id = delivery.job.document_id;

        let document = self.lifecycle.get_document(doc_id).await?;

        let mut parts = Vec::with_capacity(document.blob_keys.len());
        for key in &document.blob_keys {
            let data = tokio::time::timeout(self.config.io_timeout, self.blob_store.get(key))
                .await
                .map_err(|_| ChunkWorkerError::Timeout(key.to_string()))?
                .map_err(ChunkWorkerError::from)?;

            let text = self.extractor.extract(&data, document.media_type).await?;
            parts.push(text);
        }
        let text = parts.join("\n\n");

        // Cancellation checkpoint: after extraction, before anything is
        // persisted.
        if self.queue.is_cancelled(job_id).await {
            return Err(ChunkWorkerError::Cancelled);
        }

        let segments = self.splitter.split(&text)?;
        let chunks = segments
            .into_iter()
            .enumerate()
            .map(|(i, segment)| Chunk::new(doc_id, i as u32, segment))
            .collect();

        Ok(chunks)
    }

    /// Transient failure: nack for redelivery while attempts remain,
    /// otherwise mark the document `chunk_failed` with a retries-exhausted
    /// detail.
    async fn handle_transient(
        &self,
        delivery: &JobDelivery,
        error: String,
    ) -> Result<(), ChunkWorkerError> {
        let job_id = delivery.job.id;
        let doc_id = delivery.job.document_id;

        if delivery.attempt >= self.config.max_attempts {
            let detail = format!(
                "retries exhausted after {} attempts: {}",
                delivery.attempt, error
            );
            self.lifecycle.fail_chunking(doc_id, &detail).await?;
            self.jobs
                .update_status(job_id, JobStatus::Failed, Some(&detail))
                .await?;
            self.queue.ack(job_id).await?;
            tracing::warn!(detail, "Chunk job failed terminally");
        } else {
            self.jobs
                .update_status(job_id, JobStatus::Queued, Some(&error))
                .await?;
            self.queue.nack(job_id, &error).await?;
            tracing::warn!(error, "Chunk job nacked for redelivery");
        }
        Ok(())
    }

    async fn handle_permanent(
        &self,
        delivery: &JobDelivery,
        error: String,
    ) -> Result<(), ChunkWorkerError> {
        let job_id = delivery.job.id;
        let doc_id = delivery.job.document_id;

        if let Err(e) = self.lifecycle.fail_chunking(doc_id, &error).await {
            tracing::warn!(error = %e, "Could not record chunk failure on document");
        }
        self.jobs
            .update_status(job_id, JobStatus::Failed, Some(&error))
            .await?;
        self.queue.ack(job_id).await?;
        tracing::warn!(error, "Chunk job failed");
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ChunkWorkerError {
    #[error("blob not found: {0}")]
    BlobMissing(String),
    #[error("blob store unavailable: {0}")]
    BlobUnavailable(String),
    #[error("timed out fetching blob: {0}")]
    Timeout(String),
    #[error("extraction: {0}")]
    Extraction(#[from] ExtractorError),
    #[error("splitting: {0}")]
    Splitting(#[from] TextSplitterError),
    #[error("cancelled")]
    Cancelled,
    #[error("lifecycle: {0}")]
    Lifecycle(#[from] LifecycleError),
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
    #[error("queue: {0}")]
    Queue(#[from] QueueError),
}

impl ChunkWorkerError {
    fn is_transient(&self) -> bool {
        matches!(
            self,
            ChunkWorkerError::BlobUnavailable(_) | ChunkWorkerError::Timeout(_)
        )
    }
}

impl From<BlobStoreError> for ChunkWorkerError {
    fn from(e: BlobStoreError) -> Self {
        match e {
            BlobStoreError::NotFound(key) => ChunkWorkerError::BlobMissing(key),
            BlobStoreError::Unavailable(msg) => ChunkWorkerError::BlobUnavailable(msg),
            BlobStoreError::Io(err) => ChunkWorkerError::BlobUnavailable(err.to_string()),
        }
    }
}
