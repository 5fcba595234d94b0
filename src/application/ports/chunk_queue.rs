use async_trait::async_trait;

use crate::domain::{ChunkJob, JobId};

/// One delivery of a job to a worker. `attempt` starts at 1 and counts every
/// delivery, including redeliveries after a nack or an expired visibility
/// timeout.
#[derive(Debug, Clone)]
pub struct JobDelivery {
    pub job: ChunkJob,
    pub attempt: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The job was still queued and has been removed outright.
    Removed,
    /// A worker already claimed the job; the cancellation flag is set and
    /// will be observed at the worker's next checkpoint.
    Flagged,
    NotFound,
}

/// At-least-once delivery queue for chunk jobs. A job claimed by a worker
/// that neither acks nor nacks within the visibility timeout becomes
/// redeliverable; the lifecycle manager's idempotent completion absorbs the
/// resulting duplicates.
#[async_trait]
pub trait ChunkQueue: Send + Sync {
    async fn enqueue(&self, job: ChunkJob) -> Result<(), QueueError>;

    /// Waits for the next deliverable job. Returns `QueueError::Closed` once
    /// the queue is shut down and drained of in-flight work.
    async fn dequeue(&self) -> Result<JobDelivery, QueueError>;

    async fn ack(&self, id: JobId) -> Result<(), QueueError>;

    async fn nack(&self, id: JobId, error: &str) -> Result<(), QueueError>;

    async fn cancel(&self, id: JobId) -> Result<CancelOutcome, QueueError>;

    async fn is_cancelled(&self, id: JobId) -> bool;

    /// Stops accepting new work and wakes blocked consumers.
    async fn close(&self);
}

#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("queue closed")]
    Closed,
    #[error("job not found: {0}")]
    NotFound(String),
}
