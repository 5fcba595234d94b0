use std::collections::{HashMap, HashSet, VecDeque};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::{Mutex, Notify};

use crate::application::ports::{CancelOutcome, ChunkQueue, JobDelivery, QueueError};
use crate::domain::{ChunkJob, JobId};

struct PendingJob {
    job: ChunkJob,
    /// Deliveries so far; the next delivery is `deliveries + 1`.
    deliveries: u32,
}

struct InFlightJob {
    job: ChunkJob,
    deliveries: u32,
    deadline: Instant,
}

struct QueueInner {
    ready: VecDeque<PendingJob>,
    in_flight: HashMap<JobId, InFlightJob>,
    cancelled: HashSet<JobId>,
    closed: bool,
}

/// In-process at-least-once queue. A claimed job that is neither acked nor
/// nacked before its visibility timeout expires goes back on the ready queue
/// and will be redelivered with an incremented attempt count.
///
/// Late acks and nacks from a worker whose claim already expired are treated
/// as no-ops rather than errors, matching broker-backed queues.
pub struct InMemoryChunkQueue {
    inner: Mutex<QueueInner>,
    notify: Notify,
    visibility_timeout: Duration,
}

impl InMemoryChunkQueue {
    pub fn new(visibility_timeout: Duration) -> Self {
        Self {
            inner: Mutex::new(QueueInner {
                ready: VecDeque::new(),
                in_flight: HashMap::new(),
                cancelled: HashSet::new(),
                closed: false,
            }),
            notify: Notify::new(),
            visibility_timeout,
        }
    }

    fn requeue_expired(inner: &mut QueueInner, now: Instant) {
        let expired: Vec<JobId> = inner
            .in_flight
            .iter()
            .filter(|(_, f)| f.deadline <= now)
            .map(|(id, _)| *id)
            .collect();

        for id in expired {
            if let Some(f) = inner.in_flight.remove(&id) {
                tracing::warn!(
                    job_id = %id.as_uuid(),
                    deliveries = f.deliveries,
                    "Visibility timeout expired, job requeued"
                );
                inner.ready.push_back(PendingJob {
                    job: f.job,
                    deliveries: f.deliveries,
                });
            }
        }
    }
}

#[async_trait]
impl ChunkQueue for InMemoryChunkQueue {
    async fn enqueue(&self, job: ChunkJob) -> Result<(), QueueError> {
        let mut inner = self.inner.lock().await;
        if inner.closed {
            return Err(QueueError::Closed);
        }
        inner.ready.push_back(PendingJob { job, deliveries: 0 });
        drop(inner);
        self.notify.notify_waiters();
        Ok(())
    }

    async fn dequeue(&self) -> Result<JobDelivery, QueueError> {
        loop {
            let wait = {
                let mut inner = self.inner.lock().await;
                let now = Instant::now();
                Self::requeue_expired(&mut inner, now);

                if let Some(pending) = inner.ready.pop_front() {
                    let attempt = pending.deliveries + 1;
                    let delivery = JobDelivery {
                        job: pending.job.clone(),
                        attempt,
                    };
                    inner.in_flight.insert(
                        pending.job.id,
                        InFlightJob {
                            job: pending.job,
                            deliveries: attempt,
                            deadline: now + self.visibility_timeout,
                        },
                    );
                    return Ok(delivery);
                }

                if inner.closed && inner.in_flight.is_empty() {
                    return Err(QueueError::Closed);
                }

                // Sleep until the earliest in-flight deadline could expire,
                // or a bounded poll interval when nothing is in flight.
                inner
                    .in_flight
                    .values()
                    .map(|f| f.deadline.saturating_duration_since(now))
                    .min()
                    .unwrap_or(self.visibility_timeout)
                    .max(Duration::from_millis(10))
            };

            let _ = tokio::time::timeout(wait, self.notify.notified()).await;
        }
    }

    async fn ack(&self, id: JobId) -> Result<(), QueueError> {
        let mut inner = self.inner.lock().await;
        inner.in_flight.remove(&id);
        inner.ready.retain(|p| p.job.id != id);
        inner.cancelled.remove(&id);
        drop(inner);
        self.notify.notify_waiters();
        Ok(())
    }

    async fn nack(&self, id: JobId, error: &str) -> Result<(), QueueError> {
        let mut inner = self.inner.lock().await;
        if let Some(f) = inner.in_flight.remove(&id) {
            tracing::debug!(job_id = %id.as_uuid(), error, "Job nacked");
            inner.ready.push_back(PendingJob {
                job: f.job,
                deliveries: f.deliveries,
            });
        }
        drop(inner);
        self.notify.notify_waiters();
        Ok(())
    }

    async fn cancel(&self, id: JobId) -> Result<CancelOutcome, QueueError> {
        let mut inner = self.inner.lock().await;

        let before = inner.ready.len();
        inner.ready.retain(|p| p.job.id != id);
        if inner.ready.len() < before {
            return Ok(CancelOutcome::Removed);
        }

        if inner.in_flight.contains_key(&id) {
            inner.cancelled.insert(id);
            return Ok(CancelOutcome::Flagged);
        }

        Ok(CancelOutcome::NotFound)
    }

    async fn is_cancelled(&self, id: JobId) -> bool {
        self.inner.lock().await.cancelled.contains(&id)
    }

    async fn close(&self) {
        let mut inner = self.inner.lock().await;
        inner.closed = true;
        drop(inner);
        self.notify.notify_waiters();
    }
}
