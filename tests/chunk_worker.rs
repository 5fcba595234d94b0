use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use uuid::Uuid;

use boardrag::application::ports::{
    BlobStore, BlobStoreError, ChunkPolicy, ChunkQueue, DocumentFilter, JobRepository,
    TextSplitter,
};
use boardrag::application::services::{ChunkWorker, DocumentLifecycleService, WorkerConfig};
use boardrag::domain::{BlobKey, Document, DocumentId, DocumentStatus, JobStatus, MediaType, NewDocument};
use boardrag::infrastructure::persistence::{
    InMemoryChunkRepository, InMemoryDocumentRepository, InMemoryJobRepository,
};
use boardrag::infrastructure::queue::InMemoryChunkQueue;
use boardrag::infrastructure::storage::InMemoryBlobStore;
use boardrag::infrastructure::text_processing::{BoundaryCharacterSplitter, ExtractorRegistry};

const VISIBILITY_TIMEOUT: Duration = Duration::from_secs(30);
const TEST_DEADLINE: Duration = Duration::from_secs(10);
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Blob store whose reads always fail with a transient error. Writes and
/// metadata checks succeed so submission passes.
struct UnavailableBlobStore {
    inner: InMemoryBlobStore,
}

#[async_trait]
impl BlobStore for UnavailableBlobStore {
    async fn put(&self, key: &BlobKey, data: Bytes) -> Result<(), BlobStoreError> {
        self.inner.put(key, data).await
    }

    async fn get(&self, _key: &BlobKey) -> Result<Vec<u8>, BlobStoreError> {
        Err(BlobStoreError::Unavailable("connection refused".to_string()))
    }

    async fn delete(&self, key: &BlobKey) -> Result<(), BlobStoreError> {
        self.inner.delete(key).await
    }

    async fn head(&self, key: &BlobKey) -> Result<u64, BlobStoreError> {
        self.inner.head(key).await
    }
}

/// Blob store whose reads take long enough for a cancellation to land while
/// the job is in flight.
struct SlowBlobStore {
    inner: InMemoryBlobStore,
    delay: Duration,
}

#[async_trait]
impl BlobStore for SlowBlobStore {
    async fn put(&self, key: &BlobKey, data: Bytes) -> Result<(), BlobStoreError> {
        self.inner.put(key, data).await
    }

    async fn get(&self, key: &BlobKey) -> Result<Vec<u8>, BlobStoreError> {
        tokio::time::sleep(self.delay).await;
        self.inner.get(key).await
    }

    async fn delete(&self, key: &BlobKey) -> Result<(), BlobStoreError> {
        self.inner.delete(key).await
    }

    async fn head(&self, key: &BlobKey) -> Result<u64, BlobStoreError> {
        self.inner.head(key).await
    }
}

struct TestHarness {
    service: Arc<DocumentLifecycleService>,
    blob_store: Arc<dyn BlobStore>,
    queue: Arc<dyn ChunkQueue>,
    jobs: Arc<dyn JobRepository>,
    worker_handle: tokio::task::JoinHandle<()>,
}

fn harness_with_store(blob_store: Arc<dyn BlobStore>, config: WorkerConfig) -> TestHarness {
    let queue: Arc<dyn ChunkQueue> = Arc::new(InMemoryChunkQueue::new(VISIBILITY_TIMEOUT));
    let jobs: Arc<dyn JobRepository> = Arc::new(InMemoryJobRepository::new());
    let extractor = Arc::new(ExtractorRegistry::with_defaults());
    let policy = ChunkPolicy::new(300, 50, 100).unwrap();
    let splitter: Arc<dyn TextSplitter> = Arc::new(BoundaryCharacterSplitter::new(policy));

    let service = Arc::new(DocumentLifecycleService::new(
        Arc::new(InMemoryDocumentRepository::new()),
        Arc::new(InMemoryChunkRepository::new()),
        Arc::clone(&blob_store),
        extractor.clone(),
        Arc::clone(&queue),
        Arc::clone(&jobs),
    ));

    let worker = ChunkWorker::new(
        Arc::clone(&queue),
        Arc::clone(&blob_store),
        extractor,
        splitter,
        Arc::clone(&service),
        Arc::clone(&jobs),
        config,
    );
    let worker_handle = tokio::spawn(worker.run());

    TestHarness {
        service,
        blob_store,
        queue,
        jobs,
        worker_handle,
    }
}

fn harness() -> TestHarness {
    harness_with_store(Arc::new(InMemoryBlobStore::new()), WorkerConfig::default())
}

async fn submit_approved(h: &TestHarness, content: &[u8]) -> Document {
    let key = BlobKey::for_upload(Uuid::new_v4(), "minutes.txt");
    h.blob_store
        .put(&key, Bytes::copy_from_slice(content))
        .await
        .unwrap();

    let document = h
        .service
        .submit(NewDocument {
            owner_id: Uuid::new_v4(),
            title: "Board minutes".to_string(),
            tags: vec![],
            media_type: MediaType::PlainText,
            blob_keys: vec![key],
            valid_from: None,
            valid_until: None,
        })
        .await
        .unwrap();
    h.service.approve(document.id).await.unwrap();
    document
}

async fn wait_for_status(h: &TestHarness, id: DocumentId, status: DocumentStatus) -> Document {
    let deadline = tokio::time::Instant::now() + TEST_DEADLINE;
    loop {
        let document = h.service.get_document(id).await.unwrap();
        if document.status == status {
            return document;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "document never reached {}, still {}",
            status,
            document.status
        );
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

async fn shutdown(h: TestHarness) {
    h.queue.close().await;
    let _ = tokio::time::timeout(TEST_DEADLINE, h.worker_handle).await;
}

#[tokio::test]
async fn given_approved_document_when_chunking_runs_then_document_ends_chunked_with_ordered_chunks()
{
    let h = harness();
    let text = "The board convened at nine. ".repeat(40);
    let document = submit_approved(&h, text.as_bytes()).await;

    let job_id = h.service.request_chunking(document.id).await.unwrap();

    wait_for_status(&h, document.id, DocumentStatus::Chunked).await;

    let chunks = h.service.list_chunks(document.id).await.unwrap();
    assert!(!chunks.is_empty());
    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.ordinal, i as u32);
        assert_eq!(chunk.document_id, document.id);
        assert!(chunk.text.chars().count() <= 300);
    }

    let job = h.jobs.get_by_id(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Succeeded);

    shutdown(h).await;
}

#[tokio::test]
async fn given_undecodable_payload_when_chunking_runs_then_document_ends_chunk_failed() {
    let h = harness();
    let document = submit_approved(&h, &[0xff, 0xfe, 0x00, 0x80]).await;

    let job_id = h.service.request_chunking(document.id).await.unwrap();

    let failed = wait_for_status(&h, document.id, DocumentStatus::ChunkFailed).await;
    assert!(failed.failure_detail.is_some());

    let chunks = h.service.list_chunks(document.id).await.unwrap();
    assert!(chunks.is_empty());

    let job = h.jobs.get_by_id(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Failed);

    shutdown(h).await;
}

#[tokio::test]
async fn given_unavailable_store_when_retries_run_out_then_failure_detail_says_so() {
    let store = Arc::new(UnavailableBlobStore {
        inner: InMemoryBlobStore::new(),
    });
    let h = harness_with_store(
        store,
        WorkerConfig {
            max_attempts: 2,
            io_timeout: Duration::from_secs(5),
        },
    );
    let document = submit_approved(&h, b"unreachable content").await;

    let job_id = h.service.request_chunking(document.id).await.unwrap();

    let failed = wait_for_status(&h, document.id, DocumentStatus::ChunkFailed).await;
    let detail = failed.failure_detail.unwrap();
    assert!(
        detail.contains("retries exhausted"),
        "unexpected detail: {}",
        detail
    );

    let job = h.jobs.get_by_id(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Failed);

    shutdown(h).await;
}

#[tokio::test]
async fn given_in_flight_job_when_cancelled_then_document_ends_chunk_failed_as_cancelled() {
    let store = Arc::new(SlowBlobStore {
        inner: InMemoryBlobStore::new(),
        delay: Duration::from_millis(500),
    });
    let h = harness_with_store(store, WorkerConfig::default());
    let document = submit_approved(&h, b"slow content").await;

    let job_id = h.service.request_chunking(document.id).await.unwrap();

    // Let the worker claim the job, then cancel while the fetch is running.
    tokio::time::sleep(Duration::from_millis(150)).await;
    h.queue.cancel(job_id).await.unwrap();

    let failed = wait_for_status(&h, document.id, DocumentStatus::ChunkFailed).await;
    assert_eq!(failed.failure_detail.as_deref(), Some("cancelled"));

    let chunks = h.service.list_chunks(document.id).await.unwrap();
    assert!(chunks.is_empty());

    shutdown(h).await;
}

#[tokio::test]
async fn given_one_failing_document_when_another_is_chunked_then_the_failure_is_isolated() {
    let h = harness();
    let bad = submit_approved(&h, &[0xff, 0xfe]).await;
    let good_text = "Resolutions were carried unanimously. ".repeat(30);
    let good = submit_approved(&h, good_text.as_bytes()).await;

    h.service.request_chunking(bad.id).await.unwrap();
    h.service.request_chunking(good.id).await.unwrap();

    wait_for_status(&h, bad.id, DocumentStatus::ChunkFailed).await;
    wait_for_status(&h, good.id, DocumentStatus::Chunked).await;

    let documents = h
        .service
        .list_documents(&DocumentFilter {
            owner_id: None,
            status: Some(DocumentStatus::Chunked),
        })
        .await
        .unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].id, good.id);

    shutdown(h).await;
}
