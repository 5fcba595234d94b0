use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use uuid::Uuid;

use boardrag::application::ports::{
    BlobStore, BlobStoreError, ChunkQueue, DocumentFilter, JobRepository,
};
use boardrag::application::services::{DocumentLifecycleService, LifecycleError};
use boardrag::domain::{BlobKey, Chunk, DocumentStatus, JobStatus, MediaType, NewDocument};
use boardrag::infrastructure::persistence::{
    InMemoryChunkRepository, InMemoryDocumentRepository, InMemoryJobRepository,
};
use boardrag::infrastructure::queue::InMemoryChunkQueue;
use boardrag::infrastructure::storage::InMemoryBlobStore;
use boardrag::infrastructure::text_processing::ExtractorRegistry;

const VISIBILITY_TIMEOUT: Duration = Duration::from_secs(30);

struct TestHarness {
    service: Arc<DocumentLifecycleService>,
    blob_store: Arc<dyn BlobStore>,
    queue: Arc<dyn ChunkQueue>,
    jobs: Arc<dyn JobRepository>,
}

fn harness() -> TestHarness {
    let blob_store: Arc<dyn BlobStore> = Arc::new(InMemoryBlobStore::new());
    let queue: Arc<dyn ChunkQueue> = Arc::new(InMemoryChunkQueue::new(VISIBILITY_TIMEOUT));
    let jobs: Arc<dyn JobRepository> = Arc::new(InMemoryJobRepository::new());

    let service = Arc::new(DocumentLifecycleService::new(
        Arc::new(InMemoryDocumentRepository::new()),
        Arc::new(InMemoryChunkRepository::new()),
        Arc::clone(&blob_store),
        Arc::new(ExtractorRegistry::with_defaults()),
        Arc::clone(&queue),
        Arc::clone(&jobs),
    ));

    TestHarness {
        service,
        blob_store,
        queue,
        jobs,
    }
}

async fn stored_blob(blob_store: &Arc<dyn BlobStore>, content: &str) -> BlobKey {
    let key = BlobKey::for_upload(Uuid::new_v4(), "minutes.txt");
    blob_store
        .put(&key, Bytes::from(content.to_string()))
        .await
        .unwrap();
    key
}

fn new_document(blob_keys: Vec<BlobKey>, media_type: MediaType) -> NewDocument {
    NewDocument {
        owner_id: Uuid::new_v4(),
        title: "Board minutes 2024-06".to_string(),
        tags: vec!["minutes".to_string()],
        media_type,
        blob_keys,
        valid_from: None,
        valid_until: None,
    }
}

#[tokio::test]
async fn given_valid_submission_when_submitted_then_document_is_pending() {
    let h = harness();
    let key = stored_blob(&h.blob_store, "Meeting called to order.").await;

    let document = h
        .service
        .submit(new_document(vec![key.clone()], MediaType::PlainText))
        .await
        .unwrap();

    assert_eq!(document.status, DocumentStatus::Pending);
    assert_eq!(document.blob_keys, vec![key]);
    assert!(document.rejection_reason.is_none());
}

#[tokio::test]
async fn given_unsupported_media_type_when_submitted_then_fails_without_creating_document() {
    let h = harness();
    let key = stored_blob(&h.blob_store, "binary payload").await;

    let result = h
        .service
        .submit(new_document(vec![key], MediaType::Docx))
        .await;

    assert!(matches!(result, Err(LifecycleError::UnsupportedMediaType(_))));
    let documents = h
        .service
        .list_documents(&DocumentFilter {
            owner_id: None,
            status: None,
        })
        .await
        .unwrap();
    assert!(documents.is_empty());
}

#[tokio::test]
async fn given_missing_blob_when_submitted_then_validation_fails() {
    let h = harness();
    let dangling = BlobKey::for_upload(Uuid::new_v4(), "never-stored.txt");

    let result = h
        .service
        .submit(new_document(vec![dangling], MediaType::PlainText))
        .await;

    assert!(matches!(result, Err(LifecycleError::Validation(_))));
}

#[tokio::test]
async fn given_empty_title_when_submitted_then_validation_fails() {
    let h = harness();
    let key = stored_blob(&h.blob_store, "content").await;
    let mut new = new_document(vec![key], MediaType::PlainText);
    new.title = "   ".to_string();

    let result = h.service.submit(new).await;

    assert!(matches!(result, Err(LifecycleError::Validation(_))));
}

#[tokio::test]
async fn given_pending_document_when_approved_then_status_is_approved() {
    let h = harness();
    let key = stored_blob(&h.blob_store, "content").await;
    let document = h
        .service
        .submit(new_document(vec![key], MediaType::PlainText))
        .await
        .unwrap();

    let approved = h.service.approve(document.id).await.unwrap();

    assert_eq!(approved.status, DocumentStatus::Approved);
}

#[tokio::test]
async fn given_approved_document_when_approved_again_then_invalid_state() {
    let h = harness();
    let key = stored_blob(&h.blob_store, "content").await;
    let document = h
        .service
        .submit(new_document(vec![key], MediaType::PlainText))
        .await
        .unwrap();
    h.service.approve(document.id).await.unwrap();

    let result = h.service.approve(document.id).await;

    assert!(matches!(result, Err(LifecycleError::InvalidState { .. })));
}

#[tokio::test]
async fn given_pending_document_when_rejected_then_reason_is_recorded() {
    let h = harness();
    let key = stored_blob(&h.blob_store, "content").await;
    let document = h
        .service
        .submit(new_document(vec![key], MediaType::PlainText))
        .await
        .unwrap();

    let rejected = h
        .service
        .reject(document.id, "duplicate of an earlier upload")
        .await
        .unwrap();

    assert_eq!(rejected.status, DocumentStatus::Rejected);
    assert_eq!(
        rejected.rejection_reason.as_deref(),
        Some("duplicate of an earlier upload")
    );
}

#[tokio::test]
async fn given_pending_document_when_chunking_requested_then_invalid_state() {
    let h = harness();
    let key = stored_blob(&h.blob_store, "content").await;
    let document = h
        .service
        .submit(new_document(vec![key], MediaType::PlainText))
        .await
        .unwrap();

    let result = h.service.request_chunking(document.id).await;

    assert!(matches!(result, Err(LifecycleError::InvalidState { .. })));
}

#[tokio::test]
async fn given_approved_document_when_chunking_requested_concurrently_then_one_caller_wins() {
    let h = harness();
    let key = stored_blob(&h.blob_store, "content").await;
    let document = h
        .service
        .submit(new_document(vec![key], MediaType::PlainText))
        .await
        .unwrap();
    h.service.approve(document.id).await.unwrap();

    let (first, second) = tokio::join!(
        h.service.request_chunking(document.id),
        h.service.request_chunking(document.id),
    );

    let winners = [&first, &second].iter().filter(|r| r.is_ok()).count();
    assert_eq!(winners, 1);
    let loser = if first.is_err() { first } else { second };
    assert!(matches!(loser, Err(LifecycleError::InvalidState { .. })));

    // Exactly one job was recorded and enqueued.
    let queued = h.jobs.list_by_status(JobStatus::Queued).await.unwrap();
    assert_eq!(queued.len(), 1);
    let delivery = h.queue.dequeue().await.unwrap();
    assert_eq!(delivery.job.document_id, document.id);
}

#[tokio::test]
async fn given_chunking_document_when_completed_twice_then_second_completion_is_absorbed() {
    let h = harness();
    let key = stored_blob(&h.blob_store, "content").await;
    let document = h
        .service
        .submit(new_document(vec![key], MediaType::PlainText))
        .await
        .unwrap();
    h.service.approve(document.id).await.unwrap();
    h.service.request_chunking(document.id).await.unwrap();

    let chunks = vec![Chunk::new(document.id, 0, "content".to_string())];
    h.service
        .complete_chunking(document.id, chunks.clone())
        .await
        .unwrap();
    h.service
        .complete_chunking(document.id, chunks)
        .await
        .unwrap();

    let stored = h.service.list_chunks(document.id).await.unwrap();
    assert_eq!(stored.len(), 1);
    let current = h.service.get_document(document.id).await.unwrap();
    assert_eq!(current.status, DocumentStatus::Chunked);
}

#[tokio::test]
async fn given_pending_document_when_completion_arrives_then_no_chunks_are_stored() {
    let h = harness();
    let key = stored_blob(&h.blob_store, "content").await;
    let document = h
        .service
        .submit(new_document(vec![key], MediaType::PlainText))
        .await
        .unwrap();

    let result = h
        .service
        .complete_chunking(
            document.id,
            vec![Chunk::new(document.id, 0, "content".to_string())],
        )
        .await;

    assert!(matches!(result, Err(LifecycleError::InvalidState { .. })));
    let stored = h.service.list_chunks(document.id).await.unwrap();
    assert!(stored.is_empty());
    let current = h.service.get_document(document.id).await.unwrap();
    assert_eq!(current.status, DocumentStatus::Pending);
}

#[tokio::test]
async fn given_rejected_document_when_completion_arrives_then_no_chunks_are_stored() {
    let h = harness();
    let key = stored_blob(&h.blob_store, "content").await;
    let document = h
        .service
        .submit(new_document(vec![key], MediaType::PlainText))
        .await
        .unwrap();
    h.service.reject(document.id, "out of scope").await.unwrap();

    let result = h
        .service
        .complete_chunking(
            document.id,
            vec![Chunk::new(document.id, 0, "content".to_string())],
        )
        .await;

    assert!(matches!(result, Err(LifecycleError::InvalidState { .. })));
    assert!(h.service.list_chunks(document.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn given_failed_chunking_when_requested_again_then_document_is_retryable() {
    let h = harness();
    let key = stored_blob(&h.blob_store, "content").await;
    let document = h
        .service
        .submit(new_document(vec![key], MediaType::PlainText))
        .await
        .unwrap();
    h.service.approve(document.id).await.unwrap();
    h.service.request_chunking(document.id).await.unwrap();
    h.service
        .fail_chunking(document.id, "store unavailable")
        .await
        .unwrap();

    let failed = h.service.get_document(document.id).await.unwrap();
    assert_eq!(failed.status, DocumentStatus::ChunkFailed);
    assert_eq!(failed.failure_detail.as_deref(), Some("store unavailable"));

    h.service.request_chunking(document.id).await.unwrap();
    let retried = h.service.get_document(document.id).await.unwrap();
    assert_eq!(retried.status, DocumentStatus::Chunking);
    assert!(retried.failure_detail.is_none());
}

#[tokio::test]
async fn given_chunked_document_when_deleted_then_chunks_and_blobs_are_gone() {
    let h = harness();
    let key = stored_blob(&h.blob_store, "content").await;
    let document = h
        .service
        .submit(new_document(vec![key.clone()], MediaType::PlainText))
        .await
        .unwrap();
    h.service.approve(document.id).await.unwrap();
    h.service.request_chunking(document.id).await.unwrap();
    h.service
        .complete_chunking(
            document.id,
            vec![Chunk::new(document.id, 0, "content".to_string())],
        )
        .await
        .unwrap();

    h.service.delete_document(document.id).await.unwrap();

    assert!(matches!(
        h.service.get_document(document.id).await,
        Err(LifecycleError::NotFound(_))
    ));
    assert!(matches!(
        h.blob_store.head(&key).await,
        Err(BlobStoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn given_unknown_document_when_chunks_listed_then_not_found() {
    let h = harness();

    let result = h
        .service
        .list_chunks(boardrag::domain::DocumentId::new())
        .await;

    assert!(matches!(result, Err(LifecycleError::NotFound(_))));
}

#[tokio::test]
async fn given_documents_by_two_owners_when_listing_by_owner_then_filters_apply() {
    let h = harness();
    let key_a = stored_blob(&h.blob_store, "a").await;
    let key_b = stored_blob(&h.blob_store, "b").await;

    let mut new_a = new_document(vec![key_a], MediaType::PlainText);
    let owner_a = Uuid::new_v4();
    new_a.owner_id = owner_a;
    h.service.submit(new_a).await.unwrap();

    let new_b = new_document(vec![key_b], MediaType::PlainText);
    h.service.submit(new_b).await.unwrap();

    let owned = h
        .service
        .list_documents(&DocumentFilter {
            owner_id: Some(owner_a),
            status: None,
        })
        .await
        .unwrap();

    assert_eq!(owned.len(), 1);
    assert_eq!(owned[0].owner_id, owner_a);
}
