use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;

use boardrag::application::ports::{
    BlobStore, ChunkPolicy, ChunkQueue, ChunkRepository, DocumentRepository, JobRepository,
    TextExtractor, TextSplitter,
};
use boardrag::application::services::{ChunkWorker, DocumentLifecycleService, WorkerConfig};
use boardrag::infrastructure::observability::{init_tracing, TracingConfig};
use boardrag::infrastructure::persistence::{
    create_pool, ensure_schema, InMemoryChunkRepository, InMemoryDocumentRepository,
    InMemoryJobRepository, PgChunkRepository, PgDocumentRepository, PgJobRepository,
};
use boardrag::infrastructure::queue::InMemoryChunkQueue;
use boardrag::infrastructure::storage::{InMemoryBlobStore, LocalBlobStore};
use boardrag::infrastructure::text_processing::{BoundaryCharacterSplitter, ExtractorRegistry};
use boardrag::presentation::config::{MetadataProvider, StorageProvider};
use boardrag::presentation::{create_router, AppState, Environment, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".to_string())
        .try_into()
        .map_err(anyhow::Error::msg)?;

    let settings = Settings::load(environment)?;
    init_tracing(TracingConfig::default(), settings.server.port);

    let blob_store: Arc<dyn BlobStore> = match settings.storage.provider {
        StorageProvider::Memory => Arc::new(InMemoryBlobStore::new()),
        StorageProvider::Local => Arc::new(LocalBlobStore::new(PathBuf::from(
            &settings.storage.local_path,
        ))?),
    };

    let (documents, chunks, jobs): (
        Arc<dyn DocumentRepository>,
        Arc<dyn ChunkRepository>,
        Arc<dyn JobRepository>,
    ) = match settings.database.provider {
        MetadataProvider::Memory => (
            Arc::new(InMemoryDocumentRepository::new()),
            Arc::new(InMemoryChunkRepository::new()),
            Arc::new(InMemoryJobRepository::new()),
        ),
        MetadataProvider::Postgres => {
            let pool =
                create_pool(&settings.database.url, settings.database.max_connections).await?;
            ensure_schema(&pool).await?;
            (
                Arc::new(PgDocumentRepository::new(pool.clone())),
                Arc::new(PgChunkRepository::new(pool.clone())),
                Arc::new(PgJobRepository::new(pool)),
            )
        }
    };

    let extractor: Arc<dyn TextExtractor> = Arc::new(ExtractorRegistry::with_defaults());

    let policy = ChunkPolicy::new(
        settings.chunking.max_chunk_size,
        settings.chunking.overlap,
        settings.chunking.boundary_lookback,
    )?;
    let splitter: Arc<dyn TextSplitter> = Arc::new(BoundaryCharacterSplitter::new(policy));

    let queue: Arc<dyn ChunkQueue> = Arc::new(InMemoryChunkQueue::new(Duration::from_secs(
        settings.worker.visibility_timeout_secs,
    )));

    let lifecycle = Arc::new(DocumentLifecycleService::new(
        Arc::clone(&documents),
        Arc::clone(&chunks),
        Arc::clone(&blob_store),
        Arc::clone(&extractor),
        Arc::clone(&queue),
        Arc::clone(&jobs),
    ));

    let worker_config = WorkerConfig {
        max_attempts: settings.worker.max_attempts,
        io_timeout: Duration::from_secs(settings.worker.io_timeout_secs),
    };
    let mut worker_handles = Vec::with_capacity(settings.worker.count);
    for _ in 0..settings.worker.count {
        let worker = ChunkWorker::new(
            Arc::clone(&queue),
            Arc::clone(&blob_store),
            Arc::clone(&extractor),
            Arc::clone(&splitter),
            Arc::clone(&lifecycle),
            Arc::clone(&jobs),
            worker_config.clone(),
        );
        worker_handles.push(tokio::spawn(worker.run()));
    }

    let state = AppState {
        lifecycle,
        blob_store,
        jobs,
        queue: Arc::clone(&queue),
    };

    let router = create_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;
    tracing::info!(%addr, environment = %environment, "Listening");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Closing the queue lets in-flight jobs finish and then stops the workers.
    queue.close().await;
    for result in futures::future::join_all(worker_handles).await {
        if let Err(e) = result {
            tracing::warn!(error = %e, "Worker task panicked");
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
