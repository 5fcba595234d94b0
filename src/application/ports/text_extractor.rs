use async_trait::async_trait;

use crate::domain::MediaType;

/// Converts stored document bytes into plain text. Pure transform:
/// deterministic given identical bytes, no side effects.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    /// Submit-time capability check; lets callers fail fast before any work
    /// is enqueued.
    fn supports(&self, media_type: MediaType) -> bool;

    async fn extract(&self, data: &[u8], media_type: MediaType)
        -> Result<String, ExtractorError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractorError {
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),
    /// Permanent for a given payload: re-running deterministic extraction on
    /// the same bytes yields the same error, so it is never retried.
    #[error("extraction failed: {0}")]
    ExtractionFailed(String),
}
