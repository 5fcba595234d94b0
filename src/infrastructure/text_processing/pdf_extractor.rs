use std::time::Duration;

use async_trait::async_trait;

use crate::application::ports::{ExtractorError, TextExtractor};
use crate::domain::MediaType;

use super::text_sanitizer::sanitize_extracted_text;

const EXTRACTION_TIMEOUT: Duration = Duration::from_secs(30);

/// PDF text extraction via pdf-extract, run on a blocking task so a large or
/// malformed file cannot stall the async runtime.
#[derive(Default)]
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TextExtractor for PdfExtractor {
    fn supports(&self, media_type: MediaType) -> bool {
        media_type == MediaType::Pdf
    }

    #[tracing::instrument(skip(self, data), fields(bytes = data.len()))]
    async fn extract(
        &self,
        data: &[u8],
        media_type: MediaType,
    ) -> Result<String, ExtractorError> {
        if media_type != MediaType::Pdf {
            return Err(ExtractorError::UnsupportedMediaType(
                media_type.as_mime().to_string(),
            ));
        }

        let bytes = data.to_vec();
        let raw = tokio::time::timeout(
            EXTRACTION_TIMEOUT,
            tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes)),
        )
        .await
        .map_err(|_| ExtractorError::ExtractionFailed("PDF extraction timed out".to_string()))?
        .map_err(|e| ExtractorError::ExtractionFailed(format!("task join error: {e}")))?
        .map_err(|e| ExtractorError::ExtractionFailed(format!("failed to parse PDF: {e}")))?;

        let sanitized = sanitize_extracted_text(&raw);
        if sanitized.is_empty() {
            return Err(ExtractorError::ExtractionFailed(
                "no extractable text in PDF".to_string(),
            ));
        }

        tracing::info!(chars = sanitized.len(), "PDF text extraction complete");
        Ok(sanitized)
    }
}
