use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::application::ports::{ExtractorError, TextExtractor};
use crate::domain::MediaType;

/// Explicit media type → extractor mapping. Unregistered types fail with
/// `UnsupportedMediaType`, both at submit time (via `supports`) and at
/// extraction time.
pub struct ExtractorRegistry {
    extractors: HashMap<MediaType, Arc<dyn TextExtractor>>,
}

impl ExtractorRegistry {
    pub fn new(extractors: Vec<(MediaType, Arc<dyn TextExtractor>)>) -> Self {
        Self {
            extractors: extractors.into_iter().collect(),
        }
    }

    /// Default registration: text family plus PDF. `Docx` is intentionally
    /// left unregistered until a Word extractor lands.
    pub fn with_defaults() -> Self {
        let text: Arc<dyn TextExtractor> = Arc::new(super::PlainTextExtractor);
        let pdf: Arc<dyn TextExtractor> = Arc::new(super::PdfExtractor::new());
        Self::new(vec![
            (MediaType::PlainText, Arc::clone(&text)),
            (MediaType::Markdown, text),
            (MediaType::Pdf, pdf),
        ])
    }
}

#[async_trait]
impl TextExtractor for ExtractorRegistry {
    fn supports(&self, media_type: MediaType) -> bool {
        self.extractors.contains_key(&media_type)
    }

    async fn extract(
        &self,
        data: &[u8],
        media_type: MediaType,
    ) -> Result<String, ExtractorError> {
        let extractor = self.extractors.get(&media_type).ok_or_else(|| {
            ExtractorError::UnsupportedMediaType(media_type.as_mime().to_string())
        })?;

        extractor.extract(data, media_type).await
    }
}
