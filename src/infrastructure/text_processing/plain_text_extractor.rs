use async_trait::async_trait;

use crate::application::ports::{ExtractorError, TextExtractor};
use crate::domain::MediaType;

/// UTF-8 decode for text-family payloads. Markdown is passed through as-is;
/// chunk boundaries do not care about markup.
pub struct PlainTextExtractor;

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    fn supports(&self, media_type: MediaType) -> bool {
        matches!(media_type, MediaType::PlainText | MediaType::Markdown)
    }

    async fn extract(
        &self,
        data: &[u8],
        media_type: MediaType,
    ) -> Result<String, ExtractorError> {
        if !self.supports(media_type) {
            return Err(ExtractorError::UnsupportedMediaType(
                media_type.as_mime().to_string(),
            ));
        }

        String::from_utf8(data.to_vec())
            .map_err(|e| ExtractorError::ExtractionFailed(e.to_string()))
    }
}
