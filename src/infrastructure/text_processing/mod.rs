mod boundary_splitter;
mod extractor_registry;
mod pdf_extractor;
mod plain_text_extractor;
mod text_sanitizer;

pub use boundary_splitter::BoundaryCharacterSplitter;
pub use extractor_registry::ExtractorRegistry;
pub use pdf_extractor::PdfExtractor;
pub use plain_text_extractor::PlainTextExtractor;
pub use text_sanitizer::sanitize_extracted_text;
