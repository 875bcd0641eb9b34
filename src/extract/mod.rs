/// Salient text extraction from fetched markup
mod extractor;
mod types;

pub use extractor::{ContentExtractor, DEFAULT_HEADING_TAGS};
pub use types::{ExtractedContent, SegmentKind};
