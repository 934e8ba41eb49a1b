pub mod extractors;
pub mod types;

pub use extractors::{extractor_for, MetadataExtractor};
pub use types::ExtractedMetadata;
