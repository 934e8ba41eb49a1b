use crate::metadata::extractors::MetadataExtractor;
use crate::metadata::types::ExtractedMetadata;

/// Ignores its input and always yields the same record.
#[derive(Default)]
pub struct ConstantExtractor;

impl ConstantExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl MetadataExtractor for ConstantExtractor {
    fn extract(&self, _raw_content: &str) -> ExtractedMetadata {
        ExtractedMetadata {
            title: "Extracted Title".to_string(),
            description: "Extracted Description".to_string(),
            keywords: vec![
                "keyword1".to_string(),
                "keyword2".to_string(),
                "keyword3".to_string(),
            ],
            thumbnail_url: Some("http://example.com/thumbnail.jpg".to_string()),
        }
    }

    fn name(&self) -> &'static str {
        "Constant"
    }
}
