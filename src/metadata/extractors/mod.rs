pub mod constant;
pub mod html;

use crate::config::ExtractorKind;
use crate::metadata::types::ExtractedMetadata;

/// Strategy for turning raw page content into preview metadata.
pub trait MetadataExtractor: Send + Sync {
    /// Never fails: unusable input yields empty fields.
    fn extract(&self, raw_content: &str) -> ExtractedMetadata;

    /// Get the name of this extractor for logging/debugging
    fn name(&self) -> &'static str;
}

pub fn extractor_for(kind: ExtractorKind) -> Box<dyn MetadataExtractor> {
    match kind {
        ExtractorKind::Html => Box::new(html::HtmlExtractor::new()),
        ExtractorKind::Constant => Box::new(constant::ConstantExtractor::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extractor_for_kind() {
        assert_eq!(extractor_for(ExtractorKind::Html).name(), "Html");
        assert_eq!(extractor_for(ExtractorKind::Constant).name(), "Constant");
    }

    #[test]
    fn test_default_matches_new() {
        let page = "<title>t</title>";

        let a = html::HtmlExtractor::default().extract(page);
        let b = html::HtmlExtractor::new().extract(page);
        assert_eq!(a.title, b.title);

        let a = constant::ConstantExtractor::default().extract(page);
        let b = constant::ConstantExtractor::new().extract(page);
        assert_eq!(a.title, b.title);
        assert_eq!(a.keywords, b.keywords);
    }
}
