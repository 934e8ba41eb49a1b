use crate::metadata::extractors::MetadataExtractor;
use crate::metadata::types::ExtractedMetadata;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

static META_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta").expect("Failed to compile meta selector"));
static TITLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("title").expect("Failed to compile title selector"));

/// Reads title, description, keywords and thumbnail from `<meta>` tags,
/// falling back to `<title>` for the title.
#[derive(Default)]
pub struct HtmlExtractor;

impl HtmlExtractor {
    pub fn new() -> Self {
        Self
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn parse_keywords(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(ToString::to_string)
        .collect()
}

impl MetadataExtractor for HtmlExtractor {
    fn extract(&self, raw_content: &str) -> ExtractedMetadata {
        let document = Html::parse_document(raw_content);

        let mut title = None;
        let mut description = None;
        let mut twitter_description = None;
        let mut keywords = None;
        let mut thumbnail_url = None;

        for element in document.select(&META_SELECTOR) {
            let meta_prop = element.attr("property").unwrap_or_default();
            let meta_key = element.attr("name").unwrap_or(meta_prop).to_lowercase();
            let meta_value = element.attr("content").unwrap_or_default();

            match meta_key.as_str() {
                "og:title" | "twitter:title" if title.is_none() => {
                    title = non_empty(meta_value);
                }
                "description" | "og:description" if description.is_none() => {
                    description = non_empty(meta_value);
                }
                "twitter:description" if twitter_description.is_none() => {
                    twitter_description = non_empty(meta_value);
                }
                "keywords" if keywords.is_none() => {
                    keywords = Some(parse_keywords(meta_value));
                }
                "og:image" | "twitter:image" | "twitter:image:src" if thumbnail_url.is_none() => {
                    thumbnail_url = non_empty(meta_value);
                }
                _ => {}
            }
        }

        if title.is_none() {
            title = document
                .select(&TITLE_SELECTOR)
                .next()
                .and_then(|element| non_empty(&element.text().collect::<String>()));
        }

        ExtractedMetadata {
            title: title.unwrap_or_default(),
            description: description.or(twitter_description).unwrap_or_default(),
            keywords: keywords.unwrap_or_default(),
            thumbnail_url,
        }
    }

    fn name(&self) -> &'static str {
        "Html"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!doctype html>
<html>
<head>
    <title>  Plain title </title>
    <meta name="description" content="A page about things">
    <meta name="Keywords" content="rust, http , ,previews">
    <meta property="og:image" content="https://example.com/cover.png">
    <meta name="twitter:image" content="https://example.com/twitter.png">
</head>
<body><p>hello</p></body>
</html>"#;

    #[test]
    fn test_extract_basic_page() {
        let meta = HtmlExtractor::new().extract(PAGE);
        assert_eq!(meta.title, "Plain title");
        assert_eq!(meta.description, "A page about things");
        assert_eq!(meta.keywords, vec!["rust", "http", "previews"]);
        assert_eq!(
            meta.thumbnail_url.as_deref(),
            Some("https://example.com/cover.png")
        );
    }

    #[test]
    fn test_og_title_preferred() {
        let page = r#"<html><head>
            <title>Fallback</title>
            <meta property="og:title" content="Open Graph title">
        </head></html>"#;
        let meta = HtmlExtractor::new().extract(page);
        assert_eq!(meta.title, "Open Graph title");
    }

    #[test]
    fn test_twitter_description_fallback() {
        let page = r#"<html><head>
            <meta name="twitter:description" content="from twitter">
        </head></html>"#;
        let meta = HtmlExtractor::new().extract(page);
        assert_eq!(meta.description, "from twitter");
    }

    #[test]
    fn test_empty_input() {
        let meta = HtmlExtractor::new().extract("");
        assert_eq!(meta, ExtractedMetadata::default());
    }

    #[test]
    fn test_not_html() {
        let meta = HtmlExtractor::new().extract("just some text, no markup");
        assert_eq!(meta.title, "");
        assert!(meta.keywords.is_empty());
        assert_eq!(meta.thumbnail_url, None);
    }

    #[test]
    fn test_output_varies_with_input() {
        let extractor = HtmlExtractor::new();
        let a = extractor.extract("<title>a</title>");
        let b = extractor.extract("<title>b</title>");
        assert_ne!(a, b);
    }
}
