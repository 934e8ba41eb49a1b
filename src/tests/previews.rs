use std::collections::HashSet;

use scraper::{Html, Selector};

use crate::app::AppError;
use crate::config::ExtractorKind;
use crate::previews::{escape_html, GeneratePreviewRequest, NOT_FOUND_MESSAGE};
use crate::storage::Store;

use super::create_app;

fn request(title: &str, description: &str, thumbnail_url: &str, url: &str) -> GeneratePreviewRequest {
    GeneratePreviewRequest {
        title: title.to_string(),
        description: description.to_string(),
        thumbnail_url: thumbnail_url.to_string(),
        url: url.to_string(),
        keywords: vec!["k".to_string()],
    }
}

#[test]
pub fn test_escape_html() {
    assert_eq!(escape_html("A&B"), "A&amp;B");
    assert_eq!(
        escape_html(r#"<a href="x">'y'</a>"#),
        "&lt;a href=&quot;x&quot;&gt;&#x27;y&#x27;&lt;/a&gt;"
    );
    assert_eq!(escape_html("plain text"), "plain text");
    assert_eq!(escape_html(""), "");
}

#[test]
pub fn test_generate_embed_code() {
    let (app, _store) = create_app(ExtractorKind::Constant);

    let preview = app
        .generate_preview(request("A&B", "d", "http://t", "http://u"))
        .unwrap();

    assert_eq!(
        preview.embed_code,
        r#"<div><a href="http://u" target="_blank"><img src="http://t" alt="A&amp;B"/><p>A&amp;B</p></a><p>d</p></div>"#
    );
}

#[test]
pub fn test_embed_code_is_well_formed() {
    let (app, _store) = create_app(ExtractorKind::Constant);

    let preview = app
        .generate_preview(request(
            "Tom's <b>\"page\"</b>",
            "d & </p><p>e",
            "http://t/?a=1&b='2'",
            "http://u?x=1&y=2",
        ))
        .unwrap();

    let fragment = Html::parse_fragment(&preview.embed_code);
    let select = |css: &str| {
        let selector = Selector::parse(css).unwrap();
        fragment.select(&selector).collect::<Vec<_>>()
    };

    assert_eq!(select("div").len(), 1);
    assert_eq!(select("img").len(), 1);
    assert_eq!(select("p").len(), 2);
    assert!(select("b").is_empty());

    let links = select("div > a");
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].value().attr("href"), Some("http://u?x=1&y=2"));
    assert_eq!(links[0].value().attr("target"), Some("_blank"));

    let images = select("div > a > img");
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].value().attr("src"), Some("http://t/?a=1&b='2'"));
    assert_eq!(images[0].value().attr("alt"), Some("Tom's <b>\"page\"</b>"));

    let title = select("div > a > p");
    assert_eq!(title.len(), 1);
    assert_eq!(title[0].text().collect::<String>(), "Tom's <b>\"page\"</b>");

    let description = select("div > p");
    assert_eq!(description.len(), 1);
    assert_eq!(description[0].text().collect::<String>(), "d & </p><p>e");
}

#[test]
pub fn test_generate_escapes_every_field() {
    let (app, _store) = create_app(ExtractorKind::Constant);

    let preview = app
        .generate_preview(request(
            "<script>alert(1)</script>",
            "\"quoted\" & <b>bold</b>",
            "http://t/?a=1&b='2'",
            "javascript:\"><img onerror=x>",
        ))
        .unwrap();

    let embed = &preview.embed_code;
    assert!(!embed.contains("<script>"));
    assert!(!embed.contains("<b>"));
    assert!(!embed.contains("'2'"));
    assert!(!embed.contains("\"><img onerror"));
    assert!(embed.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    assert!(embed.contains("&quot;quoted&quot; &amp; &lt;b&gt;bold&lt;/b&gt;"));
    assert!(embed.contains("http://t/?a=1&amp;b=&#x27;2&#x27;"));
    assert!(embed.starts_with("<div><a href=\""));
    assert!(embed.ends_with("</p></div>"));
}

#[test]
pub fn test_generate_response_echoes_input() {
    let (app, _store) = create_app(ExtractorKind::Constant);

    let preview = app
        .generate_preview(request("A&B", "<d>", "http://t", "http://u?x=1&y=2"))
        .unwrap();

    assert_eq!(preview.title, "A&B");
    assert_eq!(preview.description, "<d>");
    assert_eq!(preview.thumbnail_url, "http://t");
    assert_eq!(preview.url, "http://u?x=1&y=2");
    assert!(!preview.preview_id.is_empty());
}

#[test]
pub fn test_generate_ids_unique() {
    let (app, _store) = create_app(ExtractorKind::Constant);

    let ids: HashSet<String> = (0..20)
        .map(|_| {
            app.generate_preview(request("same", "same", "same", "same"))
                .unwrap()
                .preview_id
        })
        .collect();

    assert_eq!(ids.len(), 20);
}

#[test]
pub fn test_generate_persists_escaped_record() {
    let (app, store) = create_app(ExtractorKind::Constant);

    let preview = app
        .generate_preview(GeneratePreviewRequest {
            keywords: vec!["b&c".to_string(), "a".to_string()],
            ..request("A&B", "d<", "http://t", "http://u")
        })
        .unwrap();

    let stored = store.find_preview(&preview.preview_id).unwrap().unwrap();
    assert_eq!(stored.title.as_deref(), Some("A&amp;B"));
    assert_eq!(stored.description.as_deref(), Some("d&lt;"));
    assert_eq!(stored.thumbnail.as_deref(), Some("http://t"));
    // keywords are kept raw and in order
    assert_eq!(stored.keywords, vec!["b&c", "a"]);

    let metadata = stored.metadata.unwrap();
    assert_eq!(metadata["original_url"], "http://u");
    assert_eq!(metadata["embed_code"], preview.embed_code);
}

#[test]
pub fn test_retrieve_generated_preview() {
    let (app, _store) = create_app(ExtractorKind::Constant);

    let preview = app
        .generate_preview(request("A&B", "d", "http://t", "http://u"))
        .unwrap();

    let retrieved = app.retrieve_preview(&preview.preview_id).unwrap();
    assert_eq!(retrieved.title, "A&amp;B");
    assert_eq!(retrieved.description, "d");
    assert_eq!(retrieved.thumbnail, "http://t");
    assert_eq!(retrieved.metadata["original_url"], "http://u");
    assert_eq!(retrieved.metadata["embed_code"], preview.embed_code);
    assert_eq!(retrieved.metadata.len(), 2);
}

#[test]
pub fn test_retrieve_missing() {
    let (app, _store) = create_app(ExtractorKind::Constant);

    let err = app.retrieve_preview("does-not-exist").unwrap_err();
    match err {
        AppError::NotFound(msg) => assert_eq!(msg, NOT_FOUND_MESSAGE),
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
pub fn test_retrieve_normalizes_absent_fields() {
    let (app, store) = create_app(ExtractorKind::Constant);
    store
        .execute("INSERT INTO previews (id, keywords) VALUES ('bare', '[]')")
        .unwrap();

    let retrieved = app.retrieve_preview("bare").unwrap();
    assert_eq!(retrieved.title, "");
    assert_eq!(retrieved.description, "");
    assert_eq!(retrieved.thumbnail, "");
    assert!(retrieved.metadata.is_empty());
}
