use crate::{app::AppError, eid::Eid, storage::Store};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const NOT_FOUND_MESSAGE: &str = "Preview with the provided ID does not exist.";

/// A persisted preview. Text fields hold the html-escaped values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preview {
    pub id: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail: Option<String>,
    pub keywords: Vec<String>,
    pub metadata: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GeneratePreviewRequest {
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    pub url: String,
    pub keywords: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PreviewResponse {
    pub preview_id: String,
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    pub url: String,
    pub embed_code: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetrievePreviewResponse {
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub metadata: BTreeMap<String, String>,
}

/// Escapes `& < > " '` so the value is safe inside element text and
/// double- or single-quoted attributes.
pub fn escape_html(input: &str) -> String {
    html_escape::encode_quoted_attribute(input).into_owned()
}

/// Arguments must already be escaped.
fn embed_code(url: &str, thumbnail_url: &str, title: &str, description: &str) -> String {
    format!(
        r#"<div><a href="{url}" target="_blank"><img src="{thumbnail_url}" alt="{title}"/><p>{title}</p></a><p>{description}</p></div>"#
    )
}

/// Persists a new preview and returns it alongside the embed snippet.
///
/// The stored record carries escaped text, while the response echoes the
/// caller's input as given. `embed_code` is the only markup and is always
/// built from escaped values.
pub fn generate(
    store: &dyn Store,
    request: GeneratePreviewRequest,
) -> Result<PreviewResponse, AppError> {
    let preview_id: String = Eid::new().into();

    let title = escape_html(&request.title);
    let description = escape_html(&request.description);
    let thumbnail_url = escape_html(&request.thumbnail_url);
    let url = escape_html(&request.url);

    let embed_code = embed_code(&url, &thumbnail_url, &title, &description);

    let metadata = BTreeMap::from([
        ("original_url".to_string(), url),
        ("embed_code".to_string(), embed_code.clone()),
    ]);

    store.insert_preview(&Preview {
        id: preview_id.clone(),
        title: Some(title),
        description: Some(description),
        thumbnail: Some(thumbnail_url),
        keywords: request.keywords,
        metadata: Some(metadata),
    })?;

    log::info!("preview {preview_id} created for {}", request.url);

    Ok(PreviewResponse {
        preview_id,
        title: request.title,
        description: request.description,
        thumbnail_url: request.thumbnail_url,
        url: request.url,
        embed_code,
    })
}

/// Loads a preview. Absent fields come back empty, never missing.
pub fn retrieve(store: &dyn Store, id: &str) -> Result<RetrievePreviewResponse, AppError> {
    let preview = store
        .find_preview(id)?
        .ok_or_else(|| AppError::NotFound(NOT_FOUND_MESSAGE.to_string()))?;

    Ok(RetrievePreviewResponse {
        title: preview.title.unwrap_or_default(),
        description: preview.description.unwrap_or_default(),
        thumbnail: preview.thumbnail.unwrap_or_default(),
        metadata: preview.metadata.unwrap_or_default(),
    })
}
