use crate::{
    metadata::{ExtractedMetadata, MetadataExtractor},
    previews::{self, GeneratePreviewRequest, PreviewResponse, RetrievePreviewResponse},
    scrape::{self, FetchResult},
    storage::Store,
    submissions::{self, SubmitUrlResponse},
};
use std::sync::Arc;

/// The five operations behind the http api. Each call does exactly one
/// thing; nothing here chains fetch, extract and generate together.
pub struct AppService {
    store: Arc<dyn Store>,
    client: reqwest::Client,
    extractor: Box<dyn MetadataExtractor>,
}

impl AppService {
    pub fn new(
        store: Arc<dyn Store>,
        client: reqwest::Client,
        extractor: Box<dyn MetadataExtractor>,
    ) -> Self {
        log::debug!("using {} metadata extractor", extractor.name());
        Self {
            store,
            client,
            extractor,
        }
    }

    pub async fn fetch_content(&self, url: &str) -> FetchResult {
        scrape::fetch_page(&self.client, url).await
    }

    pub fn extract_metadata(&self, raw_html_content: &str) -> ExtractedMetadata {
        self.extractor.extract(raw_html_content)
    }

    pub fn generate_preview(
        &self,
        request: GeneratePreviewRequest,
    ) -> Result<PreviewResponse, crate::app::AppError> {
        previews::generate(self.store.as_ref(), request)
    }

    pub fn retrieve_preview(&self, id: &str) -> Result<RetrievePreviewResponse, crate::app::AppError> {
        previews::retrieve(self.store.as_ref(), id)
    }

    pub fn submit_url(
        &self,
        url: &str,
        user_token: &str,
    ) -> Result<SubmitUrlResponse, crate::app::AppError> {
        submissions::submit(self.store.as_ref(), url, user_token)
    }
}
