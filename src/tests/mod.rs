mod previews;

use std::sync::Arc;

use crate::app::AppService;
use crate::config::ExtractorKind;
use crate::metadata;
use crate::storage::SqliteStore;

/// In-memory store shared with an app built around it, so tests can seed
/// and inspect rows the service wrote.
pub fn create_app(extractor: ExtractorKind) -> (Arc<AppService>, Arc<SqliteStore>) {
    let store = Arc::new(SqliteStore::open("sqlite::memory:").expect("failed to open store"));
    let client = crate::scrape::client().expect("failed to build http client");

    let app = AppService::new(store.clone(), client, metadata::extractor_for(extractor));
    (Arc::new(app), store)
}
