use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedMetadata {
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
    pub thumbnail_url: Option<String>,
}
