use crate::{app::AppError, eid::Eid, storage::Store};
use serde::{Deserialize, Serialize};

pub const SUBMITTED_MESSAGE: &str = "URL successfully submitted for processing.";
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid user token.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUrl {
    pub id: String,
    pub url: String,
    pub user_id: String,
    /// Unix seconds.
    pub created_at: i64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubmitUrlResponse {
    pub message: String,
    pub url_id: String,
}

/// Records `url` under the owner of `user_token`.
///
/// The url is stored as given: no format check and no duplicate detection.
pub fn submit(store: &dyn Store, url: &str, user_token: &str) -> Result<SubmitUrlResponse, AppError> {
    let Some(user_id) = store.find_token_owner(user_token)? else {
        return Err(AppError::Unauthorized(INVALID_TOKEN_MESSAGE.to_string()));
    };

    let user_url = UserUrl {
        id: Eid::new().into(),
        url: url.to_string(),
        user_id,
        created_at: chrono::Utc::now().timestamp(),
    };

    store.insert_user_url(&user_url)?;

    log::info!("url {} submitted by user {}", user_url.id, user_url.user_id);

    Ok(SubmitUrlResponse {
        message: SUBMITTED_MESSAGE.to_string(),
        url_id: user_url.id,
    })
}
