use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::error::Error;

const USER_AGENT_DEFAULT: &str =
    "Mozilla/5.0 (X11; Linux x86_64; rv:124.0) Gecko/20100101 Firefox/124.0";

pub const STATUS_SUCCESS: &str = "Success";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResult {
    pub content: String,
    pub status: String,
}

impl FetchResult {
    fn failed(status: String) -> Self {
        Self {
            content: String::new(),
            status,
        }
    }
}

/// Client shared by every fetch. Redirects are not followed, a 3xx is
/// reported like any other non-200 status. Timeouts are the library default.
pub fn client() -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT_DEFAULT)
        .redirect(reqwest::redirect::Policy::none())
        .build()
}

fn get_error(error: &reqwest::Error) -> String {
    match error.source() {
        Some(e) => match e.source() {
            Some(e) => format!("{error}: {e}"),
            None => format!("{error}: {e}"),
        },
        None => error.to_string(),
    }
}

/// Performs one GET. Failures never surface as errors, they are described in
/// the returned `status` with empty `content`.
pub async fn fetch_page(client: &reqwest::Client, url: &str) -> FetchResult {
    log::debug!("{url}: requesting");

    let resp = match client.get(url).send().await {
        Ok(r) => r,
        Err(err) => {
            let err = get_error(&err);
            log::error!("{url}: {err}");
            return FetchResult::failed(format!("RequestError occurred: {err}"));
        }
    };

    let status = resp.status();

    if status != StatusCode::OK {
        log::debug!("{url}: {status}");
        return FetchResult::failed(format!("Failed with status code {}", status.as_u16()));
    }

    match resp.text().await {
        Ok(content) => FetchResult {
            content,
            status: STATUS_SUCCESS.to_string(),
        },
        Err(err) => {
            let err = get_error(&err);
            log::error!("{url}: {err}");
            FetchResult::failed(format!("RequestError occurred: {err}"))
        }
    }
}
