mod client;
mod basic;
pub mod auth;

pub use client::HttpClient;
pub use basic::BasicClient;

use reqwest::{StatusCode, Url};
use tracing::{debug, warn};

use crate::error::BusTimeError;

/// Issues a GET for `url` and returns the body of a successful response.
///
/// 401 and 403 are reported as [`BusTimeError::InvalidApiKey`]; any other
/// non-success status becomes [`BusTimeError::Status`].
pub async fn fetch_bytes<C: HttpClient>(client: &C, url: Url) -> Result<Vec<u8>, BusTimeError> {
    let req = reqwest::Request::new(reqwest::Method::GET, url);

    let resp = client.execute(req).await?;
    let status = resp.status();
    debug!(status = status.as_u16(), "Received response");

    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        return Err(BusTimeError::InvalidApiKey);
    }
    if !status.is_success() {
        let body = match resp.text().await {
            Ok(body) => truncate_body(body),
            Err(e) => {
                warn!(error = %e.without_url(), "Failed to read error response body");
                String::new()
            }
        };
        return Err(BusTimeError::Status {
            status: status.as_u16(),
            body,
        });
    }

    Ok(resp.bytes().await?.to_vec())
}

/// Longest error body kept in [`BusTimeError::Status`].
pub const MAX_ERROR_BODY_BYTES: usize = 512;

fn truncate_body(mut body: String) -> String {
    if body.len() <= MAX_ERROR_BODY_BYTES {
        return body;
    }
    let mut end = MAX_ERROR_BODY_BYTES;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    body.truncate(end);
    body.push_str("...");
    body
}
