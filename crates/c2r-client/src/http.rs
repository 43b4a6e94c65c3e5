//! Shared HTTP response helpers.

use crate::error::ClientError;

/// Upper bound on how much of an error body ends up in an error message.
const MAX_ERROR_BODY: usize = 512;

/// Return the response unchanged on a 2xx status, otherwise
/// [`ClientError::Api`] carrying the status code and (truncated) body.
pub async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    Err(ClientError::Api {
        status,
        message: truncate(body.trim(), MAX_ERROR_BODY),
    })
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &text[..end])
}
