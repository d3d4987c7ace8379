use reqwest::StatusCode;
use thiserror::Error;

/// Everything that can go wrong while pulling one snapshot from NSE.
///
/// The poll loop treats every variant the same way: log it and skip the
/// iteration.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}: {preview}")]
    Status {
        status: StatusCode,
        url: String,
        preview: String,
    },

    #[error("Non-JSON response: {0}")]
    NonJsonResponse(String),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Missing data: {0}")]
    MissingData(&'static str),
}

/// First 200 chars of a body, for error messages
pub(crate) fn preview(body: &str) -> String {
    body.chars().take(200).collect()
}
