//! Typed errors shared by the transfer state machine and the retry loop.

use reqwest::header::HeaderMap;
use std::time::Duration;
use thiserror::Error;

/// Body of a failed HTTP response, parsed as JSON when syntactically valid.
#[derive(Debug, Clone)]
pub enum ResponseBody {
    Json(serde_json::Value),
    Text(String),
}

impl ResponseBody {
    /// Decode raw body bytes as text, upgrading to JSON when the text parses.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let text = String::from_utf8_lossy(bytes).into_owned();
        match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(value) => ResponseBody::Json(value),
            Err(_) => ResponseBody::Text(text),
        }
    }
}

/// Error surfaced by a download attempt or by the whole retry sequence.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The server answered with a failure status (> 226). Carries the raw
    /// response headers and the drained body.
    #[error("request failed with status code {status}")]
    HttpFailure {
        status: u16,
        headers: HeaderMap,
        body: ResponseBody,
    },

    /// A single attempt exceeded its deadline.
    #[error("attempt timed out after {0:?}")]
    Timeout(Duration),

    /// The caller cancelled the download. Masks the underlying fault
    /// whenever the cancellation flag was set.
    #[error("request cancelled")]
    Cancelled,

    /// Transport-level failure (connect, TLS, proxy, mid-body read).
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Filesystem failure (directory creation, write, rename, delete).
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl DownloadError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DownloadError::Cancelled)
    }

    /// HTTP status code, when this is an HTTP failure.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            DownloadError::HttpFailure { status, .. } => Some(*status),
            _ => None,
        }
    }
}
