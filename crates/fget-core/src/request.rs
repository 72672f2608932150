//! Request capability: issues the HTTP GET and exposes a cancellable byte stream.
//!
//! The rest of the engine only sees [`ResponseMetadata`] plus a boxed chunk
//! stream, so the transport stays swappable behind this module.

use crate::config::DownloadConfig;
use crate::control::CancelToken;
use crate::error::DownloadError;
use bytes::Bytes;
use futures_util::Stream;
use reqwest::header::{HeaderMap, CONTENT_LENGTH};
use reqwest::StatusCode;
use std::pin::Pin;
use url::Url;

pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes, reqwest::Error>> + Send>>;

/// Status line, headers, and final URL after redirects.
#[derive(Debug, Clone)]
pub struct ResponseMetadata {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub url: Url,
}

impl ResponseMetadata {
    /// Declared Content-Length, when the server sent one.
    pub fn content_length(&self) -> Option<u64> {
        self.headers.get(CONTENT_LENGTH)?.to_str().ok()?.parse().ok()
    }
}

pub struct HttpResponse {
    pub meta: ResponseMetadata,
    pub body: BodyStream,
}

/// Custom client wins over proxy; otherwise a fresh client with the
/// configured timeouts (and proxy, when given).
fn build_client(config: &DownloadConfig) -> Result<reqwest::Client, DownloadError> {
    if let Some(client) = &config.client {
        return Ok(client.clone());
    }
    let mut builder = reqwest::Client::builder()
        .connect_timeout(config.timeout)
        .read_timeout(config.timeout);
    if let Some(proxy) = &config.proxy {
        builder = builder.proxy(reqwest::Proxy::all(proxy)?);
    }
    Ok(builder.build()?)
}

/// Issues the GET. Races the send against the cancellation token so a cancel
/// before the response arrives still takes effect.
pub async fn send(
    config: &DownloadConfig,
    cancel: &CancelToken,
) -> Result<HttpResponse, DownloadError> {
    let client = build_client(config)?;
    let request = client.get(&config.url).headers(config.headers.clone());

    let response = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(DownloadError::Cancelled),
        result = request.send() => result?,
    };
    tracing::debug!(status = %response.status(), url = %response.url(), "response received");

    let meta = ResponseMetadata {
        status: response.status(),
        headers: response.headers().clone(),
        url: response.url().clone(),
    };
    Ok(HttpResponse {
        meta,
        body: Box::pin(response.bytes_stream()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    fn meta_with_length(value: &str) -> ResponseMetadata {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_LENGTH, HeaderValue::from_str(value).unwrap());
        ResponseMetadata {
            status: StatusCode::OK,
            headers,
            url: Url::parse("https://example.com/file.bin").unwrap(),
        }
    }

    #[test]
    fn content_length_parses() {
        assert_eq!(meta_with_length("1048576").content_length(), Some(1_048_576));
    }

    #[test]
    fn content_length_absent_or_malformed() {
        let meta = ResponseMetadata {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            url: Url::parse("https://example.com/").unwrap(),
        };
        assert_eq!(meta.content_length(), None);
        assert_eq!(meta_with_length("garbage").content_length(), None);
    }
}
