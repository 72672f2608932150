//! Public facade: retry-wrapped transfers plus cancellation plumbing.

use crate::config::DownloadConfig;
use crate::control::CancelToken;
use crate::error::DownloadError;
use crate::retry::{run_with_retry, RetryPolicy};
use crate::transfer::Transfer;
use std::path::PathBuf;
use std::sync::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadStatus {
    Complete,
    Aborted,
}

/// Terminal outcome of a download: the final path on completion, or no path
/// when the transfer was skipped or vetoed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReport {
    pub download_status: DownloadStatus,
    pub file_path: Option<PathBuf>,
}

impl DownloadReport {
    pub(crate) fn complete(path: PathBuf) -> Self {
        Self {
            download_status: DownloadStatus::Complete,
            file_path: Some(path),
        }
    }

    pub(crate) fn aborted() -> Self {
        Self {
            download_status: DownloadStatus::Aborted,
            file_path: None,
        }
    }
}

/// One logical file download.
///
/// `download()` runs the attempt sequence under the configured retry policy;
/// `cancel()` aborts the in-flight attempt and stops further retries. A
/// cancelled download surfaces [`DownloadError::Cancelled`] even when the
/// abort manifested as a transport or timeout error underneath.
pub struct Downloader {
    config: DownloadConfig,
    current: Mutex<Option<CancelToken>>,
}

impl Downloader {
    pub fn new(config: DownloadConfig) -> Self {
        Self {
            config,
            current: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &DownloadConfig {
        &self.config
    }

    /// Cancels the download currently in flight. No-op when none is running.
    pub fn cancel(&self) {
        if let Some(token) = self.current.lock().unwrap().as_ref() {
            tracing::debug!("cancellation requested");
            token.cancel();
        }
    }

    /// Runs the whole transfer, one attempt at a time, until success, veto,
    /// exhaustion, stop, or cancellation.
    pub async fn download(&self) -> Result<DownloadReport, DownloadError> {
        let cancel = CancelToken::new();
        *self.current.lock().unwrap() = Some(cancel.clone());

        let config = &self.config;
        let token = cancel.clone();
        let policy = RetryPolicy::from_config(config);
        let result =
            run_with_retry(&policy, move || Transfer::new(config, token.clone()).run()).await;

        *self.current.lock().unwrap() = None;

        // Cancellation wins over whatever error the abort produced, the
        // per-attempt deadline included.
        match result {
            Err(_) if cancel.is_cancelled() => Err(DownloadError::Cancelled),
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_is_a_noop_when_idle() {
        let downloader = Downloader::new(DownloadConfig::new("https://example.com/file.bin"));
        downloader.cancel();
        assert!(downloader.current.lock().unwrap().is_none());
    }

    #[test]
    fn report_constructors() {
        let complete = DownloadReport::complete(PathBuf::from("/tmp/a.bin"));
        assert_eq!(complete.download_status, DownloadStatus::Complete);
        assert_eq!(complete.file_path.as_deref(), Some(std::path::Path::new("/tmp/a.bin")));

        let aborted = DownloadReport::aborted();
        assert_eq!(aborted.download_status, DownloadStatus::Aborted);
        assert!(aborted.file_path.is_none());
    }
}
