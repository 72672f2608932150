//! fget-core: single-file HTTP downloads with retry, progress reporting, and
//! cooperative cancellation.
//!
//! Configure a [`DownloadConfig`], hand it to a [`Downloader`], and call
//! `download()`; `cancel()` aborts the in-flight attempt from another task.
//! The body is written to `<name>.download` and atomically renamed to its
//! final name only once fully persisted.

pub mod config;
pub mod control;
pub mod downloader;
pub mod error;
pub mod file_name;
pub mod logging;
pub mod progress;
pub mod request;
pub mod retry;
pub mod transfer;

pub use config::DownloadConfig;
pub use downloader::{DownloadReport, DownloadStatus, Downloader};
pub use error::{DownloadError, ResponseBody};

// The CLI shares reqwest types (header maps, clients) through this re-export.
pub use reqwest;
