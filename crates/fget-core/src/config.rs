//! Per-download configuration, lifecycle hooks, and on-disk CLI defaults.

use crate::error::DownloadError;
use crate::request::ResponseMetadata;
use anyhow::Result;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Called with the 1-based attempt number before each attempt starts.
pub type OnAttempt = dyn Fn(u32) + Send + Sync;
/// Called with the error and attempt number after each failed attempt.
pub type OnError = dyn Fn(&DownloadError, u32) + Send + Sync;
/// Return true to stop retrying and surface the error as terminal.
pub type ShouldStop = dyn Fn(&DownloadError) -> bool + Send + Sync;
/// Return false to abort the download without an error.
pub type OnResponse = dyn Fn(&ResponseMetadata) -> bool + Send + Sync;
/// Return a replacement file name, or None to keep the resolved one.
pub type OnBeforeSave = dyn Fn(&str) -> Option<String> + Send + Sync;
/// (percentage, chunk, remaining bytes). Percentage is NaN and remaining is
/// None when the server did not declare a total size.
pub type OnProgress = dyn Fn(f64, &[u8], Option<u64>) + Send + Sync;

/// Optional lifecycle hooks, invoked inline in the attempt's control flow.
#[derive(Default)]
pub struct Hooks {
    pub on_attempt: Option<Box<OnAttempt>>,
    pub on_error: Option<Box<OnError>>,
    pub should_stop: Option<Box<ShouldStop>>,
    pub on_response: Option<Box<OnResponse>>,
    pub on_before_save: Option<Box<OnBeforeSave>>,
    pub on_progress: Option<Box<OnProgress>>,
}

/// Immutable configuration for one logical download.
pub struct DownloadConfig {
    /// Direct HTTP/HTTPS URL to download.
    pub url: String,
    /// Target directory, created recursively when missing.
    pub directory: PathBuf,
    /// Explicit file name; when None the name is deduced from the URL and
    /// the response headers.
    pub file_name: Option<String>,
    /// Resolve name collisions by numbering instead of overwriting.
    pub clone_files: bool,
    /// Skip the download when a file with the target name already exists.
    pub skip_existing_file_name: bool,
    /// Request-level timeout (connect and read inactivity).
    pub timeout: Duration,
    /// Extra request headers.
    pub headers: HeaderMap,
    /// Proxy URL; ignored when `client` is set.
    pub proxy: Option<String>,
    /// Custom prebuilt client; takes precedence over `proxy`.
    pub client: Option<reqwest::Client>,
    /// Accumulate the whole body in memory and write it in one call instead
    /// of streaming chunks to disk.
    pub should_buffer_response: bool,
    /// Run filesystem probes (skip checks, collision resolution) with
    /// `std::fs` instead of `tokio::fs`.
    pub use_synchronous_mode: bool,
    /// Attempt ceiling including the first; 0 retries until `should_stop`
    /// says otherwise.
    pub max_attempts: u32,
    /// Wait between attempts; None retries immediately.
    pub delay_between_attempts: Option<Duration>,
    /// Deadline for one whole attempt (request plus persistence).
    pub attempt_timeout: Duration,
    pub hooks: Hooks,
}

impl DownloadConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            directory: PathBuf::from("."),
            file_name: None,
            clone_files: true,
            skip_existing_file_name: false,
            timeout: Duration::from_millis(6_000),
            headers: HeaderMap::new(),
            proxy: None,
            client: None,
            should_buffer_response: false,
            use_synchronous_mode: false,
            max_attempts: 0,
            delay_between_attempts: None,
            attempt_timeout: Duration::from_millis(600_000),
            hooks: Hooks::default(),
        }
    }

    pub fn on_attempt(mut self, hook: impl Fn(u32) + Send + Sync + 'static) -> Self {
        self.hooks.on_attempt = Some(Box::new(hook));
        self
    }

    pub fn on_error(
        mut self,
        hook: impl Fn(&DownloadError, u32) + Send + Sync + 'static,
    ) -> Self {
        self.hooks.on_error = Some(Box::new(hook));
        self
    }

    pub fn should_stop(
        mut self,
        hook: impl Fn(&DownloadError) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.hooks.should_stop = Some(Box::new(hook));
        self
    }

    pub fn on_response(
        mut self,
        hook: impl Fn(&ResponseMetadata) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.hooks.on_response = Some(Box::new(hook));
        self
    }

    pub fn on_before_save(
        mut self,
        hook: impl Fn(&str) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.hooks.on_before_save = Some(Box::new(hook));
        self
    }

    pub fn on_progress(
        mut self,
        hook: impl Fn(f64, &[u8], Option<u64>) + Send + Sync + 'static,
    ) -> Self {
        self.hooks.on_progress = Some(Box::new(hook));
        self
    }
}

/// Defaults loaded from `~/.config/fget/config.toml`, consumed by the CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Attempt ceiling; 0 retries forever.
    pub max_attempts: u32,
    /// Delay between attempts in milliseconds.
    pub delay_between_attempts_ms: u64,
    /// Per-attempt deadline in milliseconds.
    pub attempt_timeout_ms: u64,
    /// Request-level (connect/read) timeout in milliseconds.
    pub request_timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay_between_attempts_ms: 500,
            attempt_timeout_ms: 600_000,
            request_timeout_ms: 6_000,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("fget")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load the defaults file from disk, creating it with defaults if missing.
pub fn load_or_init() -> Result<AppConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = AppConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    let data = fs::read_to_string(&path)?;
    let cfg: AppConfig = toml::from_str(&data)?;
    Ok(cfg)
}
