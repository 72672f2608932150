use anyhow::{Context, Result};
use clap::Parser;
use fget_core::config::{self, AppConfig};
use fget_core::reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use fget_core::{DownloadConfig, DownloadStatus, Downloader};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Download one file over HTTP/HTTPS with retries, progress, and Ctrl-C
/// cancellation.
#[derive(Debug, Parser)]
#[command(name = "fget")]
#[command(about = "fget: single-file HTTP downloader with retry and progress", long_about = None)]
pub struct Cli {
    /// Direct HTTP/HTTPS URL to download.
    pub url: String,

    /// Target directory.
    #[arg(short, long, default_value = ".")]
    pub directory: PathBuf,

    /// Explicit file name (default: deduced from the URL and response headers).
    #[arg(short = 'o', long)]
    pub file_name: Option<String>,

    /// Reuse the target name even when a file of that name exists,
    /// overwriting it instead of numbering a fresh one.
    #[arg(long)]
    pub no_clone: bool,

    /// Skip the download when a file with the target name already exists.
    #[arg(long)]
    pub skip_existing: bool,

    /// Buffer the whole body in memory before writing.
    #[arg(long)]
    pub buffer: bool,

    /// Attempt ceiling; 0 retries forever.
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Delay between attempts in milliseconds.
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Per-attempt deadline in milliseconds.
    #[arg(long)]
    pub attempt_timeout_ms: Option<u64>,

    /// Request-level (connect/read) timeout in milliseconds.
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Extra request header as "Name: value". Repeatable.
    #[arg(short = 'H', long = "header", value_name = "HEADER")]
    pub headers: Vec<String>,

    /// Proxy URL (e.g. http://proxy.example.com:8080).
    #[arg(long)]
    pub proxy: Option<String>,

    /// Suppress the progress line.
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let defaults = config::load_or_init()?;
        tracing::debug!(?defaults, "loaded config defaults");
        cli.run(defaults).await
    }

    async fn run(self, defaults: AppConfig) -> Result<()> {
        let mut config = DownloadConfig::new(&self.url);
        config.directory = self.directory.clone();
        config.file_name = self.file_name.clone();
        config.clone_files = !self.no_clone;
        config.skip_existing_file_name = self.skip_existing;
        config.should_buffer_response = self.buffer;
        config.headers = parse_headers(&self.headers)?;
        config.proxy = self.proxy.clone();
        config.timeout =
            Duration::from_millis(self.timeout_ms.unwrap_or(defaults.request_timeout_ms));
        config.max_attempts = self.max_attempts.unwrap_or(defaults.max_attempts);
        config.delay_between_attempts = Some(Duration::from_millis(
            self.delay_ms.unwrap_or(defaults.delay_between_attempts_ms),
        ))
        .filter(|delay| !delay.is_zero());
        config.attempt_timeout = Duration::from_millis(
            self.attempt_timeout_ms
                .unwrap_or(defaults.attempt_timeout_ms),
        );

        config = config
            .on_attempt(|attempt| {
                if attempt > 1 {
                    tracing::info!(attempt, "retrying");
                }
            })
            .on_error(|error, attempt| {
                tracing::warn!(attempt, %error, "attempt failed");
            });

        if !self.quiet {
            config = config.on_progress(|percentage, _chunk, remaining| {
                if percentage.is_nan() {
                    eprint!("\rdownloading... (size unknown)");
                } else {
                    eprint!(
                        "\r{percentage:6.2}%  ({} bytes left)   ",
                        remaining.unwrap_or(0)
                    );
                }
            });
        }

        let downloader = Arc::new(Downloader::new(config));
        let canceller = Arc::clone(&downloader);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\ninterrupted, cancelling");
                canceller.cancel();
            }
        });

        let report = downloader.download().await.context("download failed")?;
        if !self.quiet {
            eprintln!();
        }
        match report.download_status {
            DownloadStatus::Complete => {
                let path = report
                    .file_path
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                println!("saved to {path}");
            }
            DownloadStatus::Aborted => println!("aborted: nothing downloaded"),
        }
        Ok(())
    }
}

fn parse_headers(raw: &[String]) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for entry in raw {
        let (name, value) = entry
            .split_once(':')
            .with_context(|| format!("invalid header {entry:?}, expected \"Name: value\""))?;
        let name: HeaderName = name
            .trim()
            .parse()
            .with_context(|| format!("invalid header name in {entry:?}"))?;
        let value = HeaderValue::from_str(value.trim())
            .with_context(|| format!("invalid header value in {entry:?}"))?;
        headers.insert(name, value);
    }
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_invocation() {
        let cli = Cli::parse_from(["fget", "https://example.com/file.zip"]);
        assert_eq!(cli.url, "https://example.com/file.zip");
        assert_eq!(cli.directory, PathBuf::from("."));
        assert!(!cli.no_clone);
        assert!(cli.max_attempts.is_none());
    }

    #[test]
    fn parses_full_invocation() {
        let cli = Cli::parse_from([
            "fget",
            "https://example.com/file.zip",
            "-d",
            "/tmp/downloads",
            "-o",
            "out.zip",
            "--no-clone",
            "--skip-existing",
            "--buffer",
            "--max-attempts",
            "5",
            "--delay-ms",
            "250",
            "-H",
            "Authorization: Bearer x",
            "--proxy",
            "http://proxy:8080",
            "--quiet",
        ]);
        assert_eq!(cli.directory, PathBuf::from("/tmp/downloads"));
        assert_eq!(cli.file_name.as_deref(), Some("out.zip"));
        assert!(cli.no_clone && cli.skip_existing && cli.buffer && cli.quiet);
        assert_eq!(cli.max_attempts, Some(5));
        assert_eq!(cli.delay_ms, Some(250));
        assert_eq!(cli.headers.len(), 1);
        assert_eq!(cli.proxy.as_deref(), Some("http://proxy:8080"));
    }

    #[test]
    fn parse_headers_accepts_name_value_pairs() {
        let headers =
            parse_headers(&["Authorization: Bearer x".to_string(), "X-Custom: 1".to_string()])
                .unwrap();
        assert_eq!(headers.get("authorization").unwrap(), "Bearer x");
        assert_eq!(headers.get("x-custom").unwrap(), "1");
    }

    #[test]
    fn parse_headers_rejects_missing_colon() {
        assert!(parse_headers(&["not-a-header".to_string()]).is_err());
    }
}
