//! Single-attempt transfer state machine.
//!
//! One `Transfer` owns one attempt end-to-end: issue the request, validate
//! the response, resolve the target name, persist the body to a `.download`
//! temp file, and promote it with an atomic rename. Any fault aborts the
//! attempt and bubbles to the retry layer. A set cancellation flag masks the
//! underlying fault with [`DownloadError::Cancelled`], and the temp file is
//! removed whenever the attempt ends without the rename having happened.

use crate::config::DownloadConfig;
use crate::control::CancelToken;
use crate::downloader::DownloadReport;
use crate::error::{DownloadError, ResponseBody};
use crate::file_name;
use crate::progress::ProgressStage;
use crate::request::{self, BodyStream, HttpResponse, ResponseMetadata};
use futures_util::StreamExt;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Suffix of the in-flight temp file next to the final name.
pub const TEMP_SUFFIX: &str = ".download";

/// Path of the temp file: appends `.download` to the final path.
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut os = final_path.as_os_str().to_owned();
    os.push(TEMP_SUFFIX);
    PathBuf::from(os)
}

/// Removes the temp file on drop unless the rename succeeded. Dropping also
/// happens when the retry deadline cuts the attempt off mid-write, so no
/// path leaks a partial file.
struct TempFileGuard {
    path: PathBuf,
    armed: bool,
}

impl TempFileGuard {
    fn new(path: PathBuf) -> Self {
        Self { path, armed: true }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if self.armed {
            let _ = std::fs::remove_file(&self.path);
        }
    }
}

/// One download attempt. Created fresh per attempt; never reused.
pub(crate) struct Transfer<'a> {
    config: &'a DownloadConfig,
    cancel: CancelToken,
    total_size: Option<u64>,
}

impl<'a> Transfer<'a> {
    pub(crate) fn new(config: &'a DownloadConfig, cancel: CancelToken) -> Self {
        Self {
            config,
            cancel,
            total_size: None,
        }
    }

    /// Runs the whole attempt. Whenever the cancellation flag was set, the
    /// surfaced failure is `Cancelled` regardless of the underlying cause.
    pub(crate) async fn run(mut self) -> Result<DownloadReport, DownloadError> {
        match self.attempt().await {
            Err(_) if self.cancel.is_cancelled() => Err(DownloadError::Cancelled),
            other => other,
        }
    }

    async fn attempt(&mut self) -> Result<DownloadReport, DownloadError> {
        fs::create_dir_all(&self.config.directory).await?;

        // Pre-request skip: only possible when the name is known up front.
        if self.config.skip_existing_file_name {
            if let Some(name) = &self.config.file_name {
                if self.exists(&self.config.directory.join(name)).await? {
                    tracing::debug!(name, "target already present, skipping request");
                    return Ok(DownloadReport::aborted());
                }
            }
        }

        let response = request::send(self.config, &self.cancel).await?;
        self.total_size = response.meta.content_length();

        if response.meta.status.as_u16() > 226 {
            return Err(self.http_failure(response).await);
        }

        if let Some(hook) = &self.config.hooks.on_response {
            if !hook(&response.meta) {
                tracing::debug!("on_response vetoed the download");
                return Ok(DownloadReport::aborted());
            }
        }

        match self.save(response).await? {
            Some(path) => Ok(DownloadReport::complete(path)),
            None => Ok(DownloadReport::aborted()),
        }
    }

    /// Drains the failed response's body and wraps it into an error carrying
    /// the status, the response headers, and the JSON-or-text body.
    async fn http_failure(&self, response: HttpResponse) -> DownloadError {
        let HttpResponse { meta, mut body } = response;
        let status = meta.status.as_u16();
        let payload = match self.collect(&mut body).await {
            Ok(bytes) => ResponseBody::from_bytes(&bytes),
            Err(DownloadError::Cancelled) => return DownloadError::Cancelled,
            Err(_) => ResponseBody::Text(String::new()),
        };
        DownloadError::HttpFailure {
            status,
            headers: meta.headers,
            body: payload,
        }
    }

    /// Name resolution, persistence, and rename. Returns None when the
    /// post-response skip check fires.
    async fn save(&mut self, response: HttpResponse) -> Result<Option<PathBuf>, DownloadError> {
        let HttpResponse { meta, mut body } = response;
        let (mut final_name, original_name) = self.resolve_names(&meta).await?;

        // Post-response skip: catches names only knowable after the
        // response. Deliberately checks the pre-clone name; the pre-request
        // check above covers the explicitly configured one.
        if self.config.skip_existing_file_name
            && self
                .exists(&self.config.directory.join(&original_name))
                .await?
        {
            tracing::debug!(name = %original_name, "deduced name already present, skipping");
            return Ok(None);
        }

        if let Some(hook) = &self.config.hooks.on_before_save {
            if let Some(replacement) = hook(&final_name) {
                if !replacement.is_empty() {
                    final_name = replacement;
                }
            }
        }

        let final_path = self.config.directory.join(&final_name);
        let tmp = temp_path(&final_path);
        let mut guard = TempFileGuard::new(tmp.clone());

        if self.config.should_buffer_response {
            let buffer = self.collect(&mut body).await?;
            fs::write(&tmp, &buffer).await?;
        } else {
            self.stream_to_file(&mut body, &tmp).await?;
        }

        // Promote only after the sink is fully flushed and closed; readers
        // never observe partial content at the final path.
        fs::rename(&tmp, &final_path).await?;
        guard.disarm();
        tracing::info!(path = %final_path.display(), "download complete");
        Ok(Some(final_path))
    }

    /// Explicit config name or one deduced from the URL and response
    /// headers; the final name additionally goes through collision
    /// resolution when `clone_files` is on.
    async fn resolve_names(
        &self,
        meta: &ResponseMetadata,
    ) -> Result<(String, String), DownloadError> {
        let original = match &self.config.file_name {
            Some(name) => name.clone(),
            None => file_name::deduce_file_name(&self.config.url, &meta.headers),
        };
        let final_name = if self.config.clone_files {
            if self.config.use_synchronous_mode {
                file_name::available_file_name(&self.config.directory, &original)?
            } else {
                file_name::available_file_name_async(&self.config.directory, &original).await?
            }
        } else {
            original.clone()
        };
        Ok((final_name, original))
    }

    async fn exists(&self, path: &Path) -> Result<bool, DownloadError> {
        if self.config.use_synchronous_mode {
            Ok(path.try_exists()?)
        } else {
            Ok(fs::try_exists(path).await?)
        }
    }

    /// Accumulates the remaining body in memory, checking for cancellation
    /// between chunks.
    async fn collect(&self, body: &mut BodyStream) -> Result<Vec<u8>, DownloadError> {
        let mut data = Vec::new();
        loop {
            let chunk = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(DownloadError::Cancelled),
                chunk = body.next() => chunk,
            };
            match chunk {
                Some(Ok(bytes)) => data.extend_from_slice(&bytes),
                Some(Err(error)) => return Err(error.into()),
                None => return Ok(data),
            }
        }
    }

    /// Streams the body to `path`, threading each chunk through the progress
    /// stage when a hook is configured. The chunk loop is the backpressure
    /// point: nothing is read ahead of the sink.
    async fn stream_to_file(
        &self,
        body: &mut BodyStream,
        path: &Path,
    ) -> Result<(), DownloadError> {
        let file = fs::File::create(path).await?;
        let mut writer = tokio::io::BufWriter::new(file);
        let mut progress = self
            .config
            .hooks
            .on_progress
            .as_deref()
            .map(|hook| ProgressStage::new(self.total_size, hook));

        loop {
            let chunk = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(DownloadError::Cancelled),
                chunk = body.next() => chunk,
            };
            match chunk {
                Some(Ok(bytes)) => {
                    if let Some(stage) = &mut progress {
                        stage.observe(&bytes);
                    }
                    writer.write_all(&bytes).await?;
                }
                Some(Err(error)) => return Err(error.into()),
                None => break,
            }
        }

        writer.flush().await?;
        writer.into_inner().sync_all().await?;
        Ok(())
    }
}
