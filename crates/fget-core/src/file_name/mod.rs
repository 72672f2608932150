//! Filename deduction and collision resolution.
//!
//! Derives a local file name from the Content-Disposition response header or
//! the URL path, sanitized for the local filesystem, and resolves collisions
//! by numbering the name until it is free.

mod content_disposition;
mod resolve;
mod sanitize;

pub use content_disposition::content_disposition_file_name;
pub use resolve::{available_file_name, available_file_name_async};
pub use sanitize::sanitize_file_name;

use reqwest::header::{HeaderMap, CONTENT_DISPOSITION};

/// Fallback when neither the header nor the URL path yields a usable name.
const DEFAULT_FILE_NAME: &str = "download.bin";

/// Derives a safe file name for a download.
///
/// Prefers the Content-Disposition header (when present and parseable),
/// otherwise the last path segment of `url`, and sanitizes the result.
pub fn deduce_file_name(url: &str, headers: &HeaderMap) -> String {
    let candidate = headers
        .get(CONTENT_DISPOSITION)
        .and_then(|value| value.to_str().ok())
        .and_then(content_disposition_file_name)
        .filter(|name| !name.is_empty())
        .or_else(|| last_url_segment(url));

    let raw = match candidate {
        Some(raw) => raw,
        None => return DEFAULT_FILE_NAME.to_string(),
    };

    let sanitized = sanitize_file_name(&raw);
    if sanitized.is_empty() || sanitized == "." || sanitized == ".." {
        DEFAULT_FILE_NAME.to_string()
    } else {
        sanitized
    }
}

/// Last non-empty path segment of the URL, ignoring query and fragment.
fn last_url_segment(url: &str) -> Option<String> {
    let parsed = url::Url::parse(url).ok()?;
    let segment = parsed.path().split('/').filter(|s| !s.is_empty()).last()?;
    if segment == "." || segment == ".." {
        return None;
    }
    Some(segment.to_string())
}
