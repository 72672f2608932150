//! Filesystem-safe file name sanitization.

/// Linux NAME_MAX.
const MAX_LEN: usize = 255;

/// Sanitizes a candidate file name for safe use as a single path component.
///
/// Path separators, NUL, and control characters become `_`; leading and
/// trailing dots and spaces are trimmed; the result is capped at 255 bytes
/// on a character boundary.
pub fn sanitize_file_name(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c == '\0' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    let trimmed = replaced.trim_matches(|c| c == ' ' || c == '.');

    if trimmed.len() <= MAX_LEN {
        return trimmed.to_string();
    }
    let mut end = MAX_LEN;
    while end > 0 && !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    trimmed[..end].to_string()
}
