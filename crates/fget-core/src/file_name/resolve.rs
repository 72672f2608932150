//! Collision-free target names: number the name until it is unused.

use std::io;
use std::path::Path;

/// `report.pdf` + 2 -> `report2.pdf`; extension-less names get the counter
/// appended directly.
fn numbered(file_name: &str, counter: u32) -> String {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}{counter}.{ext}"),
        _ => format!("{file_name}{counter}"),
    }
}

/// Returns `file_name` unchanged when no file of that name exists in
/// `directory`, otherwise the first numbered variant that is free.
pub fn available_file_name(directory: &Path, file_name: &str) -> io::Result<String> {
    if !directory.join(file_name).try_exists()? {
        return Ok(file_name.to_string());
    }
    let mut counter = 1u32;
    loop {
        let candidate = numbered(file_name, counter);
        if !directory.join(&candidate).try_exists()? {
            return Ok(candidate);
        }
        counter += 1;
    }
}

/// `tokio::fs` flavor of [`available_file_name`].
pub async fn available_file_name_async(directory: &Path, file_name: &str) -> io::Result<String> {
    if !tokio::fs::try_exists(directory.join(file_name)).await? {
        return Ok(file_name.to_string());
    }
    let mut counter = 1u32;
    loop {
        let candidate = numbered(file_name, counter);
        if !tokio::fs::try_exists(directory.join(&candidate)).await? {
            return Ok(candidate);
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn free_name_is_returned_unchanged() {
        let dir = tempdir().unwrap();
        let name = available_file_name(dir.path(), "report.pdf").unwrap();
        assert_eq!(name, "report.pdf");
    }

    #[test]
    fn collisions_are_numbered() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("report.pdf"), b"x").unwrap();
        std::fs::write(dir.path().join("report1.pdf"), b"x").unwrap();
        let name = available_file_name(dir.path(), "report.pdf").unwrap();
        assert_eq!(name, "report2.pdf");
    }

    #[test]
    fn extension_less_names() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("LICENSE"), b"x").unwrap();
        let name = available_file_name(dir.path(), "LICENSE").unwrap();
        assert_eq!(name, "LICENSE1");
    }

    #[test]
    fn resolved_name_is_always_free() {
        // Round-trip: whatever comes back must not exist yet, even after
        // materializing each previous answer.
        let dir = tempdir().unwrap();
        for _ in 0..5 {
            let name = available_file_name(dir.path(), "data.bin").unwrap();
            assert!(!dir.path().join(&name).try_exists().unwrap());
            std::fs::write(dir.path().join(&name), b"x").unwrap();
        }
    }

    #[tokio::test]
    async fn async_flavor_matches_sync() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("data.bin"), b"x").unwrap();
        let sync_name = available_file_name(dir.path(), "data.bin").unwrap();
        let async_name = available_file_name_async(dir.path(), "data.bin")
            .await
            .unwrap();
        assert_eq!(sync_name, async_name);
        assert_eq!(async_name, "data1.bin");
    }
}
