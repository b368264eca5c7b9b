use serde::{de::DeserializeOwned, Serialize};
use std::path::{Path, PathBuf};

/// XDG-compatible cache directory: ~/.cache/topiclist/ (Linux) or ~/Library/Caches/topiclist/ (macOS)
fn cache_dir() -> Option<PathBuf> {
    let dir = dirs::cache_dir()?.join("topiclist");
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir)
}

pub fn cache_path(key: &str) -> Option<PathBuf> {
    Some(cache_dir()?.join(format!("{}.json", sanitize_key(key))))
}

/// Read a cached value. Returns None if missing or corrupt.
pub fn read_from<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let data = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&data).ok()
}

/// Write a value to cache. Silently ignores errors.
pub fn write_to<T: Serialize>(path: &Path, value: &T) {
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Ok(data) = serde_json::to_string(value) {
        if let Err(e) = std::fs::write(path, data) {
            tracing::debug!(path = %path.display(), error = %e, "cache write failed");
        }
    }
}

/// Make a page key or other identifier safe to use as a file name
pub fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c => c,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn sanitize_key_replaces_separators() {
        assert_eq!(sanitize_key("node:python"), "node_python");
        assert_eq!(sanitize_key("a/b\\c"), "a_b_c");
    }

    #[test]
    fn sanitize_key_normal_input() {
        assert_eq!(sanitize_key("read_state"), "read_state");
    }

    #[test]
    fn write_then_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("value.json");
        let mut value = HashMap::new();
        value.insert("a".to_string(), 1u32);

        write_to(&path, &value);
        let back: Option<HashMap<String, u32>> = read_from(&path);
        assert_eq!(back, Some(value));
    }

    #[test]
    fn corrupt_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        let back: Option<HashMap<String, u32>> = read_from(&path);
        assert!(back.is_none());
    }
}
