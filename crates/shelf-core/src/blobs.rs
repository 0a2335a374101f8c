//! Blob storage
//!
//! Accepts uploads keyed by a slash-delimited name (for example
//! `profile_pictures/{uid}.jpg`) and hands back a durable URL. The shipped
//! implementation writes to a local blob directory using atomic writes
//! (write to temp file, then rename) and returns `file://` URLs.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

/// Upload target for binary payloads
pub trait BlobStore {
    /// Store `bytes` under `name`, replacing any previous blob, and return
    /// a durable URL for it.
    fn put(&self, name: &str, bytes: &[u8]) -> Result<String>;
}

/// Blob store over a local directory
pub struct FileBlobStore {
    root: PathBuf,
}

impl FileBlobStore {
    /// Create a store rooted at the given directory
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }
}

impl BlobStore for FileBlobStore {
    fn put(&self, name: &str, bytes: &[u8]) -> Result<String> {
        let path = self.root.join(name);
        atomic_write(&path, bytes)
            .with_context(|| format!("Failed to store blob {:?}", name))?;

        debug!("stored blob {} ({} bytes)", name, bytes.len());
        Ok(format!("file://{}", path.display()))
    }
}

/// Write data to a file atomically
///
/// 1. Write to a temporary file in the same directory
/// 2. Sync the file to disk
/// 3. Rename the temp file to the target path
///
/// This ensures the target file is never left in a partially-written state.
fn atomic_write(path: &Path, data: &[u8]) -> Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }

    let temp_path = path.with_extension("tmp");

    let mut file = File::create(&temp_path)
        .with_context(|| format!("Failed to create temp file {:?}", temp_path))?;

    file.write_all(data)
        .with_context(|| format!("Failed to write to temp file {:?}", temp_path))?;

    // Sync to disk before rename
    file.sync_all()
        .with_context(|| format!("Failed to sync temp file {:?}", temp_path))?;

    // Atomic rename
    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename {:?} to {:?}", temp_path, path))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_put_creates_nested_directories() {
        let dir = TempDir::new().unwrap();
        let store = FileBlobStore::new(dir.path().to_path_buf());

        let url = store.put("profile_pictures/u1.jpg", b"image-bytes").unwrap();

        let expected = dir.path().join("profile_pictures/u1.jpg");
        assert!(expected.exists());
        assert_eq!(fs::read(&expected).unwrap(), b"image-bytes");
        assert_eq!(url, format!("file://{}", expected.display()));
    }

    #[test]
    fn test_put_overwrites_previous_blob() {
        let dir = TempDir::new().unwrap();
        let store = FileBlobStore::new(dir.path().to_path_buf());

        store.put("profile_pictures/u1.jpg", b"old").unwrap();
        let url = store.put("profile_pictures/u1.jpg", b"new").unwrap();

        let path = dir.path().join("profile_pictures/u1.jpg");
        assert_eq!(fs::read(&path).unwrap(), b"new");
        assert!(url.starts_with("file://"));
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let dir = TempDir::new().unwrap();
        let store = FileBlobStore::new(dir.path().to_path_buf());

        store.put("profile_pictures/u1.jpg", b"bytes").unwrap();

        assert!(!dir.path().join("profile_pictures/u1.tmp").exists());
    }
}
