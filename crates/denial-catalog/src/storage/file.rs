//! Local JSON file backend.
//!
//! The catalog is stored as one pretty-printed JSON document. Writes go to a
//! sibling temporary file first and are renamed into place, so a failed write
//! never truncates the existing document. Each write gets its own temporary
//! file; concurrent writers race only on the final rename.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use denial_core::{Catalog, Error, Result};

use super::{BackendKind, CatalogBackend};
use crate::schema;

/// Default location of the catalog document, relative to the working directory.
pub const DEFAULT_DATA_PATH: &str = "data/denial-prompts.json";

const MAX_TEMP_ATTEMPTS: usize = 16;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Message returned when the filesystem refuses writes.
pub const READ_ONLY_MESSAGE: &str = "Cannot write to filesystem. Configure FIREBASE_PROJECT_ID, \
     FIREBASE_CLIENT_EMAIL, and FIREBASE_PRIVATE_KEY to enable saves to the remote document store.";

/// Stores the catalog in a local JSON file.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl Default for FileBackend {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_PATH)
    }
}

impl FileBackend {
    /// Creates a backend for the document at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the catalog document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let seq = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        self.path
            .with_file_name(format!(".{name}.tmp.{}.{seq}", std::process::id()))
    }

    /// Creates a fresh temporary file next to the document.
    async fn create_temp(&self) -> Result<(tokio::fs::File, PathBuf)> {
        for _ in 0..MAX_TEMP_ATTEMPTS {
            let temp = self.temp_path();
            let opened = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&temp)
                .await;
            match opened {
                Ok(file) => return Ok((file, temp)),
                Err(err) if err.kind() == ErrorKind::AlreadyExists => {}
                Err(err) => return Err(map_write_error(&temp, err)),
            }
        }
        Err(Error::io(
            format!("failed to create a temporary file for {}", self.path.display()),
            std::io::Error::from(ErrorKind::AlreadyExists),
        ))
    }

    async fn write_temp(file: &mut tokio::fs::File, json: &[u8]) -> std::io::Result<()> {
        file.write_all(json).await?;
        file.sync_all().await
    }

    async fn ensure_parent(&self) {
        let Some(parent) = self.path.parent() else {
            return;
        };
        if parent.as_os_str().is_empty() {
            return;
        }
        // Best effort; a real failure surfaces from the write itself.
        if let Err(err) = tokio::fs::create_dir_all(parent).await {
            tracing::debug!(path = %parent.display(), error = %err, "create_dir_all failed");
        }
    }
}

#[async_trait]
impl CatalogBackend for FileBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::File
    }

    async fn read(&self) -> Result<Catalog> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(Error::NotFound(format!(
                    "catalog file {}",
                    self.path.display()
                )));
            }
            Err(err) => {
                return Err(Error::io(
                    format!("failed to read {}", self.path.display()),
                    err,
                ));
            }
        };

        let value: serde_json::Value = serde_json::from_slice(&bytes)?;
        schema::validate(&value)
    }

    async fn write(&self, catalog: &Catalog) -> Result<()> {
        let json = serde_json::to_vec_pretty(catalog)?;
        self.ensure_parent().await;

        let (mut file, temp) = self.create_temp().await?;
        let written = Self::write_temp(&mut file, &json).await;
        drop(file);
        if let Err(err) = written {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(map_write_error(&temp, err));
        }
        if let Err(err) = tokio::fs::rename(&temp, &self.path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(map_write_error(&self.path, err));
        }

        tracing::debug!(path = %self.path.display(), bytes = json.len(), "catalog file written");
        Ok(())
    }
}

/// Maps a write failure, separating "this medium refuses writes" from other I/O errors.
pub(crate) fn map_write_error(path: &Path, err: std::io::Error) -> Error {
    match err.kind() {
        ErrorKind::PermissionDenied | ErrorKind::ReadOnlyFilesystem => {
            tracing::warn!(path = %path.display(), error = %err, "catalog file is not writable");
            Error::PermissionDenied {
                message: READ_ONLY_MESSAGE.to_string(),
            }
        }
        _ => Error::io(format!("failed to write {}", path.display()), err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use denial_core::{Category, Keyword};

    fn catalog() -> Catalog {
        let mut category = Category::new("image-quality", "Image Quality");
        category
            .keywords
            .push(Keyword::new("blurry", "Blurry", "Photo is blurry."));
        Catalog {
            categories: vec![category],
        }
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = FileBackend::new(dir.path().join("absent.json"));
        assert!(backend.read().await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn write_creates_parent_and_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = FileBackend::new(dir.path().join("nested/data/denial-prompts.json"));

        backend.write(&catalog()).await.expect("write");
        assert_eq!(backend.read().await.expect("read"), catalog());

        let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("nested/data"))
            .expect("read dir")
            .map(|entry| entry.expect("entry").file_name())
            .collect();
        assert_eq!(leftovers, vec![std::ffi::OsString::from("denial-prompts.json")]);
    }

    #[test]
    fn temp_paths_are_unique_siblings() {
        let backend = FileBackend::new("data/denial-prompts.json");
        let first = backend.temp_path();
        let second = backend.temp_path();

        assert_ne!(first, second);
        assert_eq!(first.parent(), Some(Path::new("data")));
        let name = first.file_name().and_then(|n| n.to_str()).expect("utf-8 name");
        assert!(name.starts_with(".denial-prompts.json.tmp."));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_writes_all_succeed_and_last_one_wins() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = std::sync::Arc::new(FileBackend::new(dir.path().join("catalog.json")));

        let written: Vec<Catalog> = (0..64)
            .map(|n| {
                let mut catalog = catalog();
                catalog.categories[0].label = format!("Image Quality {n}");
                catalog
            })
            .collect();

        let handles: Vec<_> = written
            .iter()
            .cloned()
            .map(|catalog| {
                let backend = std::sync::Arc::clone(&backend);
                tokio::spawn(async move { backend.write(&catalog).await })
            })
            .collect();
        for handle in handles {
            handle.await.expect("join").expect("write");
        }

        let stored = backend.read().await.expect("read");
        assert!(written.contains(&stored));

        let entries = std::fs::read_dir(dir.path()).expect("read dir").count();
        assert_eq!(entries, 1, "temporary files left behind");
    }

    #[tokio::test]
    async fn writes_two_space_pretty_json() {
        let dir = tempfile::tempdir().expect("tempdir");
        let backend = FileBackend::new(dir.path().join("catalog.json"));
        backend.write(&catalog()).await.expect("write");

        let text = std::fs::read_to_string(backend.path()).expect("read file");
        assert!(text.starts_with("{\n  \"categories\": [\n    {"));
    }

    #[tokio::test]
    async fn malformed_document_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, r#"{"categories":[{"id":"x"}]}"#).expect("seed");

        let err = FileBackend::new(&path).read().await.unwrap_err();
        assert!(matches!(err, Error::InvalidSchema { .. }));
    }

    #[tokio::test]
    async fn write_into_a_file_path_parent_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, b"x").expect("seed");

        let err = FileBackend::new(blocker.join("catalog.json"))
            .write(&catalog())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }

    #[test]
    fn permission_errors_map_to_actionable_message() {
        for kind in [ErrorKind::PermissionDenied, ErrorKind::ReadOnlyFilesystem] {
            let err = map_write_error(Path::new("x.json"), std::io::Error::from(kind));
            match err {
                Error::PermissionDenied { message } => {
                    assert!(message.starts_with("Cannot write to filesystem"));
                    assert!(message.contains("FIREBASE_PROJECT_ID"));
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn other_errors_stay_io() {
        let err = map_write_error(Path::new("x.json"), std::io::Error::other("disk"));
        assert!(matches!(err, Error::Io { .. }));
    }
}
