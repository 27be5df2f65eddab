//! Local file storage for task submissions and library templates.
//!
//! Files are written under the configured root with server-generated names
//! (`<area>/<uuid>.<ext>`); the client's file name is kept only in the
//! database. Stored paths are always relative to the root.

use std::io;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use becs_core::upload::file_extension;
use tokio_util::io::ReaderStream;
use uuid::Uuid;

use crate::error::AppError;

/// Storage area for task deliverables.
pub const TASK_FILES: &str = "tasks";
/// Storage area for the template library.
pub const TEMPLATE_FILES: &str = "templates";

#[derive(Debug, Clone)]
pub struct FileStore {
    root: Arc<PathBuf>,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root: Arc::new(root),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `data` to a fresh file in `area`, returning its relative path.
    pub async fn save(&self, area: &str, original_name: &str, data: &[u8]) -> io::Result<String> {
        let dir = self.root.join(area);
        tokio::fs::create_dir_all(&dir).await?;

        let stored_name = match file_extension(original_name) {
            Some(ext) => format!("{}.{ext}", Uuid::new_v4()),
            None => Uuid::new_v4().to_string(),
        };
        tokio::fs::write(dir.join(&stored_name), data).await?;
        Ok(format!("{area}/{stored_name}"))
    }

    /// Map a stored relative path back to a location under the root.
    ///
    /// Absolute paths and `..` components are refused.
    pub fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let rel = Path::new(relative);
        let safe = rel
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        (safe && !relative.is_empty()).then(|| self.root.join(rel))
    }

    /// Delete a stored file. A file that is already gone is not an error.
    pub async fn remove(&self, relative: &str) -> io::Result<()> {
        let Some(path) = self.resolve(relative) else {
            return Ok(());
        };
        match tokio::fs::remove_file(path).await {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    /// Stream a stored file back as an attachment named `download_name`.
    ///
    /// A missing file on disk is reported as `None` so the caller can answer
    /// with its own 404.
    pub async fn download(
        &self,
        relative: &str,
        download_name: &str,
    ) -> Result<Option<Response>, AppError> {
        let Some(path) = self.resolve(relative) else {
            return Ok(None);
        };
        let file = match tokio::fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(AppError::InternalError(format!("Failed to open file: {e}"))),
        };
        let size = file
            .metadata()
            .await
            .map_err(|e| AppError::InternalError(format!("Failed to stat file: {e}")))?
            .len();

        let disposition = format!(
            "attachment; filename=\"{}\"",
            download_name.replace(['"', '\\'], "_")
        );
        let response = (
            [
                (header::CONTENT_TYPE, "application/octet-stream".to_string()),
                (header::CONTENT_LENGTH, size.to_string()),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            Body::from_stream(ReaderStream::new(file)),
        )
            .into_response();
        Ok(Some(response))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_uses_generated_name_and_keeps_extension() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());

        let rel = store.save(TASK_FILES, "Draft Report.PDF", b"%PDF").await.unwrap();
        assert!(rel.starts_with("tasks/"));
        assert!(rel.ends_with(".pdf"));
        assert!(!rel.contains("Draft"));

        let on_disk = tokio::fs::read(store.resolve(&rel).unwrap()).await.unwrap();
        assert_eq!(on_disk, b"%PDF");
    }

    #[test]
    fn resolve_rejects_escapes() {
        let store = FileStore::new(PathBuf::from("/srv/becs"));
        assert!(store.resolve("tasks/a.pdf").is_some());
        assert!(store.resolve("../etc/passwd").is_none());
        assert!(store.resolve("/etc/passwd").is_none());
        assert!(store.resolve("").is_none());
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        let rel = store.save(TEMPLATE_FILES, "nda.docx", b"x").await.unwrap();

        store.remove(&rel).await.unwrap();
        store.remove(&rel).await.unwrap();
        assert!(!store.resolve(&rel).unwrap().exists());
    }

    #[tokio::test]
    async fn download_of_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        let response = store.download("tasks/missing.pdf", "missing.pdf").await.unwrap();
        assert!(response.is_none());
    }

    #[tokio::test]
    async fn download_sets_attachment_headers() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().to_path_buf());
        let rel = store.save(TASK_FILES, "report.pdf", b"12345").await.unwrap();

        let response = store.download(&rel, "report.pdf").await.unwrap().unwrap();
        let headers = response.headers();
        assert_eq!(headers[header::CONTENT_LENGTH], "5");
        assert_eq!(
            headers[header::CONTENT_DISPOSITION],
            "attachment; filename=\"report.pdf\""
        );
    }
}
