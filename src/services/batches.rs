//! Image batch workflows.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::backend::BatchRepository;
use crate::codec::duplicate_ids;
use crate::error::{AppError, Result};
use crate::models::{DownloadRequest, ImageBatch};

/// Outcome of a batch download.
#[derive(Debug, Clone)]
pub struct DownloadedArchive {
    pub batch_id: String,
    pub path: PathBuf,
    pub bytes: usize,
}

/// Operator actions on image batches.
pub struct BatchService<'a, R: BatchRepository + ?Sized> {
    repo: &'a R,
    bucket: String,
    previews: Mutex<HashMap<String, Vec<String>>>,
}

impl<'a, R: BatchRepository + ?Sized> BatchService<'a, R> {
    pub fn new(repo: &'a R, bucket: impl Into<String>) -> Self {
        Self {
            repo,
            bucket: bucket.into(),
            previews: Mutex::new(HashMap::new()),
        }
    }

    /// List batches, warning about ids that are not unique.
    pub async fn list(&self) -> Result<Vec<ImageBatch>> {
        let batches = self.repo.list_batches().await?;
        let duplicates = duplicate_ids(&batches);
        if !duplicates.is_empty() {
            log::warn!(
                "Batch ids shared by several prefixes: {}. Set storage.batch_id_strategy = \"prefix_hash\" to tell them apart.",
                duplicates.join(", ")
            );
        }
        Ok(batches)
    }

    /// Find a batch by id in the current listing.
    pub async fn find(&self, batch_id: &str) -> Result<ImageBatch> {
        self.list()
            .await?
            .into_iter()
            .find(|b| b.batch_id == batch_id)
            .ok_or_else(|| AppError::not_found("batch", batch_id))
    }

    /// Preview URLs of a batch; fetched once per service.
    pub async fn preview(&self, batch_id: &str) -> Result<Vec<String>> {
        if let Some(urls) = self.previews.lock().await.get(batch_id) {
            return Ok(urls.clone());
        }

        let urls = self.repo.preview_batch(batch_id).await?;
        log::debug!("Fetched {} preview URLs for {}", urls.len(), batch_id);
        self.previews
            .lock()
            .await
            .insert(batch_id.to_string(), urls.clone());
        Ok(urls)
    }

    /// Download a batch archive into `dest_dir` as `<batchId>.zip`.
    pub async fn download(&self, batch_id: &str, dest_dir: &Path) -> Result<DownloadedArchive> {
        let batch = self.find(batch_id).await?;
        check_file_stem(&batch.batch_id)?;
        let request = DownloadRequest::for_batch(&self.bucket, &batch);

        let ticket = self.repo.request_download(&batch.batch_id, &request).await?;
        log::info!("Archive for {} ready, fetching", batch.batch_id);
        let bytes = self.repo.fetch_archive(&ticket).await?;

        let path = dest_dir.join(&request.zip_name);
        write_atomic(&path, &bytes).await?;
        log::info!("Wrote {} bytes to {}", bytes.len(), path.display());

        Ok(DownloadedArchive {
            batch_id: batch.batch_id,
            path,
            bytes: bytes.len(),
        })
    }
}

/// Batch ids come from the backend and name the archive file, so they must
/// stay a single path component.
fn check_file_stem(batch_id: &str) -> Result<()> {
    let unsafe_id = batch_id.trim().is_empty()
        || batch_id.contains(['/', '\\'])
        || batch_id == "."
        || batch_id == ".."
        || Path::new(batch_id).is_absolute();
    if unsafe_id {
        return Err(AppError::validation(format!(
            "batch id '{batch_id}' cannot be used as a file name"
        )));
    }
    Ok(())
}

/// Write bytes atomically (write to temp, then rename).
///
/// The temp file is removed when any step fails.
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let tmp = path.with_extension("tmp");
    let result = write_then_rename(&tmp, path, bytes).await;
    if result.is_err() {
        if let Err(e) = tokio::fs::remove_file(&tmp).await {
            log::debug!("Could not remove {}: {}", tmp.display(), e);
        }
    }
    result
}

async fn write_then_rename(tmp: &Path, path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = tokio::fs::File::create(tmp).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    drop(file);

    tokio::fs::rename(tmp, path).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tempfile::TempDir;

    use crate::backend::MemoryBackend;
    use crate::models::DownloadTicket;

    /// Counts preview calls on top of the memory backend.
    struct CountingPreviews {
        inner: MemoryBackend,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl BatchRepository for CountingPreviews {
        async fn list_batches(&self) -> Result<Vec<ImageBatch>> {
            self.inner.list_batches().await
        }

        async fn request_download(
            &self,
            batch_id: &str,
            request: &DownloadRequest,
        ) -> Result<DownloadTicket> {
            self.inner.request_download(batch_id, request).await
        }

        async fn fetch_archive(&self, ticket: &DownloadTicket) -> Result<Vec<u8>> {
            self.inner.fetch_archive(ticket).await
        }

        async fn preview_batch(&self, batch_id: &str) -> Result<Vec<String>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.preview_batch(batch_id).await
        }
    }

    #[tokio::test]
    async fn download_writes_zip_file() {
        let tmp = TempDir::new().unwrap();
        let backend = MemoryBackend::seeded();
        let service = BatchService::new(&backend, "annonces-images");

        let archive = service
            .download("batch-003", &tmp.path().join("out"))
            .await
            .unwrap();

        assert_eq!(archive.path, tmp.path().join("out/batch-003.zip"));
        let written = std::fs::read(&archive.path).unwrap();
        assert_eq!(written.len(), archive.bytes);
        assert!(!tmp.path().join("out/batch-003.tmp").exists());
    }

    #[tokio::test]
    async fn download_rejects_ids_that_leave_dest_dir() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("out");
        let batch = |id: &str| ImageBatch {
            batch_id: id.to_string(),
            prefix: format!("annonces/{id}/"),
            count: 1,
            last_modified: None,
        };
        let backend = MemoryBackend::new().with_batches(vec![
            batch("../escaped"),
            batch("/abs"),
            batch(".."),
            batch("a\\b"),
        ]);
        let service = BatchService::new(&backend, "annonces-images");

        for id in ["../escaped", "/abs", "..", "a\\b"] {
            let result = service.download(id, &dest).await;
            assert!(matches!(result, Err(AppError::Validation(_))), "{id}");
        }
        assert!(!tmp.path().join("escaped.zip").exists());
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn failed_write_removes_temp_file() {
        let tmp = TempDir::new().unwrap();
        let dest = tmp.path().join("out");
        // A non-empty directory in place of the archive makes the rename fail.
        std::fs::create_dir_all(dest.join("batch-003.zip/keep")).unwrap();

        let backend = MemoryBackend::seeded();
        let service = BatchService::new(&backend, "annonces-images");
        let result = service.download("batch-003", &dest).await;

        assert!(matches!(result, Err(AppError::Io(_))));
        assert!(!dest.join("batch-003.tmp").exists());
    }

    #[tokio::test]
    async fn download_unknown_batch_is_not_found() {
        let tmp = TempDir::new().unwrap();
        let backend = MemoryBackend::seeded();
        let service = BatchService::new(&backend, "annonces-images");
        let result = service.download("batch-404", tmp.path()).await;
        assert!(matches!(result, Err(AppError::NotFound { kind: "batch", .. })));
    }

    #[tokio::test]
    async fn preview_is_fetched_once() {
        let backend = CountingPreviews {
            inner: MemoryBackend::seeded(),
            calls: AtomicUsize::new(0),
        };
        let service = BatchService::new(&backend, "annonces-images");

        let first = service.preview("batch-001").await.unwrap();
        let second = service.preview("batch-001").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_preview_is_not_cached() {
        let backend = CountingPreviews {
            inner: MemoryBackend::seeded(),
            calls: AtomicUsize::new(0),
        };
        let service = BatchService::new(&backend, "annonces-images");
        assert!(service.preview("missing").await.is_err());
        assert!(service.preview("missing").await.is_err());
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn list_tolerates_duplicate_ids() {
        let batch = |prefix: &str| ImageBatch {
            batch_id: "x".to_string(),
            prefix: prefix.to_string(),
            count: 0,
            last_modified: None,
        };
        let backend = MemoryBackend::new().with_batches(vec![batch("a/x"), batch("b/x")]);
        let service = BatchService::new(&backend, "annonces-images");
        assert_eq!(service.list().await.unwrap().len(), 2);
    }
}
