//! Disk copy of a response as it streams through the proxy.

use std::path::{Path, PathBuf};

use tokio::{fs::File, io::AsyncWriteExt};
use tracing::warn;

use crate::ProxyError;

/// Writes the raw origin bytes to a `<N>.cache` file. Disk failures are logged
/// and switch the capture off; they never interrupt client delivery.
pub(crate) struct CacheCapture {
    path: Option<PathBuf>,
    file: Option<File>,
    failed: bool,
}

impl CacheCapture {
    /// Capture that writes nothing (uncacheable request).
    pub(crate) fn disabled() -> Self {
        Self {
            path: None,
            file: None,
            failed: false,
        }
    }

    pub(crate) async fn create(path: PathBuf) -> Self {
        match open(&path).await {
            Ok(file) => Self {
                path: Some(path),
                file: Some(file),
                failed: false,
            },
            Err(e) => {
                warn!(target: "hush::cache", error = %e, "Cannot create cache file; response will not be persisted");
                Self {
                    path: Some(path),
                    file: None,
                    failed: true,
                }
            }
        }
    }

    pub(crate) fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub(crate) async fn append(&mut self, bytes: &[u8]) {
        let Some(file) = self.file.as_mut() else {
            return;
        };
        if let Err(source) = file.write_all(bytes).await {
            let err = ProxyError::LocalIo {
                path: self.path.clone().unwrap_or_default(),
                source,
            };
            warn!(target: "hush::cache", error = %err, "Cache file write failed; dropping disk copy");
            self.file = None;
            self.failed = true;
        }
    }

    /// Flush and close. Returns the path only when every byte made it to disk.
    pub(crate) async fn finish(mut self) -> Option<PathBuf> {
        if let Some(file) = self.file.as_mut() {
            if let Err(e) = file.flush().await {
                warn!(target: "hush::cache", error = %e, "Cache file flush failed");
                self.failed = true;
            }
        }
        if self.failed { None } else { self.path }
    }

    /// Close and remove whatever was written.
    pub(crate) async fn discard(mut self) {
        self.file = None;
        if let Some(path) = self.path.take() {
            let _ = tokio::fs::remove_file(&path).await;
        }
    }
}

async fn open(path: &Path) -> Result<File, ProxyError> {
    let local = |source| ProxyError::LocalIo {
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(dir).await.map_err(local)?;
    }
    File::create(path).await.map_err(local)
}

#[cfg(test)]
mod tests {
    use super::CacheCapture;

    #[tokio::test]
    async fn writes_all_chunks() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("0.cache");

        let mut capture = CacheCapture::create(path.clone()).await;
        capture.append(b"abc").await;
        capture.append(b"def").await;
        assert_eq!(capture.finish().await, Some(path.clone()));
        assert_eq!(std::fs::read(&path).expect("read"), b"abcdef");
    }

    #[tokio::test]
    async fn discard_removes_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("1.cache");

        let mut capture = CacheCapture::create(path.clone()).await;
        capture.append(b"partial").await;
        capture.discard().await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn unwritable_location_degrades_quietly() {
        let file = tempfile::NamedTempFile::new().expect("tempfile");
        // parent is a regular file, so the cache file cannot be created
        let path = file.path().join("2.cache");

        let mut capture = CacheCapture::create(path).await;
        capture.append(b"ignored").await;
        assert!(capture.path().is_some());
        assert_eq!(capture.finish().await, None);
    }

    #[tokio::test]
    async fn disabled_capture_has_no_path() {
        let mut capture = CacheCapture::disabled();
        capture.append(b"x").await;
        assert!(capture.path().is_none());
        assert_eq!(capture.finish().await, None);
    }
}
