//! Local cache interface

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::Result;

use super::types::{Artifact, ReindexHook, ReindexReport};

/// Per-instance, disposable mirror of artifacts and index files
///
/// Only one instance ever touches a given cache, so implementations need no
/// cross-process locking.
#[async_trait]
pub trait LocalCache: Send + Sync {
    /// Store an artifact. Fails with `AlreadyExists` unless `overwrite`.
    async fn create(&self, artifact: &Artifact, overwrite: bool) -> Result<()>;

    /// Remove an artifact. Fails with `NotFound` if absent.
    async fn delete(&self, path_info: &str) -> Result<()>;

    /// Where `path_info` lives on disk. Fails with `InvalidPath` if it would
    /// leave the cache root.
    fn local_path(&self, path_info: &str) -> Result<PathBuf>;

    /// Finish materializing a cached file before it is served
    async fn prepare_local_file(&self, path_info: &str) -> Result<()>;

    /// Domain-specific rebuild after a reindex pass, then `hook`
    async fn reindex(&self, report: ReindexReport, hook: Option<ReindexHook>)
        -> Result<ReindexReport>;

    async fn exists(&self, path: &Path) -> bool {
        tokio::fs::try_exists(path).await.unwrap_or(false)
    }

    /// File size, 0 when absent
    async fn size(&self, path: &Path) -> u64 {
        tokio::fs::metadata(path)
            .await
            .map(|m| m.len())
            .unwrap_or(0)
    }

    /// File contents, `None` when absent
    async fn read(&self, path: &Path) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Create a directory and its parents
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        tokio::fs::create_dir_all(path).await?;
        Ok(())
    }

    /// Replace a file's contents, creating parent directories
    async fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, data).await?;
        Ok(())
    }
}
