//! Filesystem gem cache
//!
//! Artifacts live under `<root>/gems/`, index files directly under `<root>`.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{Result, SyncError};
use crate::sync::keys::ARTIFACT_PREFIX;

use super::traits::LocalCache;
use super::types::{Artifact, ReindexHook, ReindexReport};

/// Local cache rooted at a directory
#[derive(Debug, Clone)]
pub struct FsLocalCache {
    root: PathBuf,
}

impl FsLocalCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Count artifact files currently cached
    async fn count_artifacts(&self) -> Result<usize> {
        let dir = self.root.join(ARTIFACT_PREFIX);
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let mut count = 0;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                count += 1;
            }
        }
        Ok(count)
    }
}

#[async_trait]
impl LocalCache for FsLocalCache {
    async fn create(&self, artifact: &Artifact, overwrite: bool) -> Result<()> {
        let path_info = artifact.path_info();
        let path = self.local_path(&path_info)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        if overwrite {
            tokio::fs::write(&path, &artifact.data).await?;
        } else {
            let mut file = tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
                .map_err(|e| match e.kind() {
                    std::io::ErrorKind::AlreadyExists => SyncError::AlreadyExists(path_info.clone()),
                    _ => SyncError::Io(e),
                })?;
            file.write_all(&artifact.data).await?;
            file.flush().await?;
        }

        tracing::debug!(path = %path.display(), size = artifact.data.len(), "Stored artifact");
        Ok(())
    }

    async fn delete(&self, path_info: &str) -> Result<()> {
        let path = self.local_path(path_info)?;
        tokio::fs::remove_file(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => SyncError::NotFound(path_info.to_string()),
            _ => SyncError::Io(e),
        })
    }

    fn local_path(&self, path_info: &str) -> Result<PathBuf> {
        let relative = Path::new(path_info.trim_start_matches('/'));
        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(SyncError::InvalidPath(path_info.to_string()));
        }
        Ok(self.root.join(relative))
    }

    async fn prepare_local_file(&self, path_info: &str) -> Result<()> {
        let path = self.local_path(path_info)?;
        if self.exists(&path).await {
            Ok(())
        } else {
            Err(SyncError::NotFound(path_info.to_string()))
        }
    }

    async fn reindex(
        &self,
        report: ReindexReport,
        hook: Option<ReindexHook>,
    ) -> Result<ReindexReport> {
        let report = ReindexReport {
            local_artifacts: self.count_artifacts().await?,
            ..report
        };

        tracing::info!(
            artifacts = report.local_artifacts,
            refreshed = report.refreshed,
            "Local cache reindexed"
        );

        if let Some(hook) = hook {
            hook(&report);
        }
        Ok(report)
    }
}
