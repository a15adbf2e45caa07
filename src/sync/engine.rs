//! Sync engine
//!
//! Moves artifacts and shared index files between the local cache and the
//! remote object store.
//!
//! Artifacts are written to both stores and never merged. Shared index files
//! are read from both sides, merged according to their `Encoding`, and
//! written back. The metadata batch writes the merged result to both stores
//! inside the metadata lock; a single-file pull only updates the local copy.
//!
//! The two stores are never updated atomically. A failed remote write leaves
//! the local cache ahead of the bucket until the next [`SyncEngine::reindex`]
//! or metadata batch catches up.

use std::sync::Arc;

use futures::TryStreamExt;

use crate::cache::{Artifact, LocalCache, ReindexHook, ReindexReport};
use crate::error::{Result, SyncError};
use crate::lock::{with_lock, LockManager};
use crate::storage::RemoteObjectStore;

use super::keys::{self, ARTIFACT_PREFIX};
use super::types::{SharedFile, SharedIndexFiles};

/// Lock guarding the metadata-update batch
pub const METADATA_LOCK: &str = ".metadata";

/// Coordinates the local cache and the remote store
pub struct SyncEngine {
    local: Arc<dyn LocalCache>,
    remote: Arc<dyn RemoteObjectStore>,
    locks: Arc<dyn LockManager>,
    shared: SharedIndexFiles,
}

impl SyncEngine {
    pub fn new(
        local: Arc<dyn LocalCache>,
        remote: Arc<dyn RemoteObjectStore>,
        locks: Arc<dyn LockManager>,
        shared: SharedIndexFiles,
    ) -> Self {
        Self {
            local,
            remote,
            locks,
            shared,
        }
    }

    pub fn shared_files(&self) -> &SharedIndexFiles {
        &self.shared
    }

    /// Store an artifact locally and remotely, then merge the shared indexes
    ///
    /// If the remote write fails the local copy stays in place and the
    /// remote error is returned.
    pub async fn create_artifact(&self, artifact: &Artifact, overwrite: bool) -> Result<()> {
        self.local.create(artifact, overwrite).await?;

        let object_key = artifact.object_key();
        tracing::info!("Gem: local -> S3 {}", object_key);
        self.remote.write(&object_key, artifact.data.clone()).await?;

        self.update_metadata().await
    }

    /// Remove an artifact from both stores
    ///
    /// Other instances keep serving their cached copy; nothing tells them
    /// the artifact is gone.
    pub async fn delete_artifact(&self, path_info: &str) -> Result<()> {
        self.local.delete(path_info).await?;
        self.remote.delete(keys::artifact_key(path_info)).await?;
        Ok(())
    }

    /// Make sure `path_info` is cached locally before it is served
    ///
    /// A missing artifact is pulled from the remote store in one piece. If
    /// neither side has it, the local cache reports `NotFound`.
    pub async fn ensure_local_artifact(&self, path_info: &str) -> Result<()> {
        let local_file = self.local.local_path(path_info)?;

        if !self.local.exists(&local_file).await {
            let object_key = keys::artifact_key(path_info);
            if self.remote.exists(object_key).await? {
                tracing::info!("Gem: S3 -> local {}", local_file.display());
                let data = self.remote.read(object_key).await?;
                let artifact = Artifact::from_path_info(path_info, data);

                match self.local.create(&artifact, false).await {
                    // Another request materialized it first
                    Ok(()) | Err(SyncError::AlreadyExists(_)) => {}
                    Err(e) => return Err(e),
                }

                self.update_metadata().await?;
            }
        }

        self.local.prepare_local_file(path_info).await
    }

    /// Merge the remote copy of one shared index file into the local cache
    ///
    /// Nothing is pushed back. Text logs grow on every call, even when the
    /// remote copy has not changed.
    pub async fn sync_shared_index_file(&self, path_info: &str) -> Result<()> {
        let name = keys::file_name(path_info);
        let file = self
            .shared
            .get(name)
            .ok_or_else(|| SyncError::UnknownSharedFile(name.to_string()))?;

        tracing::info!("Pull: S3 -> local {}", file.name);
        let merged = self.merge_with_remote(file).await?;

        let local_file = self.local.local_path(&file.name)?;
        self.local.write(&local_file, &merged).await
    }

    /// Refresh cached artifacts whose size differs from the remote object
    ///
    /// Runs without the metadata lock and never touches shared index files.
    /// Keys that would land outside the cache root are skipped.
    pub async fn reindex(&self, hook: Option<ReindexHook>) -> Result<ReindexReport> {
        let artifact_dir = self.local.local_path(ARTIFACT_PREFIX)?;
        self.local.ensure_dir(&artifact_dir).await?;

        let mut report = ReindexReport::default();
        let mut objects = self.remote.list_with_prefix(ARTIFACT_PREFIX);

        while let Some(object) = objects.try_next().await? {
            // Directory placeholder objects
            if object.key.ends_with('/') {
                continue;
            }

            let path_info = format!("/{}", object.key);
            let local_file = match self.local.local_path(&path_info) {
                Ok(path) => path,
                Err(SyncError::InvalidPath(_)) => {
                    tracing::warn!(key = %object.key, "Skipping object outside the cache root");
                    continue;
                }
                Err(e) => return Err(e),
            };
            report.objects_seen += 1;

            let missing = !self.local.exists(&local_file).await;
            let local_size = self.local.size(&local_file).await;

            if missing || object.content_length != local_size {
                tracing::info!("Gem: S3 -> local {}", local_file.display());
                let data = self.remote.read(&object.key).await?;
                self.local.write(&local_file, &data).await?;
                report.refreshed += 1;
            }
        }
        drop(objects);

        self.local.reindex(report, hook).await
    }

    /// Merge every shared index file with its remote copy and write the
    /// result to both stores
    ///
    /// Binary sets go first, then text logs. The metadata lock is held for
    /// the whole batch and released whether or not it succeeds.
    pub async fn update_metadata(&self) -> Result<()> {
        with_lock(self.locks.as_ref(), METADATA_LOCK, async {
            for file in self.shared.batch_order() {
                self.push_file(file).await?;
            }
            Ok(())
        })
        .await
    }

    async fn push_file(&self, file: &SharedFile) -> Result<()> {
        tracing::info!("Push: local -> S3 {}", file.name);

        let merged = self.merge_with_remote(file).await?;
        self.remote.write(&remote_key(file), merged.clone()).await?;

        let local_file = self.local.local_path(&file.name)?;
        self.local.write(&local_file, &merged).await
    }

    /// Local contents merged with the remote copy. Either side may be
    /// missing; a missing side counts as empty.
    async fn merge_with_remote(&self, file: &SharedFile) -> Result<Vec<u8>> {
        let local_file = self.local.local_path(&file.name)?;
        let local = self.local.read(&local_file).await?.unwrap_or_default();

        let remote = match self.remote.read(&remote_key(file)).await {
            Ok(data) => data,
            Err(e) if e.is_not_found() => {
                tracing::debug!(file = %file.name, "No remote copy, keeping local contents");
                return Ok(local);
            }
            Err(e) => return Err(e.into()),
        };

        file.encoding
            .merge(&local, &remote)
            .map_err(|source| SyncError::MergeDecode {
                file: file.name.clone(),
                source,
            })
    }
}

fn remote_key(file: &SharedFile) -> String {
    keys::metadata_key(&format!("/{}", file.name))
}
