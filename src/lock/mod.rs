//! Named locks
//!
//! The metadata-update batch runs under one named lock so that at most one
//! instance reconciles shared index files at a time. Managers hand out
//! [`LockGuard`]s that release on drop, which covers early returns, errors
//! and unwinding alike.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::error::{Result, SyncError};

/// Named mutual-exclusion primitive, possibly spanning processes
#[async_trait]
pub trait LockManager: Send + Sync {
    /// Block until `name` is exclusively held by the caller
    async fn acquire(&self, name: &str) -> Result<LockGuard>;
}

/// Run `work` while holding `name`. The lock is released whatever the outcome.
pub async fn with_lock<F, T>(locks: &dyn LockManager, name: &str, work: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let _guard = locks.acquire(name).await?;
    work.await
}

type ReleaseHook = Box<dyn FnOnce() + Send + Sync>;

/// Ownership of a named lock; dropping it releases the lock
pub struct LockGuard {
    name: String,
    on_release: Option<ReleaseHook>,
    // Dropped after `Drop::drop` runs, so release hooks fire while still held
    _held: Box<dyn Send + Sync>,
}

impl LockGuard {
    /// Wrap whatever keeps the lock held (a mutex guard, a lease handle...)
    pub fn new(name: impl Into<String>, held: impl Send + Sync + 'static) -> Self {
        Self {
            name: name.into(),
            on_release: None,
            _held: Box::new(held),
        }
    }

    /// Run `hook` when the guard is released
    pub fn on_release(mut self, hook: impl FnOnce() + Send + Sync + 'static) -> Self {
        self.on_release = Some(Box::new(hook));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Some(hook) = self.on_release.take() {
            hook();
        }
        tracing::debug!(lock = %self.name, "Lock released");
    }
}

impl std::fmt::Debug for LockGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockGuard")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Lock manager scoped to the current process
///
/// Every engine sharing one `InProcessLockManager` is serialized. Separate
/// processes need a manager backed by shared infrastructure.
#[derive(Default)]
pub struct InProcessLockManager {
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    timeout: Option<Duration>,
}

impl InProcessLockManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail acquisition with [`SyncError::LockAcquisition`] after `timeout`
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
            timeout: Some(timeout),
        }
    }
}

#[async_trait]
impl LockManager for InProcessLockManager {
    async fn acquire(&self, name: &str) -> Result<LockGuard> {
        let lock = {
            let mut locks = self.locks.lock().await;
            locks.entry(name.to_string()).or_default().clone()
        };

        let held = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, lock.lock_owned())
                .await
                .map_err(|_| SyncError::LockAcquisition {
                    name: name.to_string(),
                    reason: format!("timed out after {:?}", timeout),
                })?,
            None => lock.lock_owned().await,
        };

        tracing::debug!(lock = %name, "Lock acquired");
        Ok(LockGuard::new(name, held))
    }
}
