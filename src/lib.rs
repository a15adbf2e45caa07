//! Gem Mirror Sync
//!
//! Keeps a gem server's local cache consistent with an S3-compatible bucket
//! shared by every server instance.
//!
//! # Modules
//!
//! - `sync`: the engine, merge strategies and key layout
//! - `cache`: local cache interface and the on-disk implementation
//! - `storage`: remote object store interface, S3 and in-memory backends
//! - `lock`: named locks for the metadata-update batch

pub mod cache;
pub mod config;
pub mod error;
pub mod lock;
pub mod storage;
pub mod sync;

pub use cache::{Artifact, FsLocalCache, LocalCache, ReindexReport};
pub use error::{Result, SyncError};
pub use lock::{InProcessLockManager, LockManager};
pub use storage::{MemoryStore, RemoteObjectStore, S3Store};
pub use sync::{Encoding, SharedIndexFiles, SyncEngine};
