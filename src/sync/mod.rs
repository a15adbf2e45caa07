//! Sync module for multi-instance gem storage
//!
//! Provides:
//! - Artifact create/delete/pull between the local cache and the bucket
//! - Shared index file merging (set union or append)
//! - Full cache reindexing by size comparison
//!
//! # Metadata batches
//!
//! 1. Acquire the `.metadata` lock
//! 2. For every binary-set file: read local and remote, union, push
//! 3. For every text-log file: read local and remote, append, push
//! 4. Release the lock, also on failure
//!
//! # Consistency
//!
//! - Set merges are idempotent, so replays are harmless
//! - Text-log merges duplicate content when replayed
//! - Local and remote writes are not transactional; reindex reconciles

mod engine;
pub mod keys;
pub mod merge;
mod types;

pub use engine::{SyncEngine, METADATA_LOCK};
pub use merge::{decode_set, encode_set, merge_binary_set, merge_text_log};
pub use types::{Encoding, IndexEntry, SharedFile, SharedIndexFiles};
