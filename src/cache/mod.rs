//! Local artifact and index file cache

mod fs;
mod traits;
mod types;

pub use fs::FsLocalCache;
pub use traits::LocalCache;
pub use types::{Artifact, ReindexHook, ReindexReport};
