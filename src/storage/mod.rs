//! Remote object storage
//!
//! Supports MinIO, Cloudflare R2, Backblaze B2, and AWS S3, plus an
//! in-memory store for tests.

mod memory;
mod s3_client;
mod traits;
mod types;

pub use memory::MemoryStore;
pub use s3_client::S3Store;
pub use traits::RemoteObjectStore;
pub use types::*;
