//! Remote object store interface

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::error::StorageError;

use super::types::ObjectSummary;

/// Durable, shared, key-addressed blob store
///
/// Every instance of the gem server talks to the same store. Keys are plain
/// strings; namespacing (`gems/`, `metadata/`) is the caller's concern.
#[async_trait]
pub trait RemoteObjectStore: Send + Sync {
    /// Check if an object exists
    async fn exists(&self, key: &str) -> Result<bool, StorageError>;

    /// Read an object's full contents
    ///
    /// The whole payload is buffered in memory. Large artifacts would need a
    /// streaming variant; merge semantics do not depend on it.
    async fn read(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Write (create or replace) an object
    async fn write(&self, key: &str, data: Vec<u8>) -> Result<(), StorageError>;

    /// Delete an object
    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Lazily list every object whose key starts with `prefix`
    ///
    /// The stream is finite and can be consumed once.
    fn list_with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> BoxStream<'a, Result<ObjectSummary, StorageError>>;
}
