//! In-memory object store
//!
//! Used by tests and single-process setups where several engines share one
//! `Arc<MemoryStore>` in place of a bucket.

use std::collections::BTreeMap;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::RwLock;

use crate::error::StorageError;

use super::traits::RemoteObjectStore;
use super::types::ObjectSummary;

/// Object store backed by a sorted map
#[derive(Default)]
pub struct MemoryStore {
    objects: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl RemoteObjectStore for MemoryStore {
    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        Ok(self.objects.read().await.contains_key(key))
    }

    async fn read(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        self.objects
            .read()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::ObjectNotFound(key.to_string()))
    }

    async fn write(&self, key: &str, data: Vec<u8>) -> Result<(), StorageError> {
        self.objects.write().await.insert(key.to_string(), data);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        // S3 deletes are idempotent
        self.objects.write().await.remove(key);
        Ok(())
    }

    fn list_with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> BoxStream<'a, Result<ObjectSummary, StorageError>> {
        stream::once(async move {
            let objects = self.objects.read().await;
            let page: Vec<Result<ObjectSummary, StorageError>> = objects
                .range(prefix.to_string()..)
                .take_while(|(key, _)| key.starts_with(prefix))
                .map(|(key, data)| Ok(ObjectSummary::new(key.clone(), data.len() as u64)))
                .collect();
            stream::iter(page)
        })
        .flatten()
        .boxed()
    }
}
