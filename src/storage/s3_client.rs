//! S3-compatible object store
//!
//! Wraps the AWS SDK for S3-compatible storage access.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    config::{Credentials, Region},
    error::DisplayErrorContext,
    primitives::ByteStream,
    Client,
};
use chrono::DateTime;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};

use crate::config::StorageConfig;
use crate::error::StorageError;

use super::traits::RemoteObjectStore;
use super::types::{ListOptions, ObjectPage, ObjectSummary};

/// Page size used when walking a prefix
const LIST_PAGE_SIZE: i32 = 1000;

/// S3-compatible object store
#[derive(Clone)]
pub struct S3Store {
    client: Client,
    bucket: String,
}

impl S3Store {
    /// Create a new S3 store from configuration
    pub async fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "gem-mirror-sync",
        );

        let region = config
            .region
            .clone()
            .unwrap_or_else(|| "us-east-1".to_string());

        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint)
            .region(Region::new(region))
            .credentials_provider(credentials)
            .force_path_style(config.provider.needs_path_style())
            .build();

        let client = Client::from_conf(s3_config);

        let bucket = config.bucket.clone();
        match client.head_bucket().bucket(&bucket).send().await {
            Ok(_) => {
                tracing::info!("Connected to S3 bucket: {}", bucket);
            }
            Err(e) => {
                tracing::warn!(
                    "Could not verify bucket {}: {}. Will attempt operations anyway.",
                    bucket,
                    DisplayErrorContext(&e)
                );
            }
        }

        Ok(Self { client, bucket })
    }

    /// List a single page of objects
    pub async fn list_objects(&self, options: ListOptions) -> Result<ObjectPage, StorageError> {
        let mut request = self.client.list_objects_v2().bucket(&self.bucket);

        if let Some(prefix) = options.prefix {
            request = request.prefix(prefix);
        }

        if let Some(max_keys) = options.max_keys {
            request = request.max_keys(max_keys);
        }

        if let Some(token) = options.continuation_token {
            request = request.continuation_token(token);
        }

        let response = request.send().await.map_err(|e| {
            StorageError::SdkError(format!("Failed to list objects: {}", DisplayErrorContext(&e)))
        })?;

        let objects = response
            .contents()
            .iter()
            .map(|obj| ObjectSummary {
                key: obj.key().unwrap_or_default().to_string(),
                content_length: obj.size().unwrap_or(0).max(0) as u64,
                last_modified: obj
                    .last_modified()
                    .and_then(|dt| DateTime::from_timestamp(dt.secs(), dt.subsec_nanos())),
            })
            .collect();

        Ok(ObjectPage {
            objects,
            continuation_token: response.next_continuation_token().map(|s| s.to_string()),
            is_truncated: response.is_truncated().unwrap_or(false),
        })
    }

    /// Fetch the page at `cursor`; `None` once the listing is exhausted
    async fn next_page(
        &self,
        prefix: &str,
        cursor: Option<Option<String>>,
    ) -> Result<Option<(Vec<ObjectSummary>, Option<Option<String>>)>, StorageError> {
        let Some(token) = cursor else {
            return Ok(None);
        };

        let mut options = ListOptions::new()
            .with_prefix(prefix)
            .with_max_keys(LIST_PAGE_SIZE);

        if let Some(token) = token {
            options = options.with_continuation_token(token);
        }

        let page = self.list_objects(options).await?;
        let next = if page.is_truncated {
            page.continuation_token.map(Some)
        } else {
            None
        };

        Ok(Some((page.objects, next)))
    }
}

#[async_trait]
impl RemoteObjectStore for S3Store {
    async fn exists(&self, key: &str) -> Result<bool, StorageError> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => Ok(false),
            Err(e) => Err(StorageError::SdkError(format!(
                "Failed to head object {}: {}",
                key,
                DisplayErrorContext(&e)
            ))),
        }
    }

    async fn read(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    StorageError::ObjectNotFound(key.to_string())
                } else {
                    StorageError::SdkError(format!(
                        "Failed to get object {}: {}",
                        key,
                        DisplayErrorContext(&e)
                    ))
                }
            })?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::SdkError(format!("Failed to read object body: {}", e)))?
            .into_bytes()
            .to_vec();

        Ok(data)
    }

    async fn write(&self, key: &str, data: Vec<u8>) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| {
                StorageError::SdkError(format!(
                    "Failed to put object {}: {}",
                    key,
                    DisplayErrorContext(&e)
                ))
            })?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                StorageError::SdkError(format!(
                    "Failed to delete object {}: {}",
                    key,
                    DisplayErrorContext(&e)
                ))
            })?;

        Ok(())
    }

    fn list_with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> BoxStream<'a, Result<ObjectSummary, StorageError>> {
        stream::try_unfold(Some(None), move |cursor| async move {
            let page = self.next_page(prefix, cursor).await?;
            Ok::<_, StorageError>(page.map(|(objects, next)| {
                let items = objects.into_iter().map(Ok::<_, StorageError>);
                (stream::iter(items), next)
            }))
        })
        .try_flatten()
        .boxed()
    }
}
