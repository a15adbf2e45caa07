//! Configuration management for the gem mirror sync engine

use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::sync::{Encoding, SharedIndexFiles};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
    pub cache: CacheConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub provider: StorageProvider,
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProvider {
    Minio,
    R2,
    S3,
    B2,
}

impl StorageProvider {
    /// MinIO and most S3-compatible services only accept path-style URLs
    pub fn needs_path_style(self) -> bool {
        !matches!(self, StorageProvider::S3)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Root directory of the local gem cache
    pub root: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Give up on the metadata lock after this many seconds; wait forever if unset
    pub lock_timeout_secs: Option<u64>,
    /// Shared index files beyond the built-in gem index set
    #[serde(default)]
    pub extra_shared_files: Vec<String>,
}

impl SyncConfig {
    pub fn lock_timeout(&self) -> Option<Duration> {
        self.lock_timeout_secs.map(Duration::from_secs)
    }

    /// Resolve the shared file registry, tagging extra files by suffix
    pub fn shared_files(&self) -> SharedIndexFiles {
        let mut files = SharedIndexFiles::default();
        for name in &self.extra_shared_files {
            files.register(name.clone(), Encoding::from_file_name(name));
        }
        files
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Config {
            storage: StorageConfig {
                provider: match env::var("S3_PROVIDER").unwrap_or_else(|_| "minio".to_string()).as_str() {
                    "r2" => StorageProvider::R2,
                    "s3" => StorageProvider::S3,
                    "b2" => StorageProvider::B2,
                    _ => StorageProvider::Minio,
                },
                endpoint: required("S3_ENDPOINT")?,
                bucket: required("S3_BUCKET")?,
                access_key: required("S3_ACCESS_KEY")?,
                secret_key: required("S3_SECRET_KEY")?,
                region: env::var("S3_REGION").ok(),
            },
            cache: CacheConfig {
                root: env::var("CACHE_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from("./data")),
            },
            sync: SyncConfig {
                lock_timeout_secs: match env::var("LOCK_TIMEOUT_SECS") {
                    Ok(value) => Some(value.parse().map_err(|_| ConfigError::InvalidValue {
                        name: "LOCK_TIMEOUT_SECS",
                        value,
                    })?),
                    Err(_) => None,
                },
                extra_shared_files: env::var("EXTRA_SHARED_FILES")
                    .map(|list| parse_list(&list))
                    .unwrap_or_default(),
            },
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::MissingVar(name))
}

fn parse_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
