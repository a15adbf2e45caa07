//! Error types for the sync engine

use thiserror::Error;

/// Crate-wide result type
pub type Result<T> = std::result::Result<T, SyncError>;

/// Sync engine error type
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Failed to merge {file}: {source}")]
    MergeDecode {
        file: String,
        #[source]
        source: DecodeError,
    },

    #[error("Remote store unavailable: {0}")]
    RemoteUnavailable(#[from] StorageError),

    #[error("Could not acquire lock {name}: {reason}")]
    LockAcquisition { name: String, reason: String },

    #[error("Not a shared index file: {0}")]
    UnknownSharedFile(String),

    #[error("Path escapes the cache root: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Remote object store errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("S3 connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("S3 SDK error: {0}")]
    SdkError(String),
}

impl StorageError {
    /// Whether the error only reports a missing object
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::ObjectNotFound(_))
    }
}

/// Binary-set payload could not be decoded (or, in theory, re-encoded)
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("gzip: {0}")]
    Gzip(#[from] std::io::Error),

    #[error("entry set: {0}")]
    EntrySet(#[from] bincode::Error),
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing environment variable {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}
