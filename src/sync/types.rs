//! Shared index file types
//!
//! Defines the registry of files that several instances update concurrently
//! and the encoding each one is merged with.

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;

use super::merge::{merge_binary_set, merge_text_log};

/// Gzipped, serialized entry sets
const BINARY_SET_FILES: &[&str] = &[
    "specs.4.8.gz",
    "latest_specs.4.8.gz",
    "prerelease_specs.4.8.gz",
];

/// Plain files merged by appending
const TEXT_LOG_FILES: &[&str] = &[
    "yaml",
    "Marshal.4.8",
    "specs.4.8",
    "latest_specs.4.8",
    "prerelease_specs.4.8",
];

/// How a shared file's two copies are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// Compressed set of entries, merged by union
    BinarySet,
    /// Raw bytes, merged by concatenation (local first)
    TextLog,
}

impl Encoding {
    /// Classify a file by suffix. Only used when building the registry.
    pub fn from_file_name(name: &str) -> Self {
        if name.ends_with(".gz") {
            Encoding::BinarySet
        } else {
            Encoding::TextLog
        }
    }

    /// Merge local and remote contents
    pub fn merge(self, local: &[u8], remote: &[u8]) -> Result<Vec<u8>, DecodeError> {
        match self {
            Encoding::BinarySet => merge_binary_set(local, remote),
            Encoding::TextLog => Ok(merge_text_log(local, remote)),
        }
    }
}

/// A file whose content evolves by merge, never by overwrite
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedFile {
    pub name: String,
    pub encoding: Encoding,
}

/// Known shared index files with their encodings
#[derive(Debug, Clone)]
pub struct SharedIndexFiles {
    files: Vec<SharedFile>,
}

impl SharedIndexFiles {
    /// An empty registry
    pub fn empty() -> Self {
        Self { files: Vec::new() }
    }

    /// Add a file, or retag it if already known
    pub fn register(&mut self, name: impl Into<String>, encoding: Encoding) {
        let name = name.into();
        match self.files.iter_mut().find(|f| f.name == name) {
            Some(existing) => existing.encoding = encoding,
            None => self.files.push(SharedFile { name, encoding }),
        }
    }

    pub fn with(mut self, name: impl Into<String>, encoding: Encoding) -> Self {
        self.register(name, encoding);
        self
    }

    pub fn get(&self, name: &str) -> Option<&SharedFile> {
        self.files.iter().find(|f| f.name == name)
    }

    pub fn encoding_of(&self, name: &str) -> Option<Encoding> {
        self.get(name).map(|f| f.encoding)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Files in metadata batch order: binary sets first, then text logs,
    /// each group in registration order
    pub fn batch_order(&self) -> impl Iterator<Item = &SharedFile> {
        let binary = self
            .files
            .iter()
            .filter(|f| f.encoding == Encoding::BinarySet);
        let text = self.files.iter().filter(|f| f.encoding == Encoding::TextLog);
        binary.chain(text)
    }
}

impl Default for SharedIndexFiles {
    fn default() -> Self {
        let mut files = Self::empty();
        for name in BINARY_SET_FILES {
            files.register(*name, Encoding::BinarySet);
        }
        for name in TEXT_LOG_FILES {
            files.register(*name, Encoding::TextLog);
        }
        files
    }
}

/// One gem index entry: name, version and platform
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct IndexEntry {
    pub name: String,
    pub version: String,
    pub platform: String,
}

impl IndexEntry {
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        platform: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            platform: platform.into(),
        }
    }

    /// Entry for a pure-Ruby gem
    pub fn ruby(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self::new(name, version, "ruby")
    }
}
