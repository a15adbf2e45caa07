//! Local cache types

use crate::sync::keys;

/// An immutable, named package payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub name: String,
    pub data: Vec<u8>,
}

impl Artifact {
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    /// Build from a path info such as `/gems/foo-1.0.gem`
    pub fn from_path_info(path_info: &str, data: Vec<u8>) -> Self {
        Self::new(keys::file_name(path_info), data)
    }

    /// `/gems/<name>`
    pub fn path_info(&self) -> String {
        keys::artifact_path_info(&self.name)
    }

    /// Remote object key, `gems/<name>`
    pub fn object_key(&self) -> String {
        keys::artifact_key(&self.path_info()).to_string()
    }
}

/// Outcome of a reindex pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReindexReport {
    /// Remote artifact objects listed
    pub objects_seen: usize,
    /// Local files rewritten from the remote copy
    pub refreshed: usize,
    /// Artifacts present locally once the pass finished
    pub local_artifacts: usize,
}

/// Caller-supplied callback run after the local cache has reindexed
pub type ReindexHook = Box<dyn FnOnce(&ReindexReport) + Send>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_paths() {
        let gem = Artifact::new("foo-1.0.gem", b"P".to_vec());
        assert_eq!(gem.path_info(), "/gems/foo-1.0.gem");
        assert_eq!(gem.object_key(), "gems/foo-1.0.gem");
    }

    #[test]
    fn test_from_path_info_uses_basename() {
        let gem = Artifact::from_path_info("/gems/bar-2.1.gem", vec![1]);
        assert_eq!(gem.name, "bar-2.1.gem");
    }
}
