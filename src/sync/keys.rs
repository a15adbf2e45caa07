//! Object key derivation
//!
//! Artifacts and shared index files live in separate remote namespaces so a
//! listing of `gems/` never picks up index files.

/// Remote and local namespace of artifact payloads
pub const ARTIFACT_PREFIX: &str = "gems/";

/// Segment substituted for each separator in metadata keys
pub const METADATA_SEGMENT: &str = "metadata/";

/// `/gems/foo-1.0.gem` -> `gems/foo-1.0.gem`
pub fn artifact_key(path_info: &str) -> &str {
    path_info.strip_prefix('/').unwrap_or(path_info)
}

/// `/specs.4.8.gz` -> `metadata/specs.4.8.gz`
pub fn metadata_key(path_info: &str) -> String {
    path_info.replace('/', METADATA_SEGMENT)
}

/// Local path info of an artifact name: `foo-1.0.gem` -> `/gems/foo-1.0.gem`
pub fn artifact_path_info(name: &str) -> String {
    format!("/{}{}", ARTIFACT_PREFIX, name)
}

/// Last path segment
pub fn file_name(path_info: &str) -> &str {
    path_info.rsplit('/').next().unwrap_or(path_info)
}
