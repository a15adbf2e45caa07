//! Merge strategies for shared index files
//!
//! Pure functions that combine the local and remote copy of a file into the
//! content written back to both stores.
//!
//! # Binary sets
//!
//! Payloads are gzip streams wrapping a bincode-serialized `BTreeSet` of
//! [`IndexEntry`]. Union over a sorted set plus a gzip header with no mtime
//! makes encoding deterministic, so merging a payload with itself returns
//! the same bytes.
//!
//! # Text logs
//!
//! Plain concatenation. Merging is not idempotent: syncing the same remote
//! content twice appends it twice, and nothing here tracks what was already
//! merged.

use std::collections::BTreeSet;
use std::io::{Read, Write};

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::error::DecodeError;

use super::types::IndexEntry;

/// Union of two binary-set payloads. Empty input is the empty set.
pub fn merge_binary_set(local: &[u8], remote: &[u8]) -> Result<Vec<u8>, DecodeError> {
    let mut entries = decode_set(local)?;
    entries.extend(decode_set(remote)?);
    encode_set(&entries)
}

/// `local` followed by `remote`
pub fn merge_text_log(local: &[u8], remote: &[u8]) -> Vec<u8> {
    let mut merged = Vec::with_capacity(local.len() + remote.len());
    merged.extend_from_slice(local);
    merged.extend_from_slice(remote);
    merged
}

/// Decompress and deserialize a binary-set payload
pub fn decode_set(bytes: &[u8]) -> Result<BTreeSet<IndexEntry>, DecodeError> {
    if bytes.is_empty() {
        return Ok(BTreeSet::new());
    }

    let mut raw = Vec::new();
    GzDecoder::new(bytes).read_to_end(&mut raw)?;
    Ok(bincode::deserialize(&raw)?)
}

/// Serialize and compress an entry set
pub fn encode_set(entries: &BTreeSet<IndexEntry>) -> Result<Vec<u8>, DecodeError> {
    let raw = bincode::serialize(entries)?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&raw)?;
    Ok(encoder.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(entries: &[(&str, &str)]) -> BTreeSet<IndexEntry> {
        entries
            .iter()
            .map(|(name, version)| IndexEntry::ruby(*name, *version))
            .collect()
    }

    #[test]
    fn test_binary_set_merge_is_union() {
        let a = set(&[("rake", "13.0.0"), ("rack", "2.2.0")]);
        let b = set(&[("rack", "2.2.0"), ("foo", "1.0")]);

        let merged = merge_binary_set(&encode_set(&a).unwrap(), &encode_set(&b).unwrap()).unwrap();

        let expected: BTreeSet<IndexEntry> = a.union(&b).cloned().collect();
        assert_eq!(decode_set(&merged).unwrap(), expected);
        assert_eq!(expected.len(), 3);
    }

    #[test]
    fn test_binary_set_merge_is_idempotent() {
        let x = encode_set(&set(&[("rake", "13.0.0"), ("foo", "1.0")])).unwrap();
        assert_eq!(merge_binary_set(&x, &x).unwrap(), x);
    }

    #[test]
    fn test_binary_set_merge_is_commutative() {
        let a = encode_set(&set(&[("rake", "13.0.0")])).unwrap();
        let b = encode_set(&set(&[("foo", "1.0")])).unwrap();
        assert_eq!(
            merge_binary_set(&a, &b).unwrap(),
            merge_binary_set(&b, &a).unwrap()
        );
    }

    #[test]
    fn test_binary_set_empty_side() {
        let b = set(&[("x", "1.0"), ("y", "2.0")]);
        let encoded = encode_set(&b).unwrap();

        assert_eq!(decode_set(&merge_binary_set(b"", &encoded).unwrap()).unwrap(), b);
        assert_eq!(decode_set(&merge_binary_set(&encoded, b"").unwrap()).unwrap(), b);
        assert!(decode_set(&merge_binary_set(b"", b"").unwrap()).unwrap().is_empty());
    }

    #[test]
    fn test_binary_set_rejects_corrupt_payload() {
        let good = encode_set(&set(&[("x", "1.0")])).unwrap();

        let result = merge_binary_set(&good, b"not gzip at all");
        assert!(matches!(result, Err(DecodeError::Gzip(_))));

        // Valid gzip, garbage inside
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&[0xff; 3]).unwrap();
        let garbage = encoder.finish().unwrap();
        assert!(matches!(
            merge_binary_set(&garbage, &good),
            Err(DecodeError::EntrySet(_))
        ));
    }

    #[test]
    fn test_text_log_concatenates() {
        assert_eq!(merge_text_log(b"a\n", b"b\n"), b"a\nb\n");
        assert_eq!(merge_text_log(b"a\n", b""), b"a\n");
        assert_eq!(merge_text_log(b"", b"b\n"), b"b\n");
    }

    #[test]
    fn test_text_log_is_not_idempotent() {
        let once = merge_text_log(b"a\n", b"b\n");
        let twice = merge_text_log(&once, b"b\n");
        assert_eq!(twice, b"a\nb\nb\n");
    }
}
