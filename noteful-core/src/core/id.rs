//! Entity identifiers: validation and minting.
//!
//! Identifiers are 24-character hexadecimal strings laid out like a storage
//! object id: a 4-byte timestamp, 5 bytes of per-process randomness and a
//! 3-byte counter.

use crate::{NotefulError, Result};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::OnceLock;

/// Length of a hex-encoded identifier.
pub const ID_LEN: usize = 24;

const COUNTER_MASK: u32 = 0x00ff_ffff;

/// Returns `true` iff `value` is exactly [`ID_LEN`] ASCII hex digits.
#[must_use]
pub fn is_valid_id(value: &str) -> bool {
    value.len() == ID_LEN && value.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Returns the canonical (lowercase) spelling of `value`.
///
/// Every hex spelling of an id names the same record, so callers store and
/// compare the returned string rather than the raw input.
///
/// # Errors
///
/// Returns [`NotefulError::InvalidId`] naming `field` if `value` fails
/// [`is_valid_id`].
pub fn ensure_valid_id(field: &str, value: &str) -> Result<String> {
    if is_valid_id(value) {
        Ok(value.to_ascii_lowercase())
    } else {
        Err(NotefulError::invalid_id(field, value))
    }
}

/// Mints a fresh lowercase identifier.
#[must_use]
pub fn new_id() -> String {
    static PROCESS_BYTES: OnceLock<[u8; 5]> = OnceLock::new();
    static COUNTER: OnceLock<AtomicU32> = OnceLock::new();

    let process = PROCESS_BYTES.get_or_init(rand::random::<[u8; 5]>);
    let counter = COUNTER
        .get_or_init(|| AtomicU32::new(rand::random::<u32>() & COUNTER_MASK))
        .fetch_add(1, Ordering::Relaxed)
        & COUNTER_MASK;
    let seconds = chrono::Utc::now().timestamp() as u32;

    let mut bytes = [0u8; 12];
    bytes[..4].copy_from_slice(&seconds.to_be_bytes());
    bytes[4..9].copy_from_slice(process);
    bytes[9..].copy_from_slice(&counter.to_be_bytes()[1..]);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_valid_ids() {
        assert!(is_valid_id("000000000000000000000001"));
        assert!(is_valid_id("5a8b7c6d5e4f3a2b1c0dABCD"));
    }

    #[test]
    fn test_invalid_ids() {
        assert!(!is_valid_id(""));
        assert!(!is_valid_id("DOES_NOT_EXIST"));
        assert!(!is_valid_id("thisaintvalid"));
        assert!(!is_valid_id("00000000000000000000001"));
        assert!(!is_valid_id("0000000000000000000000001"));
        assert!(!is_valid_id("00000000000000000000000g"));
        // Twelve-character strings are not accepted as raw byte ids.
        assert!(!is_valid_id("abcdefghijkl"));
    }

    #[test]
    fn test_ensure_valid_id_names_field() {
        let err = ensure_valid_id("folderId", "bogus").unwrap_err();
        match err {
            NotefulError::InvalidId { field, value } => {
                assert_eq!(field, "folderId");
                assert_eq!(value, "bogus");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(ensure_valid_id("id", "999999999999999999999999").is_ok());
    }

    #[test]
    fn test_ensure_valid_id_canonicalises_case() {
        assert_eq!(
            ensure_valid_id("id", "5A8B7C6D5E4F3A2B1C0DABCD").unwrap(),
            "5a8b7c6d5e4f3a2b1c0dabcd"
        );
    }

    #[test]
    fn test_new_id_is_valid_and_unique() {
        let ids: HashSet<String> = (0..1000).map(|_| new_id()).collect();
        assert_eq!(ids.len(), 1000);
        assert!(ids.iter().all(|id| is_valid_id(id)));
        assert!(ids.iter().all(|id| id.chars().all(|c| !c.is_ascii_uppercase())));
    }
}
