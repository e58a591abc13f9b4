//! Record fingerprints.
//!
//! # Responsibility
//! - Compute the advisory content hash used for duplicate flagging.
//! - Mint synthetic hashes for containers.
//!
//! # Invariants
//! - `content_hash` is deterministic and always renders a decimal `i32`.
//! - `container_hash` never parses as a decimal integer, so it cannot collide
//!   with a content hash.

use uuid::Uuid;

/// Prefix carried by every synthetic container hash.
pub const CONTAINER_HASH_PREFIX: &str = "container:";

/// Computes the 32-bit rolling hash of `text` as a decimal string.
///
/// Folds UTF-16 code units with `h = h * 31 + unit`, wrapping at 32 bits.
/// This is a cheap collision-tolerant fingerprint, not an integrity check.
pub fn content_hash(text: &str) -> String {
    let hash = text
        .encode_utf16()
        .fold(0_i32, |acc, unit| acc.wrapping_mul(31).wrapping_add(i32::from(unit)));
    hash.to_string()
}

/// Mints a unique synthetic hash for a container record.
pub fn container_hash() -> String {
    format!("{CONTAINER_HASH_PREFIX}{}", Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::{container_hash, content_hash, CONTAINER_HASH_PREFIX};

    #[test]
    fn content_hash_matches_known_values() {
        assert_eq!(content_hash(""), "0");
        assert_eq!(content_hash("a"), "97");
        assert_eq!(content_hash("hello"), "99162322");
    }

    #[test]
    fn content_hash_wraps_to_signed_32_bits() {
        assert_eq!(content_hash("polygenelubricants"), i32::MIN.to_string());
    }

    #[test]
    fn content_hash_folds_utf16_surrogate_pairs() {
        // U+1F600 encodes as 0xD83D 0xDE00.
        assert_eq!(content_hash("\u{1F600}"), "1772899");
    }

    #[test]
    fn container_hash_is_unique_and_never_numeric() {
        let first = container_hash();
        let second = container_hash();

        assert_ne!(first, second);
        assert!(first.starts_with(CONTAINER_HASH_PREFIX));
        assert!(first.parse::<i64>().is_err());
    }
}
