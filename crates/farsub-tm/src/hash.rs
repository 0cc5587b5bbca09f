//! Exact-dedup hashing for Translation Memory entries (§4.6).

use once_cell::sync::Lazy;
use regex::Regex;
use sha2::{Digest, Sha256};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Lowercase, trim, collapse internal whitespace runs to a single space.
pub fn normalize_for_hash(s: &str) -> String {
    let lowered = s.trim().to_lowercase();
    WHITESPACE.replace_all(&lowered, " ").to_string()
}

/// `sha256(normalize_for_hash(s))`, hex-encoded. Used as the TM's exact-dedup
/// key on promotion (§4.8).
pub fn en_hash(s: &str) -> String {
    let normalized = normalize_for_hash(s);
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_collapses_whitespace_and_case() {
        assert_eq!(
            normalize_for_hash("  Hello   World  "),
            "hello world"
        );
    }

    #[test]
    fn hash_is_stable_across_equivalent_whitespace() {
        assert_eq!(en_hash("Hello   World"), en_hash("hello world"));
        assert_eq!(en_hash("Hello   World"), en_hash("  HELLO world  "));
    }

    #[test]
    fn hash_differs_for_different_text() {
        assert_ne!(en_hash("hello"), en_hash("hello!"));
    }
}
