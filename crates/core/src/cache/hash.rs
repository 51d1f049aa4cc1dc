//! Request cache key generation.

use sha2::{Digest, Sha256};

/// Compute the cache key for a request.
///
/// Keys match exactly on method and URL, query string included.
pub fn compute_cache_key(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.to_ascii_uppercase().as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_stability() {
        let hash1 = compute_cache_key("GET", "http://localhost:8080/offline");
        let hash2 = compute_cache_key("GET", "http://localhost:8080/offline");
        assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_hash_method_case_insensitive() {
        assert_eq!(compute_cache_key("get", "https://example.com/"), compute_cache_key("GET", "https://example.com/"));
    }

    #[test]
    fn test_hash_different_method() {
        assert_ne!(compute_cache_key("GET", "https://example.com/"), compute_cache_key("POST", "https://example.com/"));
    }

    #[test]
    fn test_hash_query_is_significant() {
        let plain = compute_cache_key("GET", "https://example.com/offline");
        let busted = compute_cache_key("GET", "https://example.com/offline?cachebust=1");
        assert_ne!(plain, busted);
    }

    #[test]
    fn test_hash_format() {
        let hash = compute_cache_key("GET", "https://example.com");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
