use sha2::Digest;
use sha2::Sha256;

/// Hex-encoded SHA-256 digest of a token string.
///
/// Refresh tokens are persisted only in this form; lookups hash the
/// presented token and compare digests.
pub fn token_digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_stable_and_hex() {
        let first = token_digest("some.refresh.token");
        let second = token_digest("some.refresh.token");

        assert_eq!(first, second);
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_digest_differs_per_token() {
        assert_ne!(token_digest("token-a"), token_digest("token-b"));
    }

    #[test]
    fn test_digest_does_not_contain_plaintext() {
        let token = "plaintext-token";
        assert!(!token_digest(token).contains(token));
    }
}
