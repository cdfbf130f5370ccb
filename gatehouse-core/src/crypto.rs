//! Cryptographic utilities for secure token handling
//!
//! Verification tokens are stored as SHA-256 hashes and compared in constant
//! time. For a 256-bit random token that is sufficient: brute force is
//! infeasible, and unlike passwords there is no low-entropy secret that would
//! call for a memory-hard KDF.

use base64::{Engine, prelude::BASE64_URL_SAFE_NO_PAD};
use rand::{TryRngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Generate a cryptographically secure random token.
///
/// Produces 256 bits of entropy encoded as URL-safe base64 (43 characters),
/// suitable for inclusion in a verification link.
///
/// # Panics
///
/// Panics if the OS random number generator fails; there is no safe way to
/// continue issuing security tokens without system entropy.
pub fn generate_secure_token() -> String {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .expect("OS RNG failure - system entropy source unavailable");
    BASE64_URL_SAFE_NO_PAD.encode(bytes)
}

/// Hash a token for storage. Deterministic, so the hash doubles as the lookup
/// key; the plaintext never touches the store.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Verify a token against a stored hash in constant time.
pub fn verify_token_hash(token: &str, stored_hash: &str) -> bool {
    let computed = hash_token(token);
    computed.as_bytes().ct_eq(stored_hash.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_secure_token_is_unique_and_url_safe() {
        let a = generate_secure_token();
        let b = generate_secure_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(a.chars().all(|c| c.is_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_hash_token_is_deterministic() {
        let token = generate_secure_token();
        assert_eq!(hash_token(&token), hash_token(&token));
        assert_ne!(hash_token(&token), hash_token("other"));
    }

    #[test]
    fn test_verify_token_hash() {
        let token = generate_secure_token();
        let hash = hash_token(&token);

        assert!(verify_token_hash(&token, &hash));
        assert!(!verify_token_hash("wrong-token", &hash));
        assert!(!verify_token_hash(&token, "wrong-hash"));
    }
}
