//! Email verification tokens
//!
//! A verification token is the single-use, time-limited secret mailed to a
//! new account. It is unrelated to the session token: different format (raw
//! 256-bit random value, not a signed claim set), different lifetime, and no
//! dependency on the signing secret. Only the SHA-256 hash is ever persisted;
//! the plaintext exists once, inside the verification link.

use chrono::{DateTime, Duration, Utc};

use crate::{AccountId, crypto};

/// A pending email verification, as stored.
#[derive(Debug, Clone)]
pub struct VerificationToken {
    pub account_id: AccountId,
    /// SHA-256 hash of the mailed token. Doubles as the lookup key.
    pub token_hash: String,
    /// Set when the token is consumed. A used token never matches again.
    pub used_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl VerificationToken {
    /// Generate a fresh token for an account.
    ///
    /// Returns the plaintext (for the verification link) alongside the record
    /// to persist. The plaintext is not recoverable afterwards.
    pub fn generate(account_id: &AccountId, expires_in: Duration) -> (String, Self) {
        let plaintext = crypto::generate_secure_token();
        let now = Utc::now();

        let token = Self {
            account_id: account_id.clone(),
            token_hash: crypto::hash_token(&plaintext),
            used_at: None,
            expires_at: now + expires_in,
            created_at: now,
        };

        (plaintext, token)
    }

    pub fn is_usable(&self) -> bool {
        self.used_at.is_none() && Utc::now() < self.expires_at
    }

    /// Check a plaintext token against this record in constant time.
    pub fn matches(&self, token: &str) -> bool {
        crypto::verify_token_hash(token, &self.token_hash)
    }
}
