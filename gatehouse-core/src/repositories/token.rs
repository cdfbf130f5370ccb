use crate::{Error, VerificationToken};
use async_trait::async_trait;

/// Repository for verification token data access
#[async_trait]
pub trait VerificationTokenRepository: Send + Sync + 'static {
    /// Persist a freshly generated token record.
    async fn save(&self, token: &VerificationToken) -> Result<(), Error>;

    /// Verify and consume a token, given its plaintext.
    ///
    /// Matches only tokens that are unused and unexpired, and marks the match
    /// as used in the same operation so it can never be consumed twice.
    /// Returns `None` when nothing matches.
    async fn consume(&self, token: &str) -> Result<Option<VerificationToken>, Error>;

    /// Remove expired tokens.
    async fn cleanup_expired(&self) -> Result<(), Error>;
}
