//! Email verification pipeline
//!
//! Completes the loop the registration pipeline opens: the caller presents
//! the token from their verification link, the token is consumed, and the
//! account flips to verified. Consuming and flipping are separate writes; the
//! consume is the single-use gate, so replaying a link can never re-trigger
//! anything.

use std::sync::Arc;

use crate::{
    Account, AccountId, AuthConfig, Error, VerificationToken,
    error::TokenError,
    repositories::{AccountRepository, VerificationTokenRepository},
};

/// Service for email verification operations
pub struct VerificationService<R: AccountRepository, T: VerificationTokenRepository> {
    accounts: Arc<R>,
    tokens: Arc<T>,
    config: AuthConfig,
}

impl<R: AccountRepository, T: VerificationTokenRepository> VerificationService<R, T> {
    pub fn new(accounts: Arc<R>, tokens: Arc<T>, config: AuthConfig) -> Self {
        Self {
            accounts,
            tokens,
            config,
        }
    }

    /// Mint and persist a fresh verification token for an account, returning
    /// the plaintext to embed in a verification link.
    pub async fn issue_token(&self, account_id: &AccountId) -> Result<String, Error> {
        let (plaintext, token) =
            VerificationToken::generate(account_id, self.config.verification_token_ttl);
        self.tokens.save(&token).await?;
        Ok(plaintext)
    }

    /// Consume a verification token and mark the account's email verified.
    ///
    /// Returns the updated account. An unknown, expired, or already-used
    /// token is rejected without revealing which of the three it was.
    pub async fn verify_email(&self, token: &str) -> Result<Account, Error> {
        let consumed = self.tokens.consume(token).await?.ok_or_else(|| {
            TokenError::Invalid("Invalid or expired verification token".to_string())
        })?;

        self.accounts
            .mark_email_verified(&consumed.account_id)
            .await?;

        self.accounts
            .find_by_id(&consumed.account_id)
            .await?
            .ok_or_else(|| {
                TokenError::Invalid("Verification token references an unknown account".to_string())
                    .into()
            })
    }

    /// Remove expired verification tokens.
    pub async fn cleanup_expired_tokens(&self) -> Result<(), Error> {
        self.tokens.cleanup_expired().await
    }
}
