//! Login pipeline
//!
//! A missing account and a wrong password produce the same outcome, the same
//! message, and the same order of magnitude of work: when the lookup misses,
//! the submitted password is still verified against a throwaway hash so the
//! caller cannot time the difference. The verification gate fires only after
//! the credential checks out, which is why it is a distinct signal.

use std::sync::{Arc, LazyLock};

use crate::{
    Account, AuthConfig, Error,
    error::{AuthError, ValidationError},
    repositories::AccountRepository,
    token::{AccessToken, TokenIssuer},
    validation::validate_password,
};

/// Hash burned on failed lookups to keep miss and mismatch indistinguishable.
static DUMMY_HASH: LazyLock<String> =
    LazyLock::new(|| password_auth::generate_hash("gatehouse-timing-equalizer"));

/// Service for login and session token issuance
pub struct LoginService<R: AccountRepository> {
    accounts: Arc<R>,
    token_issuer: Arc<TokenIssuer>,
}

impl<R: AccountRepository> LoginService<R> {
    pub fn new(accounts: Arc<R>, token_issuer: Arc<TokenIssuer>) -> Self {
        Self {
            accounts,
            token_issuer,
        }
    }

    pub fn from_config(accounts: Arc<R>, config: &AuthConfig) -> Result<Self, Error> {
        Ok(Self::new(accounts, Arc::new(TokenIssuer::new(config)?)))
    }

    /// Authenticate with email and password, returning the account and a
    /// freshly issued session token.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(Account, AccessToken), Error> {
        if email.is_empty() {
            return Err(ValidationError::MissingField("Email is required".to_string()).into());
        }
        validate_password(password)?;

        let Some(account) = self.accounts.find_by_email(email).await? else {
            // Same work as the mismatch path below.
            let _ = password_auth::verify_password(password, &DUMMY_HASH);
            tracing::warn!(email, "login failed, no matching account");
            return Err(AuthError::InvalidCredentials.into());
        };

        if password_auth::verify_password(password, &account.password_hash).is_err() {
            tracing::warn!(email, "login failed, password mismatch");
            return Err(AuthError::InvalidCredentials.into());
        }

        if !account.is_verified() {
            tracing::warn!(email, "login blocked, email not verified");
            return Err(AuthError::VerificationRequired.into());
        }

        let token = self.token_issuer.issue(&account.id)?;
        tracing::info!(account_id = %account.id, "login succeeded");

        Ok((account, token))
    }

    /// Verify a presented session token, returning the account id it binds.
    pub fn verify_token(&self, token: &str) -> Result<crate::AccountId, Error> {
        self.token_issuer.verify(token)
    }
}
