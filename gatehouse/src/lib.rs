//! # Gatehouse
//!
//! Gatehouse is the account core of the Olympull backend: registration with
//! mandatory email verification, a login gate, and a stateless bearer-token
//! issuer. It owns the credential store's invariants and nothing else — HTTP
//! binding lives in `gatehouse-axum`, mail transports in `gatehouse-mailer`,
//! and persistence behind the repository traits in the storage crates.
//!
//! The [`Gatehouse`] struct is the single entry point. Construct it once at
//! startup from a repository provider, a mail collaborator, and an
//! [`AuthConfig`], then hand it (behind an `Arc`) to whatever dispatch layer
//! serves requests.
//!
//! Three properties are load-bearing and hold across every storage backend:
//!
//! - an account is only ever created after its verification email was
//!   accepted for delivery, so no account exists that cannot be verified;
//! - concurrent registrations for one email produce exactly one account, the
//!   rest observe a conflict;
//! - an unverified account can never obtain a session token.

use std::sync::Arc;

use gatehouse_core::{
    repositories::{AccountRepositoryAdapter, VerificationTokenRepositoryAdapter},
    services::{LoginService, MailerService, RegistrationService, VerificationService},
    token::TokenIssuer,
};

/// Re-export core types from gatehouse_core
///
/// These types are commonly used when working with the Gatehouse API.
pub use gatehouse_core::{
    AccessToken, Account, AccountId, AuthConfig, Error, NewAccount, RepositoryProvider,
    VerificationToken,
};

/// Re-export storage backends
#[cfg(feature = "sqlite")]
pub use gatehouse_storage_sqlite::SqliteRepositoryProvider;

#[cfg(feature = "mailer")]
pub use gatehouse_core::services::LettreMailerService;

/// The central coordinator for account registration, login, and email
/// verification.
pub struct Gatehouse<R: RepositoryProvider> {
    repositories: Arc<R>,
    token_issuer: Arc<TokenIssuer>,
    registration_service:
        RegistrationService<AccountRepositoryAdapter<R>, VerificationTokenRepositoryAdapter<R>>,
    login_service: LoginService<AccountRepositoryAdapter<R>>,
    verification_service:
        VerificationService<AccountRepositoryAdapter<R>, VerificationTokenRepositoryAdapter<R>>,
}

impl<R: RepositoryProvider> Gatehouse<R> {
    /// Wire up the pipelines against a repository provider and a mail
    /// collaborator.
    ///
    /// Fails fast on an unusable configuration (e.g. an empty signing
    /// secret); nothing is lazily initialized afterwards.
    pub fn new(
        repositories: Arc<R>,
        mailer: Arc<dyn MailerService>,
        config: AuthConfig,
    ) -> Result<Self, Error> {
        let accounts = Arc::new(AccountRepositoryAdapter::new(repositories.clone()));
        let tokens = Arc::new(VerificationTokenRepositoryAdapter::new(repositories.clone()));
        let token_issuer = Arc::new(TokenIssuer::new(&config)?);

        Ok(Self {
            repositories,
            token_issuer: token_issuer.clone(),
            registration_service: RegistrationService::new(
                accounts.clone(),
                tokens.clone(),
                mailer,
                config.clone(),
            ),
            login_service: LoginService::new(accounts.clone(), token_issuer),
            verification_service: VerificationService::new(accounts, tokens, config),
        })
    }

    /// Run storage migrations.
    pub async fn migrate(&self) -> Result<(), Error> {
        self.repositories.migrate().await
    }

    /// Check that the storage backend is reachable.
    pub async fn health_check(&self) -> Result<(), Error> {
        self.repositories.health_check().await
    }

    /// Register a new account and dispatch its verification email.
    ///
    /// `bearer_token` is whatever token the caller presented, if any;
    /// registration only serves anonymous callers. The returned account is
    /// unverified and no session token is issued for it.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        bearer_token: Option<&str>,
    ) -> Result<Account, Error> {
        self.registration_service
            .register(email, password, bearer_token)
            .await
    }

    /// Authenticate and, for a verified account, issue a session token.
    pub async fn login(&self, email: &str, password: &str) -> Result<(Account, AccessToken), Error> {
        self.login_service.login(email, password).await
    }

    /// Consume an email verification token and mark its account verified.
    pub async fn verify_email(&self, token: &str) -> Result<Account, Error> {
        self.verification_service.verify_email(token).await
    }

    /// Verify a presented session token and return the account id it binds.
    pub fn verify_access_token(&self, token: &str) -> Result<AccountId, Error> {
        self.token_issuer.verify(token)
    }

    /// Get an account by ID
    pub async fn get_account(&self, account_id: &AccountId) -> Result<Option<Account>, Error> {
        use gatehouse_core::repositories::{AccountRepository, AccountRepositoryProvider};
        self.repositories.account().find_by_id(account_id).await
    }

    /// Mark an account's email as verified without a token. Operator use.
    pub async fn set_account_verified(&self, account_id: &AccountId) -> Result<(), Error> {
        use gatehouse_core::repositories::{AccountRepository, AccountRepositoryProvider};
        self.repositories
            .account()
            .mark_email_verified(account_id)
            .await
    }

    /// Mint a fresh verification token for an account, returning the
    /// plaintext for a verification link.
    pub async fn issue_verification_token(&self, account_id: &AccountId) -> Result<String, Error> {
        self.verification_service.issue_token(account_id).await
    }

    /// Remove expired verification tokens.
    pub async fn cleanup_expired_verification_tokens(&self) -> Result<(), Error> {
        self.verification_service.cleanup_expired_tokens().await
    }
}
