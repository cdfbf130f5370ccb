//! Repository traits for the data access layer
//!
//! Services talk to storage exclusively through these traits. Each data
//! domain gets a `*Repository` trait, each backend exposes them through the
//! matching `*RepositoryProvider`, and [`RepositoryProvider`] combines the
//! providers with lifecycle methods so a backend plugs in as one value.

pub mod account;
pub mod adapter;
pub mod token;

pub use account::AccountRepository;
pub use adapter::{AccountRepositoryAdapter, VerificationTokenRepositoryAdapter};
pub use token::VerificationTokenRepository;

use async_trait::async_trait;

use crate::Error;

/// Provider trait for account repository access.
pub trait AccountRepositoryProvider: Send + Sync + 'static {
    /// The account repository implementation type
    type AccountRepo: AccountRepository;

    /// Get the account repository
    fn account(&self) -> &Self::AccountRepo;
}

/// Provider trait for verification token repository access.
pub trait VerificationTokenRepositoryProvider: Send + Sync + 'static {
    /// The verification token repository implementation type
    type TokenRepo: VerificationTokenRepository;

    /// Get the verification token repository
    fn verification_token(&self) -> &Self::TokenRepo;
}

/// Provider trait that storage backends implement to supply all repositories,
/// plus migrations and health checking.
#[async_trait]
pub trait RepositoryProvider:
    AccountRepositoryProvider + VerificationTokenRepositoryProvider
{
    /// Run migrations for all repositories
    async fn migrate(&self) -> Result<(), Error>;

    /// Health check for all repositories
    async fn health_check(&self) -> Result<(), Error>;
}
