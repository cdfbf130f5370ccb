use crate::{Account, AccountId, Error, NewAccount};
use async_trait::async_trait;

/// Repository for account data access
///
/// Email lookups are exact-match and case-sensitive; the store compares the
/// trimmed address byte for byte. Implementations must enforce email
/// uniqueness atomically at insert time — the pipelines' own check-then-insert
/// sequence is not atomic across concurrent callers, so a race must surface
/// as [`StorageError::Conflict`](crate::error::StorageError::Conflict), never
/// as a second account.
#[async_trait]
pub trait AccountRepository: Send + Sync + 'static {
    /// Create a new account. Fails with a conflict if the email is taken.
    async fn create(&self, account: NewAccount) -> Result<Account, Error>;

    /// Find an account by ID
    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, Error>;

    /// Find an account by email. Not-found is a valid outcome, not an error.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, Error>;

    /// Mark an account's email as verified
    async fn mark_email_verified(&self, account_id: &AccountId) -> Result<(), Error>;
}
