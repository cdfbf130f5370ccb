use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    Account, AccountId, Error, NewAccount, VerificationToken,
    repositories::{
        AccountRepository, AccountRepositoryProvider, RepositoryProvider,
        VerificationTokenRepository, VerificationTokenRepositoryProvider,
    },
};

/// Adapter that wraps a [`RepositoryProvider`] and implements
/// [`AccountRepository`], so services stay generic over a single provider
/// type.
pub struct AccountRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> AccountRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> AccountRepository for AccountRepositoryAdapter<R> {
    async fn create(&self, account: NewAccount) -> Result<Account, Error> {
        self.provider.account().create(account).await
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, Error> {
        self.provider.account().find_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, Error> {
        self.provider.account().find_by_email(email).await
    }

    async fn mark_email_verified(&self, account_id: &AccountId) -> Result<(), Error> {
        self.provider.account().mark_email_verified(account_id).await
    }
}

/// Adapter that wraps a [`RepositoryProvider`] and implements
/// [`VerificationTokenRepository`].
pub struct VerificationTokenRepositoryAdapter<R: RepositoryProvider> {
    provider: Arc<R>,
}

impl<R: RepositoryProvider> VerificationTokenRepositoryAdapter<R> {
    pub fn new(provider: Arc<R>) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl<R: RepositoryProvider> VerificationTokenRepository
    for VerificationTokenRepositoryAdapter<R>
{
    async fn save(&self, token: &VerificationToken) -> Result<(), Error> {
        self.provider.verification_token().save(token).await
    }

    async fn consume(&self, token: &str) -> Result<Option<VerificationToken>, Error> {
        self.provider.verification_token().consume(token).await
    }

    async fn cleanup_expired(&self) -> Result<(), Error> {
        self.provider.verification_token().cleanup_expired().await
    }
}
