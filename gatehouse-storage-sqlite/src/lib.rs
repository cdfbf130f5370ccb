//! SQLite storage backend for the gatehouse account service
//!
//! Implements the core repository traits over a `sqlx::SqlitePool`. The
//! `accounts` table carries a unique index on `email`, which is what makes
//! concurrent registration races safe: the losing insert surfaces as a
//! constraint violation, never as a second row.

pub mod migrations;
pub mod repositories;

pub use repositories::{SqliteAccountRepository, SqliteVerificationTokenRepository};

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gatehouse_core::{
    Account, AccountId, Error, VerificationToken,
    error::StorageError,
    repositories::{
        AccountRepositoryProvider, RepositoryProvider, VerificationTokenRepositoryProvider,
    },
};
use sqlx::SqlitePool;

use migrations::SqliteMigrationManager;

/// Repository provider implementation for SQLite.
pub struct SqliteRepositoryProvider {
    pool: SqlitePool,
    account: Arc<SqliteAccountRepository>,
    verification_token: Arc<SqliteVerificationTokenRepository>,
}

impl SqliteRepositoryProvider {
    pub fn new(pool: SqlitePool) -> Self {
        let account = Arc::new(SqliteAccountRepository::new(pool.clone()));
        let verification_token = Arc::new(SqliteVerificationTokenRepository::new(pool.clone()));

        Self {
            pool,
            account,
            verification_token,
        }
    }
}

impl AccountRepositoryProvider for SqliteRepositoryProvider {
    type AccountRepo = SqliteAccountRepository;

    fn account(&self) -> &Self::AccountRepo {
        &self.account
    }
}

impl VerificationTokenRepositoryProvider for SqliteRepositoryProvider {
    type TokenRepo = SqliteVerificationTokenRepository;

    fn verification_token(&self) -> &Self::TokenRepo {
        &self.verification_token
    }
}

#[async_trait]
impl RepositoryProvider for SqliteRepositoryProvider {
    async fn migrate(&self) -> Result<(), Error> {
        let manager = SqliteMigrationManager::new(self.pool.clone());
        manager
            .up(&migrations::migrations())
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()).into())
    }

    async fn health_check(&self) -> Result<(), Error> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(())
    }
}

/// Row type for the `accounts` table. Timestamps are unix seconds, the
/// progression maps are JSON columns.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct SqliteAccount {
    id: String,
    email: String,
    password_hash: String,
    email_verified_at: Option<i64>,
    level: i64,
    experience: i64,
    currency: String,
    collection: String,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<SqliteAccount> for Account {
    type Error = Error;

    fn try_from(row: SqliteAccount) -> Result<Self, Error> {
        let currency = serde_json::from_str(&row.currency)
            .map_err(|e| StorageError::Unavailable(format!("corrupt currency column: {e}")))?;
        let collection = serde_json::from_str(&row.collection)
            .map_err(|e| StorageError::Unavailable(format!("corrupt collection column: {e}")))?;

        Ok(Account {
            id: AccountId::new(&row.id),
            email: row.email,
            password_hash: row.password_hash,
            email_verified_at: row.email_verified_at.map(datetime_from),
            level: row.level,
            experience: row.experience,
            currency,
            collection,
            created_at: datetime_from(row.created_at),
            updated_at: datetime_from(row.updated_at),
        })
    }
}

/// Row type for the `verification_tokens` table. Only the hash is stored.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct SqliteVerificationToken {
    token_hash: String,
    account_id: String,
    used_at: Option<i64>,
    expires_at: i64,
    created_at: i64,
}

impl From<SqliteVerificationToken> for VerificationToken {
    fn from(row: SqliteVerificationToken) -> Self {
        VerificationToken {
            account_id: AccountId::new(&row.account_id),
            token_hash: row.token_hash,
            used_at: row.used_at.map(datetime_from),
            expires_at: datetime_from(row.expires_at),
            created_at: datetime_from(row.created_at),
        }
    }
}

// Out-of-range seconds cannot come from our own writes; epoch is fine there.
fn datetime_from(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}
