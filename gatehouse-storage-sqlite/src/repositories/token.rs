use crate::SqliteVerificationToken;
use async_trait::async_trait;
use gatehouse_core::{
    Error, VerificationToken, crypto::hash_token, error::StorageError,
    repositories::VerificationTokenRepository,
};
use sqlx::SqlitePool;

pub struct SqliteVerificationTokenRepository {
    pool: SqlitePool,
}

impl SqliteVerificationTokenRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VerificationTokenRepository for SqliteVerificationTokenRepository {
    async fn save(&self, token: &VerificationToken) -> Result<(), Error> {
        sqlx::query(
            r#"
            INSERT INTO verification_tokens
                (token_hash, account_id, used_at, expires_at, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&token.token_hash)
        .bind(token.account_id.as_str())
        .bind(token.used_at.map(|t| t.timestamp()))
        .bind(token.expires_at.timestamp())
        .bind(token.created_at.timestamp())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        Ok(())
    }

    async fn consume(&self, token: &str) -> Result<Option<VerificationToken>, Error> {
        let token_hash = hash_token(token);
        let now = chrono::Utc::now().timestamp();

        // Marking used and matching happen in one statement, so two callers
        // racing on the same link cannot both consume it.
        let row = sqlx::query_as::<_, SqliteVerificationToken>(
            r#"
            UPDATE verification_tokens
            SET used_at = ?1
            WHERE token_hash = ?2 AND used_at IS NULL AND expires_at > ?1
            RETURNING *
            "#,
        )
        .bind(now)
        .bind(&token_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        Ok(row.map(Into::into))
    }

    async fn cleanup_expired(&self) -> Result<(), Error> {
        let now = chrono::Utc::now().timestamp();

        sqlx::query("DELETE FROM verification_tokens WHERE expires_at <= ?1")
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SqliteRepositoryProvider;
    use chrono::Duration;
    use gatehouse_core::{
        AccountId, NewAccount,
        repositories::{
            AccountRepository, AccountRepositoryProvider, RepositoryProvider,
            VerificationTokenRepositoryProvider,
        },
    };
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup() -> SqliteRepositoryProvider {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let provider = SqliteRepositoryProvider::new(pool);
        provider.migrate().await.unwrap();
        provider
    }

    async fn create_account(provider: &SqliteRepositoryProvider) -> AccountId {
        let account = provider
            .account()
            .create(
                NewAccount::builder()
                    .email("a@example.com".to_string())
                    .password_hash("hash".to_string())
                    .build()
                    .unwrap(),
            )
            .await
            .unwrap();
        account.id
    }

    #[tokio::test]
    async fn test_consume_is_single_use() {
        let provider = setup().await;
        let account_id = create_account(&provider).await;
        let repo = provider.verification_token();

        let (plaintext, token) = VerificationToken::generate(&account_id, Duration::hours(24));
        repo.save(&token).await.unwrap();

        let first = repo.consume(&plaintext).await.unwrap();
        assert_eq!(first.unwrap().account_id, account_id);

        let second = repo.consume(&plaintext).await.unwrap();
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn test_consume_rejects_expired_and_unknown() {
        let provider = setup().await;
        let account_id = create_account(&provider).await;
        let repo = provider.verification_token();

        let (plaintext, token) = VerificationToken::generate(&account_id, Duration::seconds(-1));
        repo.save(&token).await.unwrap();

        assert!(repo.consume(&plaintext).await.unwrap().is_none());
        assert!(repo.consume("never-issued").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_cleanup_expired_removes_only_expired() {
        let provider = setup().await;
        let account_id = create_account(&provider).await;
        let repo = provider.verification_token();

        let (_, expired) = VerificationToken::generate(&account_id, Duration::seconds(-1));
        let (live_plaintext, live) = VerificationToken::generate(&account_id, Duration::hours(24));
        repo.save(&expired).await.unwrap();
        repo.save(&live).await.unwrap();

        repo.cleanup_expired().await.unwrap();

        assert!(repo.consume(&live_plaintext).await.unwrap().is_some());
    }
}
