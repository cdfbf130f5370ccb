use crate::SqliteAccount;
use async_trait::async_trait;
use gatehouse_core::{
    Account, AccountId, Error, NewAccount, error::StorageError,
    repositories::AccountRepository,
};
use sqlx::SqlitePool;

pub struct SqliteAccountRepository {
    pool: SqlitePool,
}

impl SqliteAccountRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn storage_error(e: sqlx::Error) -> Error {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StorageError::Conflict("email already exists".to_string()).into()
        }
        _ => StorageError::Unavailable(e.to_string()).into(),
    }
}

#[async_trait]
impl AccountRepository for SqliteAccountRepository {
    async fn create(&self, account: NewAccount) -> Result<Account, Error> {
        let now = chrono::Utc::now().timestamp();
        let currency = serde_json::to_string(&Account::starting_currency())
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        let row = sqlx::query_as::<_, SqliteAccount>(
            r#"
            INSERT INTO accounts
                (id, email, password_hash, email_verified_at, level, experience,
                 currency, collection, created_at, updated_at)
            VALUES (?1, ?2, ?3, NULL, 0, 0, ?4, '[]', ?5, ?5)
            RETURNING *
            "#,
        )
        .bind(account.id.as_str())
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&currency)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(storage_error)?;

        row.try_into()
    }

    async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, Error> {
        let row = sqlx::query_as::<_, SqliteAccount>("SELECT * FROM accounts WHERE id = ?1")
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        row.map(Account::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, Error> {
        let row = sqlx::query_as::<_, SqliteAccount>("SELECT * FROM accounts WHERE email = ?1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        row.map(Account::try_from).transpose()
    }

    async fn mark_email_verified(&self, account_id: &AccountId) -> Result<(), Error> {
        let now = chrono::Utc::now().timestamp();

        sqlx::query("UPDATE accounts SET email_verified_at = ?1, updated_at = ?1 WHERE id = ?2")
            .bind(now)
            .bind(account_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SqliteRepositoryProvider;
    use gatehouse_core::repositories::{AccountRepositoryProvider, RepositoryProvider};
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup() -> SqliteRepositoryProvider {
        // One connection so the in-memory database is shared.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let provider = SqliteRepositoryProvider::new(pool);
        provider.migrate().await.unwrap();
        provider
    }

    fn new_account(email: &str) -> NewAccount {
        NewAccount::builder()
            .email(email.to_string())
            .password_hash("argon2-hash".to_string())
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_find_round_trip() {
        let provider = setup().await;
        let repo = provider.account();

        let created = repo.create(new_account("a@example.com")).await.unwrap();
        assert_eq!(created.email, "a@example.com");
        assert!(!created.is_verified());
        assert_eq!(created.level, 0);
        assert_eq!(created.experience, 0);
        assert_eq!(created.currency, Account::starting_currency());
        assert!(created.collection.is_empty());

        let by_email = repo.find_by_email("a@example.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, created.id);

        let by_id = repo.find_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(by_id.email, created.email);

        assert!(repo.find_by_email("nobody@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_a_conflict() {
        let provider = setup().await;
        let repo = provider.account();

        repo.create(new_account("a@example.com")).await.unwrap();
        let result = repo.create(new_account("a@example.com")).await;

        match result.unwrap_err() {
            Error::Storage(StorageError::Conflict(_)) => {}
            e => panic!("Expected Conflict, got {e:?}"),
        }
    }

    #[tokio::test]
    async fn test_mark_email_verified() {
        let provider = setup().await;
        let repo = provider.account();

        let account = repo.create(new_account("a@example.com")).await.unwrap();
        repo.mark_email_verified(&account.id).await.unwrap();

        let account = repo.find_by_id(&account.id).await.unwrap().unwrap();
        assert!(account.is_verified());
    }
}
