//! Versioned schema migrations for the SQLite backend.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};

const MIGRATION_TABLE: &str = "_gatehouse_migrations";

#[async_trait]
pub trait SqliteMigration: Send + Sync {
    fn version(&self) -> i64;
    fn name(&self) -> &str;
    async fn up(&self, conn: &mut SqliteConnection) -> Result<(), sqlx::Error>;
}

/// All migrations, in order.
pub fn migrations() -> Vec<Box<dyn SqliteMigration>> {
    vec![
        Box::new(CreateAccountsTable),
        Box::new(CreateVerificationTokensTable),
    ]
}

pub struct SqliteMigrationManager {
    pool: SqlitePool,
}

impl SqliteMigrationManager {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn initialize(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            format!(
                r#"
            CREATE TABLE IF NOT EXISTS {MIGRATION_TABLE} (
                version INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                applied_at INTEGER NOT NULL DEFAULT (unixepoch())
            );"#
            )
            .as_str(),
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn is_applied(&self, version: i64) -> Result<bool, sqlx::Error> {
        let applied: bool = sqlx::query_scalar(
            format!("SELECT EXISTS(SELECT 1 FROM {MIGRATION_TABLE} WHERE version = ?)").as_str(),
        )
        .bind(version)
        .fetch_one(&self.pool)
        .await?;
        Ok(applied)
    }

    /// Apply every migration that has not run yet, each in its own
    /// transaction.
    pub async fn up(&self, migrations: &[Box<dyn SqliteMigration>]) -> Result<(), sqlx::Error> {
        self.initialize().await?;

        for migration in migrations {
            if self.is_applied(migration.version()).await? {
                continue;
            }

            let mut tx = self.pool.begin().await?;

            tracing::info!(
                "Applying migration {} ({})",
                migration.name(),
                migration.version()
            );

            migration.up(&mut tx).await?;

            sqlx::query(
                format!(
                    "INSERT INTO {MIGRATION_TABLE} (version, name, applied_at) VALUES (?, ?, ?)"
                )
                .as_str(),
            )
            .bind(migration.version())
            .bind(migration.name())
            .bind(Utc::now().timestamp())
            .execute(&mut *tx)
            .await?;

            tx.commit().await?;
        }

        Ok(())
    }
}

pub struct CreateAccountsTable;

#[async_trait]
impl SqliteMigration for CreateAccountsTable {
    fn version(&self) -> i64 {
        1
    }

    fn name(&self) -> &str {
        "CreateAccountsTable"
    }

    async fn up(&self, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS accounts (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                email_verified_at INTEGER,
                level INTEGER NOT NULL DEFAULT 0,
                experience INTEGER NOT NULL DEFAULT 0,
                currency TEXT NOT NULL DEFAULT '{}',
                collection TEXT NOT NULL DEFAULT '[]',
                created_at INTEGER NOT NULL DEFAULT (unixepoch()),
                updated_at INTEGER NOT NULL DEFAULT (unixepoch()),
                UNIQUE(email)
            );"#,
        )
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}

pub struct CreateVerificationTokensTable;

#[async_trait]
impl SqliteMigration for CreateVerificationTokensTable {
    fn version(&self) -> i64 {
        2
    }

    fn name(&self) -> &str {
        "CreateVerificationTokensTable"
    }

    async fn up(&self, conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS verification_tokens (
                token_hash TEXT PRIMARY KEY,
                account_id TEXT NOT NULL,
                used_at INTEGER,
                expires_at INTEGER NOT NULL,
                created_at INTEGER NOT NULL DEFAULT (unixepoch()),
                FOREIGN KEY (account_id) REFERENCES accounts(id) ON DELETE CASCADE
            );"#,
        )
        .execute(&mut *conn)
        .await?;
        Ok(())
    }
}
