//! Registration pipeline
//!
//! Order matters here. The verification email goes out before the account row
//! is written: an account must never exist for an email that cannot be
//! reached, so the durable write is conditional on the external side effect
//! having completed. Everything before the insert is side-effect-free for the
//! store, which is what makes a failed registration safe to retry.

use std::sync::Arc;

use crate::{
    Account, AccountId, AuthConfig, Error, NewAccount, VerificationToken,
    error::{AuthError, StorageError},
    repositories::{AccountRepository, VerificationTokenRepository},
    services::MailerService,
    validation::{validate_email, validate_password},
};

/// Service for account registration
pub struct RegistrationService<R: AccountRepository, T: VerificationTokenRepository> {
    accounts: Arc<R>,
    tokens: Arc<T>,
    mailer: Arc<dyn MailerService>,
    config: AuthConfig,
}

impl<R: AccountRepository, T: VerificationTokenRepository> RegistrationService<R, T> {
    pub fn new(
        accounts: Arc<R>,
        tokens: Arc<T>,
        mailer: Arc<dyn MailerService>,
        config: AuthConfig,
    ) -> Self {
        Self {
            accounts,
            tokens,
            mailer,
            config,
        }
    }

    /// Register a new account.
    ///
    /// `bearer_token` is whatever credential the caller presented;
    /// registration is for anonymous callers only. Success returns the stored
    /// account — unverified, and deliberately without a session token.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        bearer_token: Option<&str>,
    ) -> Result<Account, Error> {
        let email = email.trim();
        validate_email(email)?;
        validate_password(password)?;

        if bearer_token.is_some() {
            tracing::warn!(email, "registration attempted with a bearer token present");
            return Err(AuthError::AlreadyAuthenticated.into());
        }

        if self.accounts.find_by_email(email).await?.is_some() {
            tracing::info!(email, "registration rejected, email already registered");
            return Err(AuthError::EmailTaken.into());
        }

        // The id and the verification token exist before the account does so
        // the mailed link can reference both without any store write yet.
        let account_id = AccountId::new_random();
        let (plaintext, verification_token) =
            VerificationToken::generate(&account_id, self.config.verification_token_ttl);

        let verify_url = self.config.verification_url(&plaintext);
        if let Err(e) = self.mailer.send_verification_email(email, &verify_url).await {
            tracing::error!(email, error = %e, "verification email failed, aborting registration");
            return Err(e);
        }

        let new_account = NewAccount::builder()
            .id(account_id)
            .email(email.to_string())
            .password_hash(Self::hash_password(password))
            .build()?;

        let account = match self.accounts.create(new_account).await {
            Ok(account) => account,
            // Another registration for the same email won the race between
            // the lookup above and this insert.
            Err(Error::Storage(StorageError::Conflict(_))) => {
                tracing::info!(email, "registration lost insert race, email already registered");
                return Err(AuthError::EmailTaken.into());
            }
            Err(e) => return Err(e),
        };

        self.tokens.save(&verification_token).await?;

        tracing::info!(email, account_id = %account.id, "account registered");
        Ok(account)
    }

    /// Hash a password using argon2 with a per-hash random salt.
    fn hash_password(password: &str) -> String {
        use password_auth::generate_hash;
        generate_hash(password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MailError, ValidationError};
    use crate::repositories::{AccountRepository, VerificationTokenRepository};
    use crate::services::MailerService;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    // Mock implementations for testing

    #[derive(Default)]
    struct MockAccountRepository {
        accounts: Arc<Mutex<HashMap<String, Account>>>,
    }

    impl MockAccountRepository {
        fn account_from(new_account: NewAccount) -> Account {
            let now = Utc::now();
            Account {
                id: new_account.id,
                email: new_account.email,
                password_hash: new_account.password_hash,
                email_verified_at: None,
                level: 0,
                experience: 0,
                currency: Account::starting_currency(),
                collection: Default::default(),
                created_at: now,
                updated_at: now,
            }
        }
    }

    #[async_trait]
    impl AccountRepository for MockAccountRepository {
        async fn create(&self, new_account: NewAccount) -> Result<Account, Error> {
            let mut accounts = self.accounts.lock().await;
            if accounts.contains_key(&new_account.email) {
                return Err(StorageError::Conflict("email already exists".into()).into());
            }
            let account = Self::account_from(new_account);
            accounts.insert(account.email.clone(), account.clone());
            Ok(account)
        }

        async fn find_by_id(&self, id: &AccountId) -> Result<Option<Account>, Error> {
            Ok(self
                .accounts
                .lock()
                .await
                .values()
                .find(|a| &a.id == id)
                .cloned())
        }

        async fn find_by_email(&self, email: &str) -> Result<Option<Account>, Error> {
            Ok(self.accounts.lock().await.get(email).cloned())
        }

        async fn mark_email_verified(&self, account_id: &AccountId) -> Result<(), Error> {
            let mut accounts = self.accounts.lock().await;
            for account in accounts.values_mut() {
                if &account.id == account_id {
                    account.email_verified_at = Some(Utc::now());
                }
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct MockTokenRepository {
        tokens: Arc<Mutex<Vec<VerificationToken>>>,
    }

    #[async_trait]
    impl VerificationTokenRepository for MockTokenRepository {
        async fn save(&self, token: &VerificationToken) -> Result<(), Error> {
            self.tokens.lock().await.push(token.clone());
            Ok(())
        }

        async fn consume(&self, token: &str) -> Result<Option<VerificationToken>, Error> {
            let mut tokens = self.tokens.lock().await;
            for stored in tokens.iter_mut() {
                if stored.matches(token) && stored.is_usable() {
                    stored.used_at = Some(Utc::now());
                    return Ok(Some(stored.clone()));
                }
            }
            Ok(None)
        }

        async fn cleanup_expired(&self) -> Result<(), Error> {
            let now = Utc::now();
            self.tokens.lock().await.retain(|t| t.expires_at > now);
            Ok(())
        }
    }

    struct MockMailer {
        sent: Arc<Mutex<Vec<(String, String)>>>,
        fail: bool,
    }

    impl MockMailer {
        fn new() -> Self {
            Self {
                sent: Arc::new(Mutex::new(Vec::new())),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                sent: Arc::new(Mutex::new(Vec::new())),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl MailerService for MockMailer {
        async fn send_verification_email(
            &self,
            to: &str,
            verify_url: &str,
        ) -> Result<(), Error> {
            if self.fail {
                return Err(MailError::Delivery("mail service rejected message".into()).into());
            }
            self.sent
                .lock()
                .await
                .push((to.to_string(), verify_url.to_string()));
            Ok(())
        }
    }

    fn test_config() -> AuthConfig {
        AuthConfig::new("test_secret_key_for_registration_tests").unwrap()
    }

    fn service(
        accounts: Arc<MockAccountRepository>,
        tokens: Arc<MockTokenRepository>,
        mailer: Arc<MockMailer>,
    ) -> RegistrationService<MockAccountRepository, MockTokenRepository> {
        RegistrationService::new(accounts, tokens, mailer, test_config())
    }

    #[tokio::test]
    async fn test_register_then_register_again_is_email_taken() {
        let accounts = Arc::new(MockAccountRepository::default());
        let tokens = Arc::new(MockTokenRepository::default());
        let mailer = Arc::new(MockMailer::new());
        let service = service(accounts.clone(), tokens.clone(), mailer.clone());

        let first = service.register("a@example.com", "p1", None).await;
        assert!(first.is_ok());

        let second = service.register("a@example.com", "p2", None).await;
        match second.unwrap_err() {
            Error::Auth(AuthError::EmailTaken) => {}
            e => panic!("Expected EmailTaken, got {e:?}"),
        }

        // Exactly one account exists afterwards.
        assert_eq!(accounts.accounts.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_register_with_failing_mailer_creates_nothing() {
        let accounts = Arc::new(MockAccountRepository::default());
        let tokens = Arc::new(MockTokenRepository::default());
        let mailer = Arc::new(MockMailer::failing());
        let service = service(accounts.clone(), tokens.clone(), mailer);

        let result = service.register("a@example.com", "p1", None).await;
        match result.unwrap_err() {
            Error::Mail(MailError::Delivery(_)) => {}
            e => panic!("Expected MailDelivery error, got {e:?}"),
        }

        assert!(accounts.accounts.lock().await.is_empty());
        assert!(tokens.tokens.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_register_with_bearer_token_is_rejected() {
        let accounts = Arc::new(MockAccountRepository::default());
        let tokens = Arc::new(MockTokenRepository::default());
        let mailer = Arc::new(MockMailer::new());
        let service = service(accounts.clone(), tokens, mailer.clone());

        let result = service
            .register("a@example.com", "p1", Some("some.bearer.token"))
            .await;
        match result.unwrap_err() {
            Error::Auth(AuthError::AlreadyAuthenticated) => {}
            e => panic!("Expected AlreadyAuthenticated, got {e:?}"),
        }

        // Guard fires before any side effect.
        assert!(accounts.accounts.lock().await.is_empty());
        assert!(mailer.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_register_trims_email() {
        let accounts = Arc::new(MockAccountRepository::default());
        let tokens = Arc::new(MockTokenRepository::default());
        let mailer = Arc::new(MockMailer::new());
        let service = service(accounts.clone(), tokens, mailer.clone());

        let account = service.register(" a@x.com ", "p1", None).await.unwrap();
        assert_eq!(account.email, "a@x.com");
        assert!(!account.is_verified());

        let sent = mailer.sent.lock().await;
        assert_eq!(sent[0].0, "a@x.com");
    }

    #[tokio::test]
    async fn test_register_rejects_missing_fields() {
        let accounts = Arc::new(MockAccountRepository::default());
        let tokens = Arc::new(MockTokenRepository::default());
        let mailer = Arc::new(MockMailer::new());
        let service = service(accounts, tokens, mailer.clone());

        for (email, password) in [("", "p1"), ("a@example.com", ""), ("", "")] {
            let result = service.register(email, password, None).await;
            match result.unwrap_err() {
                Error::Validation(ValidationError::MissingField(_)) => {}
                e => panic!("Expected MissingField for {email:?}/{password:?}, got {e:?}"),
            }
        }

        assert!(mailer.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_register_stores_hash_not_password() {
        let accounts = Arc::new(MockAccountRepository::default());
        let tokens = Arc::new(MockTokenRepository::default());
        let mailer = Arc::new(MockMailer::new());
        let service = service(accounts.clone(), tokens, mailer);

        let account = service
            .register("a@example.com", "hunter2hunter2", None)
            .await
            .unwrap();

        assert_ne!(account.password_hash, "hunter2hunter2");
        assert!(
            password_auth::verify_password("hunter2hunter2", &account.password_hash).is_ok()
        );
    }

    #[tokio::test]
    async fn test_register_hashes_are_salted() {
        let accounts = Arc::new(MockAccountRepository::default());
        let tokens = Arc::new(MockTokenRepository::default());
        let mailer = Arc::new(MockMailer::new());
        let service = service(accounts.clone(), tokens, mailer);

        let a = service
            .register("a@example.com", "same-password", None)
            .await
            .unwrap();
        let b = service
            .register("b@example.com", "same-password", None)
            .await
            .unwrap();

        // Same password, different salt, different hash.
        assert_ne!(a.password_hash, b.password_hash);
    }

    #[tokio::test]
    async fn test_register_saves_consumable_verification_token() {
        let accounts = Arc::new(MockAccountRepository::default());
        let tokens = Arc::new(MockTokenRepository::default());
        let mailer = Arc::new(MockMailer::new());
        let service = service(accounts.clone(), tokens.clone(), mailer.clone());

        let account = service.register("a@example.com", "p1", None).await.unwrap();

        // The mailed link carries the plaintext token.
        let sent = mailer.sent.lock().await;
        let url = &sent[0].1;
        let plaintext = url.split("token=").nth(1).unwrap();

        let consumed = tokens.consume(plaintext).await.unwrap();
        assert_eq!(consumed.unwrap().account_id, account.id);
    }

    #[tokio::test]
    async fn test_insert_race_surfaces_as_email_taken() {
        // A repository whose lookup misses but whose insert conflicts, which
        // is exactly what a lost registration race looks like.
        struct RacingAccountRepository;

        #[async_trait]
        impl AccountRepository for RacingAccountRepository {
            async fn create(&self, _new_account: NewAccount) -> Result<Account, Error> {
                Err(StorageError::Conflict("email already exists".into()).into())
            }

            async fn find_by_id(&self, _id: &AccountId) -> Result<Option<Account>, Error> {
                Ok(None)
            }

            async fn find_by_email(&self, _email: &str) -> Result<Option<Account>, Error> {
                Ok(None)
            }

            async fn mark_email_verified(&self, _account_id: &AccountId) -> Result<(), Error> {
                Ok(())
            }
        }

        let service = RegistrationService::new(
            Arc::new(RacingAccountRepository),
            Arc::new(MockTokenRepository::default()),
            Arc::new(MockMailer::new()),
            test_config(),
        );

        let result = service.register("a@example.com", "p1", None).await;
        match result.unwrap_err() {
            Error::Auth(AuthError::EmailTaken) => {}
            e => panic!("Expected EmailTaken, got {e:?}"),
        }
    }
}
