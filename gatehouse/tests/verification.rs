use std::sync::Arc;

use async_trait::async_trait;
use gatehouse::{AuthConfig, Error, Gatehouse, SqliteRepositoryProvider};
use gatehouse_core::services::MailerService;
use tokio::sync::Mutex;

struct RecordingMailer {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingMailer {
    fn new() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
        }
    }

    async fn last_token(&self) -> String {
        let sent = self.sent.lock().await;
        let (_, url) = sent.last().expect("no verification mail captured");
        url.split("token=").nth(1).unwrap().to_string()
    }
}

#[async_trait]
impl MailerService for RecordingMailer {
    async fn send_verification_email(&self, to: &str, verify_url: &str) -> Result<(), Error> {
        self.sent
            .lock()
            .await
            .push((to.to_string(), verify_url.to_string()));
        Ok(())
    }
}

async fn setup(mailer: Arc<RecordingMailer>) -> Gatehouse<SqliteRepositoryProvider> {
    let pool = sqlx::sqlite::SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    let repositories = Arc::new(SqliteRepositoryProvider::new(pool));

    let config = AuthConfig::new("integration_test_signing_secret")
        .unwrap()
        .with_verify_base_url("https://play.example.com");
    let gatehouse = Gatehouse::new(repositories, mailer, config).unwrap();
    gatehouse.migrate().await.unwrap();

    gatehouse
}

#[tokio::test]
async fn test_full_registration_verification_login_flow() {
    let mailer = Arc::new(RecordingMailer::new());
    let gatehouse = setup(mailer.clone()).await;

    let account = gatehouse
        .register("a@example.com", "p1", None)
        .await
        .unwrap();

    // Login is gated until the mailed link is followed.
    assert!(gatehouse.login("a@example.com", "p1").await.is_err());

    let token = mailer.last_token().await;
    let verified = gatehouse.verify_email(&token).await.unwrap();
    assert_eq!(verified.id, account.id);
    assert!(verified.is_verified());

    let (_, session_token) = gatehouse.login("a@example.com", "p1").await.unwrap();
    let bound_id = gatehouse
        .verify_access_token(session_token.as_str())
        .unwrap();
    assert_eq!(bound_id, account.id);
}

#[tokio::test]
async fn test_verification_link_is_single_use() {
    let mailer = Arc::new(RecordingMailer::new());
    let gatehouse = setup(mailer.clone()).await;

    gatehouse
        .register("a@example.com", "p1", None)
        .await
        .unwrap();

    let token = mailer.last_token().await;
    gatehouse.verify_email(&token).await.unwrap();

    let replay = gatehouse.verify_email(&token).await;
    assert!(matches!(replay, Err(Error::Token(_))));
}

#[tokio::test]
async fn test_unknown_verification_token_is_rejected() {
    let mailer = Arc::new(RecordingMailer::new());
    let gatehouse = setup(mailer).await;

    let result = gatehouse.verify_email("never-issued-token").await;
    assert!(matches!(result, Err(Error::Token(_))));
}

#[tokio::test]
async fn test_reissued_verification_token_works() {
    let mailer = Arc::new(RecordingMailer::new());
    let gatehouse = setup(mailer.clone()).await;

    let account = gatehouse
        .register("a@example.com", "p1", None)
        .await
        .unwrap();

    // A replacement token (e.g. for a lost email) verifies the same account.
    let reissued = gatehouse
        .issue_verification_token(&account.id)
        .await
        .unwrap();
    let verified = gatehouse.verify_email(&reissued).await.unwrap();
    assert!(verified.is_verified());

    // The original mailed token is still unused and remains consumable.
    let original = mailer.last_token().await;
    assert!(gatehouse.verify_email(&original).await.is_ok());
}

#[tokio::test]
async fn test_verification_url_points_at_configured_base() {
    let mailer = Arc::new(RecordingMailer::new());
    let gatehouse = setup(mailer.clone()).await;

    gatehouse
        .register("a@example.com", "p1", None)
        .await
        .unwrap();

    let sent = mailer.sent.lock().await;
    let (_, url) = &sent[0];
    assert!(url.starts_with("https://play.example.com/verify-email?token="));
}
