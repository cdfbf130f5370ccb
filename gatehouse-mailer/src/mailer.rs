use crate::{Email, MailerError};
use async_trait::async_trait;

/// Something that can deliver an email.
///
/// Delivery is not idempotent: a retried send is a second message in the
/// recipient's inbox, so retry policy belongs to callers, not transports.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send_email(&self, email: Email) -> Result<(), MailerError>;
}
