//! Mail dispatch collaborator
//!
//! The pipelines only need one capability from the outside mail world:
//! deliver a verification email and report success or failure. Delivery is
//! not idempotent and is never retried here; the registration pipeline aborts
//! instead.

use async_trait::async_trait;

use crate::Error;

#[async_trait]
pub trait MailerService: Send + Sync {
    /// Send the account verification email. `verify_url` carries the
    /// single-use token.
    async fn send_verification_email(&self, to: &str, verify_url: &str) -> Result<(), Error>;
}

#[cfg(feature = "mailer")]
pub use self::lettre_impl::LettreMailerService;

#[cfg(feature = "mailer")]
mod lettre_impl {
    use super::MailerService;
    use crate::{Error, error::MailError};
    use async_trait::async_trait;
    use gatehouse_mailer::{Email, Mailer, MailerConfig};

    /// [`MailerService`] backed by the `gatehouse-mailer` transports.
    pub struct LettreMailerService {
        transport: Box<dyn Mailer>,
        config: MailerConfig,
    }

    impl LettreMailerService {
        pub fn new(config: MailerConfig) -> Result<Self, Error> {
            let transport = config
                .build_transport()
                .map_err(|e| MailError::Delivery(e.to_string()))?;

            Ok(Self { transport, config })
        }

        pub fn from_env() -> Result<Self, Error> {
            let config =
                MailerConfig::from_env().map_err(|e| MailError::Delivery(e.to_string()))?;
            Self::new(config)
        }
    }

    #[async_trait]
    impl MailerService for LettreMailerService {
        async fn send_verification_email(
            &self,
            to: &str,
            verify_url: &str,
        ) -> Result<(), Error> {
            let email = Email::builder()
                .from(self.config.get_from_address())
                .to(to.to_string())
                .subject("Account Verification".to_string())
                .text_body(format!(
                    "An account was registered with this email address. \
                     If this was you, confirm the account here: {verify_url}\n\n\
                     If you did not register, you can ignore this message."
                ))
                .build()
                .map_err(|e| MailError::Delivery(e.to_string()))?;

            self.transport
                .send_email(email)
                .await
                .map_err(|e| MailError::Delivery(e.to_string()))?;

            Ok(())
        }
    }
}
