//! Service layer for business logic
//!
//! Concrete service implementations for the registration, login, and email
//! verification pipelines. Services are per-request and stateless; the only
//! shared state they touch is whatever sits behind the repository traits.

pub mod login;
pub mod mailer;
pub mod registration;
pub mod verification;

pub use login::LoginService;
pub use mailer::MailerService;
pub use registration::RegistrationService;
pub use verification::VerificationService;

#[cfg(feature = "mailer")]
pub use mailer::LettreMailerService;
