//! Email delivery for the gatehouse account service
//!
//! A deliberately small surface: an [`Email`] value, a [`Mailer`] trait, and
//! two transports (async SMTP for production, file output for development).
//! Delivery either succeeds or returns a [`MailerError`]; callers decide what
//! a failure means — the registration pipeline, for one, treats it as fatal
//! for the whole request.

pub mod config;
pub mod email;
pub mod error;
pub mod mailer;
pub mod transports;

pub use config::{MailerConfig, TransportConfig};
pub use email::{Email, EmailBuilder};
pub use error::MailerError;
pub use mailer::Mailer;
pub use transports::{FileTransport, SmtpTransport, TlsConfig};
