//! Core functionality for the gatehouse account service
//!
//! This crate holds the pieces every other gatehouse crate builds on: the
//! [`Account`] record and its invariants, the error taxonomy, the repository
//! traits storage backends implement, the registration/login/verification
//! pipelines, and the [`TokenIssuer`] that mints bearer tokens.
//!
//! Storage backends live in their own crates (e.g. `gatehouse-storage-sqlite`)
//! and plug in through [`repositories::RepositoryProvider`].

pub mod account;
pub mod config;
pub mod crypto;
pub mod error;
pub mod id;
pub mod repositories;
pub mod services;
pub mod token;
pub mod validation;
pub mod verification;

pub use account::{Account, AccountId, NewAccount};
pub use config::AuthConfig;
pub use error::Error;
pub use repositories::RepositoryProvider;
pub use token::{AccessToken, TokenIssuer};
pub use verification::VerificationToken;
