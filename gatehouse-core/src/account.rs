//! Account records and identity
//!
//! The account is the record the credential store owns. The core account
//! struct is defined as follows:
//!
//! | Field               | Type                   | Description                                          |
//! | ------------------- | ---------------------- | ---------------------------------------------------- |
//! | `id`                | `AccountId`            | Opaque unique identifier, assigned at creation.      |
//! | `email`             | `String`               | Trimmed, unique across all accounts.                 |
//! | `password_hash`     | `String`               | Argon2 hash of the password. Never the plaintext.    |
//! | `email_verified_at` | `Option<DateTime>`     | When the email was confirmed. `None` until then.     |
//! | `level`             | `i64`                  | Progression counter, starts at 0.                    |
//! | `experience`        | `i64`                  | Progression counter, starts at 0.                    |
//! | `currency`          | `BTreeMap<String,i64>` | Currency-kind to balance, starts all-zero.           |
//! | `collection`        | `BTreeSet<String>`     | Owned item identifiers, starts empty.                |
//!
//! Accounts are created once by the registration pipeline, flipped to
//! verified by the verification pipeline, and mutated by gameplay systems
//! outside this crate. Nothing in this crate deletes them.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    error::ValidationError,
    id::{generate_prefixed_id, validate_prefixed_id},
};

/// A unique, stable identifier for a specific account.
///
/// Treat this value as opaque; the prefix exists for log readability only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: &str) -> Self {
        AccountId(id.to_string())
    }

    pub fn new_random() -> Self {
        AccountId(generate_prefixed_id("acct"))
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Validate that this ID has the correct format for an account ID.
    pub fn is_valid(&self) -> bool {
        validate_prefixed_id(&self.0, "acct")
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new_random()
    }
}

impl From<String> for AccountId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AccountId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted account record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,

    pub email: String,

    /// One-way keyed hash of the password. Present and non-empty for every
    /// account that exists. Excluded from serialized output.
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// Set exactly once, by the email verification pipeline.
    pub email_verified_at: Option<DateTime<Utc>>,

    pub level: i64,

    pub experience: i64,

    pub currency: BTreeMap<String, i64>,

    pub collection: BTreeSet<String>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Check whether the account's email has been confirmed. Unverified
    /// accounts never obtain a session token.
    pub fn is_verified(&self) -> bool {
        self.email_verified_at.is_some()
    }

    /// Balances a freshly registered account starts with.
    pub fn starting_currency() -> BTreeMap<String, i64> {
        BTreeMap::from([("gems".to_string(), 0)])
    }
}

/// Insert record for a new account.
///
/// The id is generated by the caller (defaulting to a fresh random one) so
/// pipelines can reference the account before the durable write happens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    pub id: AccountId,
    pub email: String,
    pub password_hash: String,
}

impl NewAccount {
    pub fn builder() -> NewAccountBuilder {
        NewAccountBuilder::default()
    }
}

#[derive(Default)]
pub struct NewAccountBuilder {
    id: Option<AccountId>,
    email: Option<String>,
    password_hash: Option<String>,
}

impl NewAccountBuilder {
    pub fn id(mut self, id: AccountId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn email(mut self, email: String) -> Self {
        self.email = Some(email);
        self
    }

    pub fn password_hash(mut self, password_hash: String) -> Self {
        self.password_hash = Some(password_hash);
        self
    }

    pub fn build(self) -> Result<NewAccount, Error> {
        Ok(NewAccount {
            id: self.id.unwrap_or_default(),
            email: self.email.ok_or(ValidationError::MissingField(
                "Email is required".to_string(),
            ))?,
            password_hash: self.password_hash.ok_or(ValidationError::MissingField(
                "Password hash is required".to_string(),
            ))?,
        })
    }
}
