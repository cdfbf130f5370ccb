//! Process-wide authentication configuration
//!
//! One [`AuthConfig`] is constructed at startup and passed by reference into
//! the token issuer and the pipelines. There is no ambient global; rotating
//! the secret means building a new config and restarting.

use chrono::Duration;

use crate::{Error, error::ConfigError};

/// Environment variable holding the token signing secret.
pub const JWT_SECRET_ENV: &str = "GATEHOUSE_JWT_SECRET";

/// Configuration for the authentication core.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Symmetric signing secret for session tokens. Held in memory only.
    pub jwt_secret: String,
    /// How long an issued session token stays valid.
    pub token_ttl: Duration,
    /// Optional `iss` claim stamped into and required from session tokens.
    pub issuer: Option<String>,
    /// How long an email verification token stays valid.
    pub verification_token_ttl: Duration,
    /// Base URL the verification link in outgoing mail points at.
    pub verify_base_url: String,
}

impl AuthConfig {
    /// Create a configuration with the given signing secret and defaults for
    /// everything else. Fails fast on an empty secret.
    pub fn new(jwt_secret: impl Into<String>) -> Result<Self, Error> {
        let jwt_secret = jwt_secret.into();
        if jwt_secret.is_empty() {
            return Err(ConfigError::Missing(format!(
                "signing secret ({JWT_SECRET_ENV}) must not be empty"
            ))
            .into());
        }

        Ok(Self {
            jwt_secret,
            token_ttl: Duration::days(30),
            issuer: None,
            verification_token_ttl: Duration::hours(24),
            verify_base_url: "http://localhost:8080".to_string(),
        })
    }

    /// Read the configuration from the environment. A missing signing secret
    /// is a startup-fatal configuration error.
    pub fn from_env() -> Result<Self, Error> {
        let secret = std::env::var(JWT_SECRET_ENV)
            .map_err(|_| ConfigError::Missing(JWT_SECRET_ENV.to_string()))?;

        let mut config = Self::new(secret)?;

        if let Ok(hours) = std::env::var("GATEHOUSE_TOKEN_TTL_HOURS") {
            let hours: i64 = hours.parse().map_err(|_| {
                ConfigError::Invalid("GATEHOUSE_TOKEN_TTL_HOURS must be an integer".to_string())
            })?;
            config.token_ttl = Duration::hours(hours);
        }

        if let Ok(issuer) = std::env::var("GATEHOUSE_TOKEN_ISSUER") {
            config.issuer = Some(issuer);
        }

        if let Ok(url) = std::env::var("GATEHOUSE_VERIFY_BASE_URL") {
            config.verify_base_url = url;
        }

        Ok(config)
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn with_verification_token_ttl(mut self, ttl: Duration) -> Self {
        self.verification_token_ttl = ttl;
        self
    }

    pub fn with_verify_base_url(mut self, url: impl Into<String>) -> Self {
        self.verify_base_url = url.into();
        self
    }

    /// Full URL for a verification link carrying the given token.
    pub fn verification_url(&self, token: &str) -> String {
        format!(
            "{}/verify-email?token={token}",
            self.verify_base_url.trim_end_matches('/')
        )
    }
}
