//! Session token issuing and verification
//!
//! The issuer mints compact bearer tokens binding an account id, signed with
//! HMAC-SHA512 under the single process-wide secret from [`AuthConfig`].
//! Tokens are stateless: nothing is stored, nothing can be revoked
//! individually. Rotating the secret invalidates every outstanding token at
//! once; that is the only kill switch.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{
    AccountId, AuthConfig, Error,
    error::{ConfigError, TokenError},
};

/// Claims carried by a session token.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject - account ID
    pub sub: String,
    /// Issued at, seconds since epoch
    pub iat: i64,
    /// Expiration time, seconds since epoch
    pub exp: i64,
    /// Issuer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// A signed session token as handed to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn as_str(&self) -> &str {
        &self.token
    }

    pub fn into_inner(self) -> String {
        self.token
    }
}

impl std::fmt::Display for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.token)
    }
}

/// Mints and validates bearer tokens proving "this caller is account X".
///
/// The verifier is pinned to HS512: a token signed with any other algorithm
/// fails validation regardless of its payload, which closes the
/// algorithm-confusion class of attacks.
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    token_ttl: Duration,
    issuer: Option<String>,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Result<Self, Error> {
        if config.jwt_secret.is_empty() {
            return Err(ConfigError::Missing("signing secret must not be empty".to_string()).into());
        }

        let mut validation = Validation::new(Algorithm::HS512);
        if let Some(issuer) = &config.issuer {
            validation.set_issuer(&[issuer]);
        }

        Ok(Self {
            encoding_key: EncodingKey::from_secret(config.jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.jwt_secret.as_bytes()),
            validation,
            token_ttl: config.token_ttl,
            issuer: config.issuer.clone(),
        })
    }

    /// Issue a token for the given account id, expiring after the configured
    /// TTL.
    pub fn issue(&self, account_id: &AccountId) -> Result<AccessToken, Error> {
        let now = Utc::now();
        let expires_at = now + self.token_ttl;

        let claims = AccessClaims {
            sub: account_id.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            iss: self.issuer.clone(),
        };

        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &self.encoding_key,
        )
        .map_err(|e| TokenError::Invalid(format!("Failed to encode token: {e}")))?;

        Ok(AccessToken { token, expires_at })
    }

    /// Verify a token and return the account id it asserts.
    ///
    /// Rejects tokens that are malformed, expired, signed under a different
    /// secret, or signed with any algorithm other than HS512.
    pub fn verify(&self, token: &str) -> Result<AccountId, Error> {
        let data = decode::<AccessClaims>(token, &self.decoding_key, &self.validation).map_err(
            |e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid(format!("Token validation failed: {e}")),
            },
        )?;

        Ok(AccountId::new(&data.claims.sub))
    }
}
