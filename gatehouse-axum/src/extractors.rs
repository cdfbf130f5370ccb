use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
};
use gatehouse::{Account, RepositoryProvider};

use crate::{error::ApiError, routes::AuthState};

fn bearer_from(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .map(|token| token.to_string())
}

/// The bearer token from the `Authorization` header, if one was presented.
///
/// Extraction never fails; handlers decide what an absent or present token
/// means. Registration, for one, refuses callers that present any token at
/// all.
pub struct BearerToken(pub Option<String>);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(BearerToken(bearer_from(parts)))
    }
}

/// The account behind a valid bearer token. Rejects requests without one.
pub struct AuthAccount(pub Account);

impl<R> FromRequestParts<AuthState<R>> for AuthAccount
where
    R: RepositoryProvider,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AuthState<R>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_from(parts).ok_or(ApiError::InvalidToken)?;

        let account_id = state.gatehouse.verify_access_token(&token)?;

        // A well-signed token for a missing account should not exist; treat
        // it as an invalid token rather than leaking store details.
        let account = state
            .gatehouse
            .get_account(&account_id)
            .await?
            .ok_or(ApiError::InvalidToken)?;

        Ok(AuthAccount(account))
    }
}
