use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use gatehouse::{Gatehouse, RepositoryProvider};

use crate::{
    error::Result,
    extractors::{AuthAccount, BearerToken},
    types::*,
};

pub struct AuthState<R: RepositoryProvider> {
    pub gatehouse: Arc<Gatehouse<R>>,
}

impl<R: RepositoryProvider> Clone for AuthState<R> {
    fn clone(&self) -> Self {
        Self {
            gatehouse: self.gatehouse.clone(),
        }
    }
}

/// Build the account router: registration, login, email verification, and a
/// health probe.
pub fn create_router<R>(gatehouse: Arc<Gatehouse<R>>) -> Router
where
    R: RepositoryProvider + 'static,
{
    let state = AuthState { gatehouse };

    Router::new()
        .route("/health", get(health_handler))
        .route("/register", post(register_handler))
        .route("/login", post(login_handler))
        .route("/verify-email", get(verify_email_handler))
        .route("/account", get(account_handler))
        .with_state(state)
}

async fn health_handler<R>(State(state): State<AuthState<R>>) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    state.gatehouse.health_check().await?;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

async fn register_handler<R>(
    State(state): State<AuthState<R>>,
    BearerToken(bearer): BearerToken,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    state
        .gatehouse
        .register(&payload.email, &payload.password, bearer.as_deref())
        .await?;

    // No token: the account is unverified, so registration does not log the
    // caller in.
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Registered successfully, please check your inbox to verify your account"
                .to_string(),
        }),
    ))
}

async fn login_handler<R>(
    State(state): State<AuthState<R>>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    let (_, token) = state
        .gatehouse
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(TokenResponse {
        token: token.token,
        expires_at: token.expires_at,
    }))
}

async fn account_handler(AuthAccount(account): AuthAccount) -> Result<impl IntoResponse> {
    Ok(Json(AccountResponse { account }))
}

async fn verify_email_handler<R>(
    State(state): State<AuthState<R>>,
    Query(query): Query<VerifyEmailQuery>,
) -> Result<impl IntoResponse>
where
    R: RepositoryProvider,
{
    state
        .gatehouse
        .verify_email(&query.token)
        .await?;

    Ok(Json(MessageResponse {
        message: "Email verified, you can now log in".to_string(),
    }))
}
