use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use gatehouse_core::error::{AuthError, Error as CoreError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email verification required")]
    VerificationRequired,

    #[error("You're already logged in")]
    AlreadyAuthenticated,

    #[error("Email is already registered")]
    EmailTaken,

    #[error("Invalid or expired token")]
    InvalidToken,

    #[error("Email service failed, please try again later")]
    MailUnavailable(String),

    #[error("Storage service failed, please try again later")]
    StoreUnavailable(String),

    #[error("Internal server error")]
    InternalError(String),
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => ApiError::BadRequest(e.to_string()),
            CoreError::Auth(AuthError::InvalidCredentials) => ApiError::InvalidCredentials,
            CoreError::Auth(AuthError::VerificationRequired) => ApiError::VerificationRequired,
            CoreError::Auth(AuthError::AlreadyAuthenticated) => ApiError::AlreadyAuthenticated,
            CoreError::Auth(AuthError::EmailTaken) => ApiError::EmailTaken,
            CoreError::Token(_) => ApiError::InvalidToken,
            CoreError::Mail(e) => ApiError::MailUnavailable(e.to_string()),
            CoreError::Storage(e) => ApiError::StoreUnavailable(e.to_string()),
            CoreError::Config(e) => ApiError::InternalError(e.to_string()),
        }
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials | ApiError::InvalidToken => StatusCode::UNAUTHORIZED,
            ApiError::VerificationRequired | ApiError::AlreadyAuthenticated => {
                StatusCode::FORBIDDEN
            }
            ApiError::EmailTaken => StatusCode::CONFLICT,
            ApiError::MailUnavailable(_) => StatusCode::BAD_GATEWAY,
            ApiError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Infrastructure detail stays in the logs, not in the response body.
        match &self {
            ApiError::MailUnavailable(detail) => {
                tracing::error!(detail = %detail, "mail dependency failed");
            }
            ApiError::StoreUnavailable(detail) => {
                tracing::error!(detail = %detail, "storage dependency failed");
            }
            ApiError::InternalError(detail) => {
                tracing::error!(detail = %detail, "internal error");
            }
            _ => {}
        }

        let status = self.status();
        let body = Json(json!({
            "error": self.to_string(),
            "code": status.as_u16()
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use gatehouse_core::error::{MailError, StorageError, TokenError, ValidationError};

    #[test]
    fn test_status_mapping() {
        let cases: Vec<(CoreError, StatusCode)> = vec![
            (
                ValidationError::MissingField("email".into()).into(),
                StatusCode::BAD_REQUEST,
            ),
            (
                AuthError::InvalidCredentials.into(),
                StatusCode::UNAUTHORIZED,
            ),
            (
                AuthError::VerificationRequired.into(),
                StatusCode::FORBIDDEN,
            ),
            (
                AuthError::AlreadyAuthenticated.into(),
                StatusCode::FORBIDDEN,
            ),
            (AuthError::EmailTaken.into(), StatusCode::CONFLICT),
            (
                TokenError::Invalid("bad".into()).into(),
                StatusCode::UNAUTHORIZED,
            ),
            (
                MailError::Delivery("bounce".into()).into(),
                StatusCode::BAD_GATEWAY,
            ),
            (
                StorageError::Unavailable("io".into()).into(),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];

        for (core_error, expected) in cases {
            let api_error = ApiError::from(core_error);
            assert_eq!(api_error.status(), expected, "wrong status for {api_error:?}");
        }
    }

    #[test]
    fn test_infrastructure_detail_is_not_in_the_message() {
        let api_error = ApiError::from(CoreError::from(StorageError::Unavailable(
            "connection refused at 10.0.0.3:5432".into(),
        )));
        assert!(!api_error.to_string().contains("10.0.0.3"));
    }
}
