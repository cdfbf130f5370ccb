use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Mail error: {0}")]
    Mail(#[from] MailError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// Wrong email or wrong password. The two cases are deliberately merged so
    /// a caller cannot probe which emails are registered.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Credentials were correct but the email has not been confirmed yet.
    #[error("Email verification required")]
    VerificationRequired,

    #[error("Email is already registered")]
    EmailTaken,

    /// Registration was called while presenting a bearer token.
    #[error("Already logged in")]
    AlreadyAuthenticated,
}

#[derive(Debug, Error)]
pub enum StorageError {
    /// A uniqueness constraint rejected the write.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// The store could not be reached or failed mid-operation. Safe to retry.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    #[error("Invalid password: {0}")]
    InvalidPassword(String),
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Invalid token: {0}")]
    Invalid(String),

    #[error("Token expired")]
    Expired,
}

#[derive(Debug, Error)]
pub enum MailError {
    /// The mail collaborator reported failure. No account is created when this
    /// happens during registration.
    #[error("Mail delivery failed: {0}")]
    Delivery(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl Error {
    /// Errors the caller can fix by changing the request.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Error::Auth(_) | Error::Validation(_) | Error::Token(_)
        )
    }

    /// Infrastructure failures that are safe to retry later.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Storage(StorageError::Unavailable(_)) | Error::Mail(MailError::Delivery(_))
        )
    }
}
