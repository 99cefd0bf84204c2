use thiserror::Error;

use shared_models::error::AppError;

/// Messages the clinic backend uses when a token has expired or was revoked,
/// whether it answers with a 401 or with `success: false`.
pub const SESSION_EXPIRED_MESSAGES: &[&str] = &[
    "Not authorized. Please login again.",
    "Token expired or invalid.",
];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("Session expired or unauthorized: {0}")]
    Unauthorized(String),

    #[error("Clinic backend unreachable: {0}")]
    Network(String),

    #[error("Clinic backend error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Request rejected by clinic backend: {0}")]
    Rejected(String),

    #[error("Unexpected response from clinic backend: {0}")]
    Decode(String),

    #[error("Clinic backend is not configured")]
    NotConfigured,
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else {
            BackendError::Network(err.to_string())
        }
    }
}

impl From<BackendError> for AppError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Unauthorized(msg) => AppError::Auth(msg),
            BackendError::Rejected(msg) => AppError::BadRequest(msg),
            BackendError::Server { status: 404, message } => AppError::NotFound(message),
            BackendError::NotConfigured => AppError::Internal(err.to_string()),
            other => AppError::ExternalService(other.to_string()),
        }
    }
}
