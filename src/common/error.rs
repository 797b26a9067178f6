// Error handling types for the auth flow

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

/// Request-path error taxonomy
///
/// Every failure a login or session request can hit maps to exactly one of
/// these kinds. Startup-only failures live in
/// [`crate::common::config::ConfigError`] instead and never reach a handler.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Provider or session token expiry has passed
    #[error("token has expired")]
    TokenExpired,
    /// Signature or format invalid, or the token's subject is unknown
    #[error("token is invalid")]
    InvalidToken,
    /// Unexpected error contacting the identity issuer
    #[error("token verification failed: {0}")]
    VerificationFailed(String),
    /// Identity-verifier capability has no key material and cannot fetch any
    #[error("identity verifier is not initialized")]
    AuthNotInitialized,
    /// A required claim (subject id, email) is missing from the payload
    #[error("invalid token payload: {0}")]
    InvalidTokenPayload(String),
    /// Backing store read/write failed
    #[error("user directory operation failed: {0}")]
    Directory(String),
    /// Third-party API returned non-success or was unreachable
    #[error("external provider request failed: {0}")]
    ExternalProvider(String),
    /// Anything unexpected; detail is logged, never sent to the caller
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error_code: String,
    pub message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> axum::response::Response {
        let (status, message, code) = match self {
            AuthError::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                "token has expired, please sign in again".to_string(),
                "TOKEN_EXPIRED",
            ),
            AuthError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "token is invalid, please sign in again".to_string(),
                "INVALID_TOKEN",
            ),
            AuthError::VerificationFailed(detail) => {
                warn!(detail = %detail, "Identity token verification failed");
                (
                    StatusCode::UNAUTHORIZED,
                    "token verification failed, please try again".to_string(),
                    "VERIFICATION_FAILED",
                )
            }
            AuthError::AuthNotInitialized => {
                error!("Identity verifier not initialized - check the service account key and upstream connectivity");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "identity verification is not configured on this server".to_string(),
                    "AUTH_NOT_INITIALIZED",
                )
            }
            AuthError::InvalidTokenPayload(msg) => {
                (StatusCode::BAD_REQUEST, msg, "INVALID_TOKEN_PAYLOAD")
            }
            AuthError::Directory(detail) => {
                error!(error = %detail, "User directory operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "user directory operation failed".to_string(),
                    "DIRECTORY_ERROR",
                )
            }
            AuthError::ExternalProvider(msg) => (StatusCode::BAD_GATEWAY, msg, "EXTERNAL_PROVIDER_ERROR"),
            AuthError::Internal(detail) => {
                error!(error = %detail, "Unexpected internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                    "INTERNAL_ERROR",
                )
            }
        };

        let error_response = ErrorResponse {
            error_code: code.to_string(),
            message,
        };

        (status, Json(error_response)).into_response()
    }
}
