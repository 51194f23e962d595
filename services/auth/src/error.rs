//! Error type for the authentication service

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use market::error::MarketError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    /// Logged, never shown to the client
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn invalid_token() -> Self {
        AuthError::Unauthorized("Invalid or expired token".to_string())
    }
}

impl From<MarketError> for AuthError {
    fn from(e: MarketError) -> Self {
        match e {
            MarketError::InvalidInput(msg) => AuthError::BadRequest(msg),
            // A token for an account that no longer exists is just a bad token
            MarketError::Unauthorized(msg) | MarketError::NotFound(msg) => {
                AuthError::Unauthorized(msg)
            }
            MarketError::Forbidden(msg) => AuthError::Forbidden(msg),
            MarketError::Conflict(msg) => AuthError::Conflict(msg),
            other => AuthError::Internal(other.to_string()),
        }
    }
}

impl From<JsonRejection> for AuthError {
    fn from(rejection: JsonRejection) -> Self {
        AuthError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AuthError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AuthError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            AuthError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            AuthError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AuthError::Internal(detail) => {
                error!("Request failed: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub type AuthResult<T> = Result<T, AuthError>;
