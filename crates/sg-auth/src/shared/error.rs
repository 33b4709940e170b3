//! Error Types
//!
//! One taxonomy for the whole service. Handlers return `AuthError` and the
//! `IntoResponse` impl at the bottom owns the HTTP mapping, so a status code
//! is never chosen at a call site.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;
use utoipa::ToSchema;

use crate::account::AccountProvider;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{message}")]
    Validation { message: String },

    #[error("Email already exists.")]
    DuplicateEmail,

    #[error("This account uses {provider} Sign-in. Please login with {provider}.")]
    WrongProvider { provider: AccountProvider },

    #[error("{message}")]
    Unauthorized { message: String },

    #[error("Invalid identity token: {message}")]
    InvalidToken { message: String },

    #[error("Identity provider unavailable: {message}")]
    Upstream { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bson::ser::Error),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AuthError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken {
            message: message.into(),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;

/// Error response body
#[derive(Debug, serde::Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            AuthError::Validation { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AuthError::DuplicateEmail => (StatusCode::BAD_REQUEST, "DUPLICATE_EMAIL"),
            AuthError::WrongProvider { .. } => (StatusCode::BAD_REQUEST, "WRONG_PROVIDER"),
            AuthError::Unauthorized { .. } => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            // Token verification runs against an upstream provider; its
            // failures are server-side, not a client 401.
            AuthError::InvalidToken { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "INVALID_TOKEN"),
            AuthError::Upstream { .. } => (StatusCode::INTERNAL_SERVER_ERROR, "UPSTREAM_ERROR"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, error_type, "request failed");
        }

        // Storage and internal failures keep their details out of the body.
        let message = match &self {
            AuthError::Database(_)
            | AuthError::Serialization(_)
            | AuthError::Configuration { .. }
            | AuthError::Internal { .. } => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}
