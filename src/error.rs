use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// The message shown when a visitor lacks the role a page requires.
pub const ACCESS_DENIED_MESSAGE: &str = "You don't have permission to access this page.";
/// How long the access denied overlay stays up before it dismisses itself.
pub const ACCESS_DENIED_DISMISS_MS: u64 = 5000;

/// A validation failure attached to one form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// The application's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A Redis error.
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// A record could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Sign-up with an email that is already registered.
    #[error("An account with this email already exists")]
    DuplicateEmail,

    /// No account matches the submitted email and password.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The stored session could not be parsed.
    #[error("Stored session is corrupt")]
    CorruptSession,

    /// The stored session is past its expiry.
    #[error("Session expired")]
    Expired,

    /// One or more form fields failed validation.
    #[error("Validation failed on {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    /// The request needs a valid session.
    #[error("Authentication required")]
    Unauthenticated,

    /// The session's role does not grant access.
    #[error("Access denied")]
    AccessDenied,

    /// The external identity provider failed.
    #[error("Identity provider error: {0}")]
    IdentityProvider(String),

    /// An internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

impl From<sonic_rs::Error> for AppError {
    fn from(e: sonic_rs::Error) -> Self {
        AppError::Serialization(e.to_string())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<FieldError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dismiss_after_ms: Option<u64>,
}

impl ErrorBody {
    fn plain(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: None,
            fields: Vec::new(),
            dismiss_after_ms: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::Redis(ref e) => {
                tracing::error!("Redis error: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorBody::plain("Storage error"))
            }

            AppError::Serialization(ref msg) => {
                tracing::error!("Serialization error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::plain("An error occurred. Please try again."),
                )
            }

            AppError::DuplicateEmail => {
                tracing::warn!("Sign-up rejected: duplicate email");
                (
                    StatusCode::CONFLICT,
                    ErrorBody::plain(
                        "An account with this email already exists. Please sign in instead.",
                    ),
                )
            }

            AppError::InvalidCredentials => {
                tracing::warn!("Sign-in rejected: invalid credentials");
                (
                    StatusCode::UNAUTHORIZED,
                    ErrorBody::plain("Invalid email or password. Please check your credentials."),
                )
            }

            AppError::CorruptSession | AppError::Expired | AppError::Unauthenticated => {
                tracing::debug!("Unauthenticated request");
                (StatusCode::UNAUTHORIZED, ErrorBody::plain("Authentication required"))
            }

            AppError::Validation(fields) => {
                tracing::debug!("Validation failed on {} field(s)", fields.len());
                let mut body = ErrorBody::plain("Validation failed");
                body.fields = fields;
                (StatusCode::BAD_REQUEST, body)
            }

            AppError::AccessDenied => {
                tracing::warn!("Access denied");
                let mut body = ErrorBody::plain("Access Denied");
                body.message = Some(ACCESS_DENIED_MESSAGE.to_string());
                body.dismiss_after_ms = Some(ACCESS_DENIED_DISMISS_MS);
                (StatusCode::FORBIDDEN, body)
            }

            AppError::IdentityProvider(ref msg) => {
                tracing::error!("Identity provider error: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorBody::plain("Google sign in failed. Please try again."),
                )
            }

            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::plain("Internal server error"),
                )
            }
        };

        let body = sonic_rs::to_string(&body)
            .unwrap_or_else(|_| r#"{"error":"Internal server error"}"#.to_string());

        (status, [(http::header::CONTENT_TYPE, "application/json")], body).into_response()
    }
}
