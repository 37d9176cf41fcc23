//! Error types for the TinyApp URL shortener
//!
//! Every failed precondition in the stores surfaces as an [`AppError`], which
//! converts into an HTTP status plus a JSON `{error, code}` body. A failed
//! request never takes down the server.

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use serde_json::json;
use std::fmt;

/// Application-level errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// A required form field was empty or absent
    MissingField(String),
    /// An account with this email already exists
    DuplicateEmail(String),
    /// User or link does not exist
    NotFound(String),
    /// Password hash comparison failed
    WrongPassword,
    /// Not authenticated, or authenticated but not the owner
    Forbidden(String),
    /// Session-store failure or other unexpected server-side error
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::MissingField(msg) => write!(f, "Missing field: {}", msg),
            AppError::DuplicateEmail(email) => {
                write!(f, "A user with email {} already exists", email)
            }
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::WrongPassword => write!(f, "Incorrect password"),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// Create a MissingField error naming the empty field(s)
    pub fn missing(field: impl Into<String>) -> Self {
        AppError::MissingField(field.into())
    }

    /// Create a NotFound error for a link id
    pub fn link_not_found(id: &str) -> Self {
        AppError::NotFound(format!("URL with id '{}' does not exist", id))
    }

    /// Create a NotFound error for an email with no account
    pub fn user_not_found(email: &str) -> Self {
        AppError::NotFound(format!("No user with email {} exists", email))
    }

    /// Create a Forbidden error for anonymous callers
    pub fn login_required() -> Self {
        AppError::Forbidden("Must be registered and logged in to manipulate URLs".into())
    }

    /// Create a Forbidden error for ownership violations
    pub fn not_owner() -> Self {
        AppError::Forbidden("You do not have permission to access this URL".into())
    }

    /// HTTP status this error maps to
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingField(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateEmail(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::WrongPassword => StatusCode::FORBIDDEN,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code included in the JSON body
    fn code(&self) -> &'static str {
        match self {
            AppError::MissingField(_) => "missing_field",
            AppError::DuplicateEmail(_) => "duplicate_email",
            AppError::NotFound(_) => "not_found",
            AppError::WrongPassword => "wrong_password",
            AppError::Forbidden(_) => "forbidden",
            AppError::Internal(_) => "internal_error",
        }
    }
}

/// Convert session-store failures to AppError
///
/// Session reads fall back to "anonymous" at the call sites; writes must
/// surface, otherwise a login could silently produce no session.
impl From<tower_sessions::session::Error> for AppError {
    fn from(err: tower_sessions::session::Error) -> Self {
        AppError::Internal(format!("Session error: {}", err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (
            self.status_code(),
            Json(json!({
                "error": self.to_string(),
                "code": self.code(),
            })),
        )
            .into_response()
    }
}
