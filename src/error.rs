use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

/// Failures surfaced by lookups and the access recorder.
///
/// Every variant renders as `{"error": "<message>"}` so a dashboard can show
/// the message inline next to the form that triggered it.
#[derive(Debug, Display)]
pub enum AccessError {
    /// Missing field, unknown enumeration value or name mismatch.
    #[display(fmt = "{}", _0)]
    Validation(String),

    /// Unknown cédula or event id.
    #[display(fmt = "{}", _0)]
    NotFound(String),

    /// Missing, malformed or expired bearer token.
    #[display(fmt = "{}", _0)]
    Unauthorized(String),

    #[display(fmt = "{}", _0)]
    Forbidden(String),

    /// Duplicate cédula, or a person still referenced by access events.
    #[display(fmt = "{}", _0)]
    Conflict(String),

    /// Storage backend unreachable.
    #[display(fmt = "Storage unavailable: {}", _0)]
    Transport(String),

    #[display(fmt = "Database error: {}", _0)]
    Database(sqlx::Error),
}

impl std::error::Error for AccessError {}

impl AccessError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AccessError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        AccessError::NotFound(msg.into())
    }

    pub fn unauthorized(msg: impl Into<String>) -> Self {
        AccessError::Unauthorized(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        AccessError::Forbidden(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        AccessError::Conflict(msg.into())
    }

    /// MySQL reports duplicate keys and foreign key violations as SQLSTATE 23000.
    pub fn is_integrity_violation(e: &sqlx::Error) -> bool {
        match e {
            sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some("23000"),
            _ => false,
        }
    }
}

impl From<sqlx::Error> for AccessError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed => {
                AccessError::Transport(e.to_string())
            }
            other => AccessError::Database(other),
        }
    }
}

impl ResponseError for AccessError {
    fn status_code(&self) -> StatusCode {
        match self {
            AccessError::Validation(_) => StatusCode::BAD_REQUEST,
            AccessError::NotFound(_) => StatusCode::NOT_FOUND,
            AccessError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AccessError::Forbidden(_) => StatusCode::FORBIDDEN,
            AccessError::Conflict(_) => StatusCode::CONFLICT,
            AccessError::Transport(_) => StatusCode::SERVICE_UNAVAILABLE,
            AccessError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AccessError::Database(e) => {
                tracing::error!(error = %e, "Database error");
                "Something went wrong, Contact with system admin".to_string()
            }
            AccessError::Transport(e) => {
                tracing::error!(error = %e, "Storage unreachable");
                self.to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}
