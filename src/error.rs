//! Error types for the storage core and the HTTP surface.
//!
//! [`StoreError`] is the closed set of outcomes every store operation can
//! fail with. Callers match on the variant; they never inspect driver codes.
//! [`AppError`] is the HTTP rendering of those outcomes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::utils::db_error::is_lock_conflict;

/// Failure kinds surfaced by the link, tag, user and click stores.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Slug does not match the format rule. Raised before any I/O.
    #[error("invalid slug '{slug}': {reason}")]
    InvalidSlug { slug: String, reason: &'static str },

    /// Slug collides with a system route. Raised before any I/O.
    #[error("slug '{0}' is reserved")]
    ReservedSlug(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// Tag name slugifies to an empty string.
    #[error("tag name '{0}' has no usable characters")]
    InvalidTag(String),

    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("slug '{0}' is already taken")]
    SlugTaken(String),

    #[error("user {user_id} already owns link {link_id}")]
    DuplicateOwner { link_id: Uuid, user_id: Uuid },

    #[error("user {user_id} is the primary owner of link {link_id} and cannot be removed")]
    PrimaryOwnerImmutable { link_id: Uuid, user_id: Uuid },

    /// Connectivity loss, pool exhaustion or timeout. The caller decides
    /// whether to retry; the store never does.
    #[error("storage temporarily unavailable: {0}")]
    Transient(#[source] sqlx::Error),

    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl StoreError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// True for failures a caller may reasonably retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }

    /// True for input rejected before touching the database.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidSlug { .. } | Self::ReservedSlug(_) | Self::InvalidUrl(_) | Self::InvalidTag(_)
        )
    }

    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::SlugTaken(_) | Self::DuplicateOwner { .. } | Self::PrimaryOwnerImmutable { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => Self::Transient(e),
            other if is_lock_conflict(&other) => Self::Transient(other),
            other => Self::Database(other),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

#[derive(Serialize)]
struct ErrorInfo {
    code: &'static str,
    message: String,
    details: Value,
}

/// Error returned by HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    Validation { message: String, details: Value },
    NotFound { message: String, details: Value },
    Conflict { message: String, details: Value },
    Unavailable { message: String, details: Value },
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }
    pub fn unavailable(message: impl Into<String>, details: Value) -> Self {
        Self::Unavailable {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        let message = e.to_string();
        match e {
            StoreError::InvalidSlug { slug, .. } => {
                AppError::bad_request(message, json!({ "slug": slug }))
            }
            StoreError::ReservedSlug(slug) => AppError::bad_request(message, json!({ "slug": slug })),
            StoreError::InvalidUrl(_) | StoreError::InvalidTag(_) => {
                AppError::bad_request(message, json!({}))
            }
            StoreError::NotFound { entity, key } => {
                AppError::not_found(message, json!({ "entity": entity, "key": key }))
            }
            StoreError::SlugTaken(slug) => AppError::conflict(message, json!({ "slug": slug })),
            StoreError::DuplicateOwner { link_id, user_id }
            | StoreError::PrimaryOwnerImmutable { link_id, user_id } => AppError::conflict(
                message,
                json!({ "link_id": link_id, "user_id": user_id }),
            ),
            StoreError::Transient(err) => {
                tracing::warn!(error = %err, "Transient storage failure");
                AppError::unavailable("Storage temporarily unavailable", json!({}))
            }
            StoreError::Database(err) => {
                tracing::error!(error = %err, "Database error");
                AppError::internal("Database error", json!({}))
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            AppError::Validation { message, details } => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                message,
                details,
            ),
            AppError::NotFound { message, details } => {
                (StatusCode::NOT_FOUND, "not_found", message, details)
            }
            AppError::Conflict { message, details } => {
                (StatusCode::CONFLICT, "conflict", message, details)
            }
            AppError::Unavailable { message, details } => (
                StatusCode::SERVICE_UNAVAILABLE,
                "unavailable",
                message,
                details,
            ),
            AppError::Internal { message, details } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                message,
                details,
            ),
        };

        let body = ErrorBody {
            error: ErrorInfo {
                code,
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_timeout_is_transient() {
        let err = StoreError::from(sqlx::Error::PoolTimedOut);
        assert!(err.is_retryable());
        assert!(matches!(err, StoreError::Transient(_)));
    }

    #[test]
    fn test_row_not_found_is_not_retryable() {
        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(!err.is_retryable());
        assert!(matches!(err, StoreError::Database(_)));
    }

    #[test]
    fn test_error_classification() {
        assert!(StoreError::ReservedSlug("admin".into()).is_validation());
        assert!(StoreError::SlugTaken("go".into()).is_conflict());
        assert!(StoreError::not_found("link", "x").is_not_found());
        assert!(
            StoreError::PrimaryOwnerImmutable {
                link_id: Uuid::new_v4(),
                user_id: Uuid::new_v4(),
            }
            .is_conflict()
        );
    }

    #[test]
    fn test_store_error_maps_to_http_status() {
        let cases = [
            (StoreError::ReservedSlug("auth".into()), StatusCode::BAD_REQUEST),
            (StoreError::not_found("link", "abc"), StatusCode::NOT_FOUND),
            (StoreError::SlugTaken("abc".into()), StatusCode::CONFLICT),
            (
                StoreError::from(sqlx::Error::PoolClosed),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                StoreError::from(sqlx::Error::RowNotFound),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            let response = AppError::from(err).into_response();
            assert_eq!(response.status(), status);
        }
    }
}
