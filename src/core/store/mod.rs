//! Persistence backends behind [`TicketRepository`] and [`DirectoryRepository`].
//!
//! [`TicketRepository`]: crate::tickets::TicketRepository
//! [`DirectoryRepository`]: crate::directory::DirectoryRepository

pub mod memory;
pub mod postgres;

pub use memory::MemoryBackend;
pub use postgres::PgBackend;

use axum::{http::StatusCode, response::IntoResponse, Json};
use log::error;

use crate::drive::DriveError;

/// Reference departments present in every fresh store.
pub const DEFAULT_DEPARTMENTS: [(&str, &str); 6] = [
    ("IT", "Hardware, software, network and account access"),
    ("HR", "Payroll, benefits and personnel records"),
    ("Finance", "Expenses, invoices and purchasing"),
    ("Marketing", "Campaigns, brand assets and web content"),
    ("Sales", "CRM, quotes and customer accounts"),
    ("Operations", "Facilities, equipment and logistics"),
];

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl StoreError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Storage(_) | Self::Database(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Text safe to show to the person who made the request.
    pub fn public_message(&self) -> String {
        match self {
            Self::Validation(msg)
            | Self::NotFound(msg)
            | Self::Forbidden(msg)
            | Self::Conflict(msg) => msg.clone(),
            Self::Storage(_) => "Failed to upload the attachment".to_string(),
            Self::Database(_) | Self::Internal(_) => {
                "Something went wrong, please try again".to_string()
            }
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl IntoResponse for StoreError {
    fn into_response(self) -> axum::response::Response {
        if self.is_server_error() {
            error!("{}", self);
        }
        let status = self.status_code();
        (status, Json(serde_json::json!({ "error": self.public_message() }))).into_response()
    }
}

impl From<diesel::result::Error> for StoreError {
    fn from(e: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};
        match e {
            Error::NotFound => Self::NotFound("Record not found".to_string()),
            Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                Self::Conflict(info.message().to_string())
            }
            Error::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
                Self::Validation(format!("Referenced record does not exist: {}", info.message()))
            }
            other => Self::Database(other.to_string()),
        }
    }
}

impl From<diesel::r2d2::PoolError> for StoreError {
    fn from(e: diesel::r2d2::PoolError) -> Self {
        Self::Database(format!("connection pool: {}", e))
    }
}

impl From<DriveError> for StoreError {
    fn from(e: DriveError) -> Self {
        Self::Storage(e.to_string())
    }
}

impl From<tokio::task::JoinError> for StoreError {
    fn from(e: tokio::task::JoinError) -> Self {
        Self::Internal(format!("blocking task failed: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            StoreError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            StoreError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            StoreError::Conflict("x".into()).status_code(),
            StatusCode::CONFLICT
        );
        assert!(StoreError::Database("x".into()).is_server_error());
    }

    #[test]
    fn test_server_errors_are_sanitized() {
        let err = StoreError::Database("relation \"tickets\" does not exist".into());
        assert!(!err.public_message().contains("relation"));
        let err = StoreError::Validation("Subject is required".into());
        assert_eq!(err.public_message(), "Subject is required");
    }

    #[test]
    fn test_diesel_not_found_maps_to_not_found() {
        let err: StoreError = diesel::result::Error::NotFound.into();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
