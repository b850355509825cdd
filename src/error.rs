//! Error taxonomy shared by every storage backend and the service layer.
//!
//! Repositories return [`NoteError`] unchanged up the stack; only the HTTP
//! layer turns it into a response (see the [`IntoResponse`] impl below).

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Errors produced by note storage and orchestration.
#[derive(Debug, thiserror::Error)]
pub enum NoteError {
    #[error("note {id} not found")]
    NotFound { id: i64 },

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("corrupted note data: {0}")]
    CorruptedData(String),

    #[error("operation cancelled")]
    Cancelled,

    /// The unit of work failed and its transaction has already been rolled back.
    #[error("transaction rolled back: {0}")]
    TransactionFailed(#[source] Box<NoteError>),
}

impl NoteError {
    pub fn not_found(id: i64) -> Self {
        Self::NotFound { id }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::StoreUnavailable(message.into())
    }

    pub fn corrupted(message: impl Into<String>) -> Self {
        Self::CorruptedData(message.into())
    }

    /// Returns the innermost error, looking through [`NoteError::TransactionFailed`].
    pub fn root(&self) -> &NoteError {
        match self {
            Self::TransactionFailed(source) => source.root(),
            other => other,
        }
    }

    /// Returns true if the innermost error is [`NoteError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), Self::NotFound { .. })
    }

    fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::InvalidInput(_) => "invalid_input",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::CorruptedData(_) => "corrupted_data",
            Self::Cancelled => "cancelled",
            Self::TransactionFailed(_) => "transaction_failed",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::CorruptedData(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Cancelled => StatusCode::REQUEST_TIMEOUT,
            Self::TransactionFailed(source) => source.status(),
        }
    }
}

impl From<sqlx::Error> for NoteError {
    fn from(e: sqlx::Error) -> Self {
        Self::StoreUnavailable(format!("database error: {e}"))
    }
}

impl From<redis::RedisError> for NoteError {
    fn from(e: redis::RedisError) -> Self {
        Self::StoreUnavailable(format!("redis error: {e}"))
    }
}

impl From<validator::ValidationErrors> for NoteError {
    fn from(e: validator::ValidationErrors) -> Self {
        let fields = e
            .field_errors()
            .keys()
            .map(|field| field.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        Self::InvalidInput(format!("required fields are empty: {fields}"))
    }
}

impl From<JsonRejection> for NoteError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidInput(rejection.body_text())
    }
}

impl From<PathRejection> for NoteError {
    fn from(rejection: PathRejection) -> Self {
        Self::InvalidInput(rejection.body_text())
    }
}

/// Result type used across repositories and services.
pub type NoteResult<T> = Result<T, NoteError>;

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

#[derive(Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
}

impl IntoResponse for NoteError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            error: ErrorInfo {
                code: self.code(),
                message: self.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}
