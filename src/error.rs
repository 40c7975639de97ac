//! Error types for Biblion server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error codes exposed in JSON error bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    DbFailure = 2,
    BookNotFound = 3,
    MemberNotFound = 4,
    MemberSuspended = 5,
    BookNotAvailable = 6,
    BorrowLimitExceeded = 7,
    LoanNotFound = 8,
    AlreadyReturned = 9,
    FineNotFound = 10,
    Busy = 11,
    Duplicate = 12,
    BadValue = 13,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Book with ISBN {0} not found")]
    BookNotFound(String),

    #[error("Member with id {0} not found")]
    MemberNotFound(i32),

    #[error("Member {0} is suspended")]
    MemberSuspended(i32),

    #[error("No available copies of ISBN {0}")]
    BookNotAvailable(String),

    #[error("Borrowing limit reached ({current}/{limit})")]
    BorrowLimitExceeded { current: i64, limit: i64 },

    #[error("Borrowing log {0} not found")]
    LoanNotFound(i64),

    #[error("Borrowing log {0} is already returned")]
    AlreadyReturned(i64),

    #[error("Fine {0} not found")]
    FineNotFound(i64),

    #[error("Store conflict, operation could not complete")]
    Busy,

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl AppError {
    fn code(&self) -> ErrorCode {
        match self {
            AppError::BookNotFound(_) => ErrorCode::BookNotFound,
            AppError::MemberNotFound(_) => ErrorCode::MemberNotFound,
            AppError::MemberSuspended(_) => ErrorCode::MemberSuspended,
            AppError::BookNotAvailable(_) => ErrorCode::BookNotAvailable,
            AppError::BorrowLimitExceeded { .. } => ErrorCode::BorrowLimitExceeded,
            AppError::LoanNotFound(_) => ErrorCode::LoanNotFound,
            AppError::AlreadyReturned(_) => ErrorCode::AlreadyReturned,
            AppError::FineNotFound(_) => ErrorCode::FineNotFound,
            AppError::Busy => ErrorCode::Busy,
            AppError::Conflict(_) => ErrorCode::Duplicate,
            AppError::Validation(_) => ErrorCode::BadValue,
            AppError::Database(_) => ErrorCode::DbFailure,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let (status, message) = match &self {
            AppError::BookNotFound(_)
            | AppError::MemberNotFound(_)
            | AppError::LoanNotFound(_)
            | AppError::FineNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::MemberSuspended(_)
            | AppError::BookNotAvailable(_)
            | AppError::BorrowLimitExceeded { .. }
            | AppError::AlreadyReturned(_)
            | AppError::Conflict(_) => (StatusCode::CONFLICT, self.to_string()),
            AppError::Busy => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
