//! Error types for the Circulate server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

/// Application error codes exposed on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    NotAuthorized = 2,
    NoSuchData = 3,
    ItemNotAvailable = 4,
    Duplicate = 5,
    MaxBorrowsReached = 6,
    PenaltyBlocked = 7,
    BadState = 8,
    Busy = 9,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{entity} with id {key} not found")]
    NotFound { entity: &'static str, key: i64 },

    #[error("{entity} already exists: {detail}")]
    AlreadyExists { entity: &'static str, detail: String },

    #[error("loan limit reached ({current}/{max})")]
    LoanLimitExceeded { current: u32, max: u32 },

    #[error("outstanding penalties of {total} exceed the allowed ceiling of {ceiling}")]
    PenaltyBlocked { total: Decimal, ceiling: Decimal },

    /// Borrow refused for lack of copies. A pending reservation was created
    /// (or reused) as a side effect and its id rides along.
    #[error("{message}")]
    BookUnavailable { message: String, reservation_id: i64 },

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("item {item_id} is locked by another operation, retry later")]
    Contention { item_id: i64 },

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
    /// Set when a failed borrow left a reservation behind
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation_id: Option<i64>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut reservation = None;

        let (status, code, message) = match &self {
            AppError::NotFound { .. } => {
                (StatusCode::NOT_FOUND, ErrorCode::NoSuchData, self.to_string())
            }
            AppError::AlreadyExists { .. } => {
                (StatusCode::CONFLICT, ErrorCode::Duplicate, self.to_string())
            }
            AppError::LoanLimitExceeded { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::MaxBorrowsReached,
                self.to_string(),
            ),
            AppError::PenaltyBlocked { .. } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::PenaltyBlocked,
                self.to_string(),
            ),
            AppError::BookUnavailable {
                message,
                reservation_id,
            } => {
                reservation = Some(*reservation_id);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    ErrorCode::ItemNotAvailable,
                    message.clone(),
                )
            }
            AppError::AccessDenied(msg) => {
                (StatusCode::FORBIDDEN, ErrorCode::NotAuthorized, msg.clone())
            }
            AppError::InvalidState(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, ErrorCode::BadState, msg.clone())
            }
            AppError::Contention { .. } => {
                (StatusCode::CONFLICT, ErrorCode::Busy, self.to_string())
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorCode::Failure,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
            reservation_id: reservation,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
