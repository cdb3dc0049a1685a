//! Order lifecycle errors and their HTTP mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use crate::auth::AuthError;
use crate::models::error::ErrorResponse;
use crate::services::otp::OtpError;
use crate::services::order_store::StoreError;

/// Outcomes a lifecycle transition can fail with. Each maps to its own
/// status code; none collapse into a generic failure.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order not found")]
    NotFound,
    #[error("{0}")]
    Forbidden(String),
    #[error("Invalid OTP")]
    InvalidCode,
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Internal(String),
}

impl From<StoreError> for OrderError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(_) => OrderError::NotFound,
            StoreError::VersionConflict { .. } => {
                OrderError::Conflict("Order was modified concurrently, reload and retry".to_string())
            }
            other => OrderError::Internal(other.to_string()),
        }
    }
}

impl From<OtpError> for OrderError {
    fn from(e: OtpError) -> Self {
        OrderError::Internal(e.to_string())
    }
}

/// Everything a handler can reject a request with
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Unauthorized(#[from] AuthError),
    #[error(transparent)]
    Order(#[from] OrderError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Order(OrderError::NotFound) => StatusCode::NOT_FOUND,
            ApiError::Order(OrderError::Forbidden(_)) => StatusCode::FORBIDDEN,
            ApiError::Order(OrderError::InvalidCode) => StatusCode::BAD_REQUEST,
            ApiError::Order(OrderError::Validation(_)) => StatusCode::BAD_REQUEST,
            ApiError::Order(OrderError::Conflict(_)) => StatusCode::CONFLICT,
            ApiError::Order(OrderError::Internal(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Order(OrderError::NotFound) => "NOT_FOUND",
            ApiError::Order(OrderError::Forbidden(_)) => "FORBIDDEN",
            ApiError::Order(OrderError::InvalidCode) => "INVALID_OTP",
            ApiError::Order(OrderError::Validation(_)) => "VALIDATION_ERROR",
            ApiError::Order(OrderError::Conflict(_)) => "CONFLICT",
            ApiError::Order(OrderError::Internal(_)) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Order(OrderError::Internal(detail)) => {
                error!(error = %detail, "Internal error while handling order request");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (
            status,
            Json(ErrorResponse {
                error: message,
                code: Some(self.code().to_string()),
            }),
        )
            .into_response()
    }
}
