//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use checkout::CheckoutError;
use store::StoreError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Checkout/issuance error.
    Checkout(CheckoutError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Checkout(err) => checkout_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn checkout_error_to_response(err: CheckoutError) -> (StatusCode, String) {
    match &err {
        CheckoutError::OrderNotFound(_)
        | CheckoutError::VariantNotFound(_)
        | CheckoutError::CourseNotFound(_)
        | CheckoutError::EventNotFound(_)
        | CheckoutError::OwnPackageNotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        // Inventory conflicts, validation failures, wrong order type, and
        // invalid/expired package states all surface as client errors with
        // a message naming the unsatisfiable unit.
        CheckoutError::InvalidOrderType { .. }
        | CheckoutError::OrderNotPaid { .. }
        | CheckoutError::Domain(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        CheckoutError::Store(StoreError::Duplicate(_)) => {
            (StatusCode::CONFLICT, err.to_string())
        }
        CheckoutError::Store(_) => {
            tracing::error!(error = %err, "store failure, transaction aborted");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal server error".to_string(),
            )
        }
    }
}

impl From<CheckoutError> for ApiError {
    fn from(err: CheckoutError) -> Self {
        ApiError::Checkout(err)
    }
}
