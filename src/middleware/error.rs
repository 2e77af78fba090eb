//! Error response formatting
//!
//! Every failed API call answers with the same JSON shape: a machine code,
//! a message that is safe to show, the request id and whether a retry can
//! help.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::payments::error::PaymentError;

/// Standardized error response structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Machine-readable error code
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Request ID for debugging and support
    pub request_id: Option<String>,

    /// RFC 3339 timestamp of the error
    pub timestamp: String,

    /// Whether the client should retry the request
    pub retryable: bool,
}

impl ErrorResponse {
    pub fn from_payment_error(error: &PaymentError, request_id: Option<String>) -> Self {
        Self {
            error: error.error_code().to_string(),
            message: error.user_message(),
            request_id,
            timestamp: Utc::now().to_rfc3339(),
            retryable: error.is_retryable(),
        }
    }
}

/// A `PaymentError` tied to the request that produced it.
#[derive(Debug)]
pub struct ApiError {
    pub error: PaymentError,
    pub request_id: Option<String>,
}

impl ApiError {
    pub fn new(error: PaymentError, request_id: Option<String>) -> Self {
        Self { error, request_id }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status_code = StatusCode::from_u16(self.error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status_code.is_server_error() {
            tracing::error!(
                error = %self.error,
                request_id = ?self.request_id,
                status = %status_code.as_u16(),
                "Server error occurred"
            );
        } else {
            tracing::warn!(
                error = %self.error,
                request_id = ?self.request_id,
                status = %status_code.as_u16(),
                "Client error occurred"
            );
        }

        let body = ErrorResponse::from_payment_error(&self.error, self.request_id);
        (status_code, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_from_payment_error() {
        let response = ErrorResponse::from_payment_error(
            &PaymentError::ClientNotFound {
                invoice_id: "12".to_string(),
            },
            Some("req_123".to_string()),
        );
        assert_eq!(response.error, "CLIENT_NOT_FOUND");
        assert_eq!(response.request_id, Some("req_123".to_string()));
        assert!(!response.retryable);
    }

    #[test]
    fn test_api_error_into_response() {
        let response = ApiError::new(PaymentError::SignatureMismatch, None).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = ApiError::new(
            PaymentError::RemoteServiceError {
                message: "timeout".to_string(),
            },
            None,
        )
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }
}
