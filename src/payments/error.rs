use thiserror::Error;

pub type PaymentResult<T> = Result<T, PaymentError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PaymentError {
    #[error("Gateway configuration invalid: {field} is required")]
    ConfigurationInvalid { field: String },

    #[error("Order reference too long: {length} characters (max {max})")]
    OrderReferenceTooLong { length: usize, max: usize },

    #[error("Remote service error: {message}")]
    RemoteServiceError { message: String },

    #[error("Notification signature mismatch")]
    SignatureMismatch,

    #[error("Malformed order reference: {order_id:?}")]
    MalformedOrderReference { order_id: String },

    #[error("Unknown transaction status: status={transaction_status}, payment_type={payment_type}")]
    UnknownTransactionStatus {
        transaction_status: String,
        payment_type: String,
    },

    #[error("No client owns invoice {invoice_id}")]
    ClientNotFound { invoice_id: String },

    #[error("Operation not supported by this gateway: {operation}")]
    Unsupported { operation: String },

    #[error("Validation error: {message}")]
    ValidationError {
        message: String,
        field: Option<String>,
    },

    #[error("Storage error: {message}")]
    StorageError { message: String },
}

impl PaymentError {
    pub fn unsupported(operation: &str) -> Self {
        PaymentError::Unsupported {
            operation: operation.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>, field: &str) -> Self {
        PaymentError::ValidationError {
            message: message.into(),
            field: Some(field.to_string()),
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            PaymentError::ConfigurationInvalid { .. } => false,
            PaymentError::OrderReferenceTooLong { .. } => false,
            PaymentError::RemoteServiceError { .. } => true,
            PaymentError::SignatureMismatch => false,
            PaymentError::MalformedOrderReference { .. } => false,
            PaymentError::UnknownTransactionStatus { .. } => false,
            PaymentError::ClientNotFound { .. } => false,
            PaymentError::Unsupported { .. } => false,
            PaymentError::ValidationError { .. } => false,
            PaymentError::StorageError { .. } => true,
        }
    }

    pub fn http_status_code(&self) -> u16 {
        match self {
            PaymentError::ConfigurationInvalid { .. } => 500,
            PaymentError::OrderReferenceTooLong { .. } => 400,
            PaymentError::RemoteServiceError { .. } => 502,
            PaymentError::SignatureMismatch => 403,
            PaymentError::MalformedOrderReference { .. } => 400,
            PaymentError::UnknownTransactionStatus { .. } => 422,
            PaymentError::ClientNotFound { .. } => 404,
            PaymentError::Unsupported { .. } => 501,
            PaymentError::ValidationError { .. } => 400,
            PaymentError::StorageError { .. } => 503,
        }
    }

    /// Machine-readable code used in API error bodies.
    pub fn error_code(&self) -> &'static str {
        match self {
            PaymentError::ConfigurationInvalid { .. } => "CONFIGURATION_INVALID",
            PaymentError::OrderReferenceTooLong { .. } => "ORDER_REFERENCE_TOO_LONG",
            PaymentError::RemoteServiceError { .. } => "REMOTE_SERVICE_ERROR",
            PaymentError::SignatureMismatch => "SIGNATURE_MISMATCH",
            PaymentError::MalformedOrderReference { .. } => "MALFORMED_ORDER_REFERENCE",
            PaymentError::UnknownTransactionStatus { .. } => "UNKNOWN_TRANSACTION_STATUS",
            PaymentError::ClientNotFound { .. } => "CLIENT_NOT_FOUND",
            PaymentError::Unsupported { .. } => "UNSUPPORTED",
            PaymentError::ValidationError { .. } => "VALIDATION_ERROR",
            PaymentError::StorageError { .. } => "STORAGE_ERROR",
        }
    }

    pub fn user_message(&self) -> String {
        match self {
            PaymentError::ConfigurationInvalid { field } => {
                format!("Midtrans gateway is not configured: {} is missing", field)
            }
            PaymentError::OrderReferenceTooLong { .. } => {
                "Too many invoices selected for a single Midtrans payment".to_string()
            }
            PaymentError::RemoteServiceError { .. } => {
                "Midtrans is temporarily unavailable. Please try again".to_string()
            }
            PaymentError::SignatureMismatch => "Invalid notification signature".to_string(),
            PaymentError::MalformedOrderReference { .. } => {
                "Order reference does not identify any invoice".to_string()
            }
            PaymentError::UnknownTransactionStatus {
                transaction_status, ..
            } => format!("Unrecognized transaction status '{}'", transaction_status),
            PaymentError::ClientNotFound { invoice_id } => {
                format!("Invoice '{}' does not belong to any client", invoice_id)
            }
            PaymentError::Unsupported { operation } => {
                format!("{} is not supported by the Midtrans gateway", operation)
            }
            PaymentError::ValidationError { message, .. } => message.clone(),
            PaymentError::StorageError { .. } => {
                "Service temporarily unavailable. Please try again later".to_string()
            }
        }
    }
}
