use crate::payments::error::PaymentResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Resolves which client owns an invoice. Read-only.
#[async_trait]
pub trait InvoiceLookup: Send + Sync {
    async fn find_client_id(&self, invoice_id: &str) -> PaymentResult<Option<String>>;
}

/// Receives one audit record per gateway exchange.
#[async_trait]
pub trait GatewayLogSink: Send + Sync {
    async fn record(&self, entry: GatewayLogEntry) -> PaymentResult<()>;
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LogDirection {
    /// Data sent to the gateway
    Input,
    /// Data received from the gateway
    Output,
}

impl LogDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogDirection::Input => "input",
            LogDirection::Output => "output",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GatewayLogEntry {
    pub request_id: Option<String>,
    /// Identity of the triggering request (usually its URI)
    pub url: String,
    pub direction: LogDirection,
    pub data: JsonValue,
    pub success: bool,
    pub logged_at: DateTime<Utc>,
}

impl GatewayLogEntry {
    pub fn new(
        request: &RequestContext,
        direction: LogDirection,
        data: JsonValue,
        success: bool,
    ) -> Self {
        Self {
            request_id: request.request_id.clone(),
            url: request.url.clone(),
            direction,
            data,
            success,
            logged_at: Utc::now(),
        }
    }
}

/// Who triggered a gateway operation, as far as the host can tell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    pub request_id: Option<String>,
    pub url: String,
}

impl RequestContext {
    pub fn new(request_id: Option<String>, url: impl Into<String>) -> Self {
        Self {
            request_id,
            url: url.into(),
        }
    }
}
