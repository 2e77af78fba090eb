use axum::{
    extract::State,
    http::{HeaderMap, Uri},
    Json,
};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value as JsonValue;
use tracing::info;

use crate::api::{request_context, AppState};
use crate::middleware::error::ApiError;
use crate::middleware::logging::request_id_from_headers;
use crate::payments::error::PaymentError;
use crate::payments::types::{CheckoutRedirect, CustomerDetails, InvoiceAllocation};

#[derive(Debug, Deserialize)]
pub struct CheckoutInvoice {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub amount: BigDecimal,
}

#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    pub invoices: Vec<CheckoutInvoice>,
    pub amount: BigDecimal,
    #[serde(default)]
    pub customer: CustomerDetails,
}

/// POST /api/payments/checkout
pub async fn create_checkout(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    body: String,
) -> Result<Json<CheckoutRedirect>, ApiError> {
    let request_id = request_id_from_headers(&headers);
    let request = request_context(request_id.clone(), &uri);

    let checkout: CheckoutRequest = serde_json::from_str(&body).map_err(|e| {
        ApiError::new(
            PaymentError::validation(format!("invalid checkout request: {}", e), "body"),
            request_id.clone(),
        )
    })?;

    let allocations = checkout
        .invoices
        .iter()
        .map(|invoice| InvoiceAllocation::truncated(invoice.id.clone(), &invoice.amount))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ApiError::new(e, request_id.clone()))?;

    info!(
        invoices = allocations.len(),
        amount = %checkout.amount,
        "Checkout requested"
    );

    state
        .gateway
        .build_process(&allocations, checkout.amount, checkout.customer, &request)
        .await
        .map(Json)
        .map_err(|e| ApiError::new(e, request_id))
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match JsonValue::deserialize(deserializer)? {
        JsonValue::String(s) => Ok(s),
        JsonValue::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}
