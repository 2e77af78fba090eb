use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::api::{request_context, AppState};
use crate::middleware::error::ApiError;
use crate::middleware::logging::request_id_from_headers;
use crate::payments::error::PaymentError;
use crate::payments::types::{CanonicalTransaction, NotificationPayload};

#[derive(Debug, Deserialize)]
pub struct ReturnQuery {
    #[serde(default)]
    pub order_id: Option<String>,
}

/// POST /callbacks/midtrans/notification
pub async fn handle_notification(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    body: String,
) -> Response {
    let request = request_context(request_id_from_headers(&headers), &uri);
    info!("Received Midtrans notification");

    let outcome = match serde_json::from_str::<NotificationPayload>(&body) {
        Ok(payload) => state.gateway.validate(&request, payload).await,
        Err(e) => {
            state
                .gateway
                .reject_unparsed(&request, &body, &e.to_string())
                .await
        }
    };

    let status =
        StatusCode::from_u16(outcome.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(outcome.acknowledgment)).into_response()
}

/// GET /callbacks/midtrans/return?order_id=...
pub async fn handle_return(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    Query(query): Query<ReturnQuery>,
) -> Result<Json<CanonicalTransaction>, ApiError> {
    let request_id = request_id_from_headers(&headers);
    let request = request_context(request_id.clone(), &uri);

    let order_id = query
        .order_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| {
            ApiError::new(
                PaymentError::validation("order_id is required", "order_id"),
                request_id.clone(),
            )
        })?;

    state
        .gateway
        .success(&request, &order_id)
        .await
        .map(Json)
        .map_err(|e| ApiError::new(e, request_id))
}
