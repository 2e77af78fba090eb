//! HTTP surface: Midtrans callbacks, checkout and health.

pub mod callbacks;
pub mod checkout;

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tracing::error;

use crate::database::repository::RequestContext;
use crate::health::{HealthChecker, HealthStatus};
use crate::middleware::logging::{request_logging_middleware, UuidRequestId};
use crate::services::gateway::MidtransGateway;

#[derive(Clone)]
pub struct AppState {
    pub gateway: Arc<MidtransGateway>,
    pub health_checker: HealthChecker,
}

impl AppState {
    pub fn new(gateway: Arc<MidtransGateway>) -> Self {
        Self {
            gateway,
            health_checker: HealthChecker::new(),
        }
    }

    pub fn with_health_checker(mut self, health_checker: HealthChecker) -> Self {
        self.health_checker = health_checker;
        self
    }
}

/// Builds the application router with request id and logging layers.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/callbacks/midtrans/notification",
            post(callbacks::handle_notification),
        )
        .route("/callbacks/midtrans/return", get(callbacks::handle_return))
        .route("/api/payments/checkout", post(checkout::create_checkout))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                .layer(axum::middleware::from_fn(request_logging_middleware))
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
}

async fn health(
    State(state): State<AppState>,
) -> Result<Json<HealthStatus>, (StatusCode, Json<HealthStatus>)> {
    let health_status = state
        .health_checker
        .check_health(state.gateway.config())
        .await;

    if health_status.is_healthy() {
        Ok(Json(health_status))
    } else {
        error!("Health check failed - service unhealthy");
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(health_status)))
    }
}

pub(crate) fn request_context(request_id: Option<String>, uri: &Uri) -> RequestContext {
    let url = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());
    RequestContext::new(request_id, url)
}
