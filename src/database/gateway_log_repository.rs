use crate::database::repository::{GatewayLogEntry, GatewayLogSink};
use crate::database::storage_error;
use crate::payments::error::PaymentResult;
use async_trait::async_trait;
use sqlx::PgPool;

pub const GATEWAY_NAME: &str = "midtrans";

/// Appends audit entries to `log_gateway`.
pub struct GatewayLogRepository {
    pool: PgPool,
}

impl GatewayLogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GatewayLogSink for GatewayLogRepository {
    async fn record(&self, entry: GatewayLogEntry) -> PaymentResult<()> {
        sqlx::query(
            "INSERT INTO log_gateway
             (gateway, direction, url, data, result, request_id, date_added)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(GATEWAY_NAME)
        .bind(entry.direction.as_str())
        .bind(&entry.url)
        .bind(&entry.data)
        .bind(if entry.success { "success" } else { "failure" })
        .bind(entry.request_id.as_deref())
        .bind(entry.logged_at)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(())
    }
}
