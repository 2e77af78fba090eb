use crate::database::repository::InvoiceLookup;
use crate::database::storage_error;
use crate::payments::error::PaymentResult;
use async_trait::async_trait;
use sqlx::PgPool;

/// Read-only view of the billing platform's `invoices` table.
pub struct InvoiceRepository {
    pool: PgPool,
}

impl InvoiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl InvoiceLookup for InvoiceRepository {
    async fn find_client_id(&self, invoice_id: &str) -> PaymentResult<Option<String>> {
        // Invoice ids decoded from an order reference are untrusted text.
        let Ok(id) = invoice_id.parse::<i64>() else {
            return Ok(None);
        };

        let client_id: Option<i64> =
            sqlx::query_scalar("SELECT client_id FROM invoices WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(storage_error)?;

        Ok(client_id.map(|c| c.to_string()))
    }
}
