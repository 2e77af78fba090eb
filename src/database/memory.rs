//! In-process stores, used when no database is configured and in tests.

use crate::database::repository::{GatewayLogEntry, GatewayLogSink, InvoiceLookup};
use crate::payments::error::{PaymentError, PaymentResult};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, RwLock};
use tracing::info;

#[derive(Debug, Default)]
pub struct InMemoryInvoiceStore {
    owners: RwLock<HashMap<String, String>>,
}

impl InMemoryInvoiceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_invoice(self, invoice_id: &str, client_id: &str) -> Self {
        self.insert(invoice_id, client_id);
        self
    }

    pub fn insert(&self, invoice_id: &str, client_id: &str) {
        let mut owners = self.owners.write().unwrap_or_else(|p| p.into_inner());
        owners.insert(invoice_id.to_string(), client_id.to_string());
    }
}

#[async_trait]
impl InvoiceLookup for InMemoryInvoiceStore {
    async fn find_client_id(&self, invoice_id: &str) -> PaymentResult<Option<String>> {
        let owners = self.owners.read().map_err(|_| PaymentError::StorageError {
            message: "invoice store lock poisoned".to_string(),
        })?;
        Ok(owners.get(invoice_id).cloned())
    }
}

fn trace_entry(entry: &GatewayLogEntry) {
    info!(
        target: "gateway_log",
        request_id = entry.request_id.as_deref().unwrap_or("-"),
        url = %entry.url,
        direction = entry.direction.as_str(),
        success = entry.success,
        "gateway exchange recorded"
    );
}

/// Writes audit entries to the tracing output only; nothing is retained.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingGatewayLog;

impl TracingGatewayLog {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl GatewayLogSink for TracingGatewayLog {
    async fn record(&self, entry: GatewayLogEntry) -> PaymentResult<()> {
        trace_entry(&entry);
        Ok(())
    }
}

/// Keeps audit entries in memory and mirrors them to the tracing output.
/// Used by tests that inspect what was recorded.
#[derive(Debug, Default)]
pub struct InMemoryGatewayLog {
    entries: Mutex<Vec<GatewayLogEntry>>,
}

impl InMemoryGatewayLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<GatewayLogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .clone()
    }
}

#[async_trait]
impl GatewayLogSink for InMemoryGatewayLog {
    async fn record(&self, entry: GatewayLogEntry) -> PaymentResult<()> {
        trace_entry(&entry);
        self.entries
            .lock()
            .map_err(|_| PaymentError::StorageError {
                message: "gateway log lock poisoned".to_string(),
            })?
            .push(entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::repository::{LogDirection, RequestContext};

    #[tokio::test]
    async fn invoice_store_resolves_owner() {
        let store = InMemoryInvoiceStore::new().with_invoice("12", "7");
        assert_eq!(
            store.find_client_id("12").await.expect("lookup"),
            Some("7".to_string())
        );
        assert_eq!(store.find_client_id("13").await.expect("lookup"), None);
    }

    #[tokio::test]
    async fn gateway_log_keeps_entries_in_order() {
        let log = InMemoryGatewayLog::new();
        let request = RequestContext::new(Some("req-1".to_string()), "/callbacks/midtrans");
        log.record(GatewayLogEntry::new(
            &request,
            LogDirection::Input,
            serde_json::json!({"n": 1}),
            true,
        ))
        .await
        .expect("record");
        log.record(GatewayLogEntry::new(
            &request,
            LogDirection::Output,
            serde_json::json!({"n": 2}),
            false,
        ))
        .await
        .expect("record");

        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].direction, LogDirection::Input);
        assert_eq!(entries[1].data["n"], 2);
        assert!(!entries[1].success);
    }

    #[tokio::test]
    async fn tracing_gateway_log_accepts_entries_without_keeping_them() {
        let log = TracingGatewayLog::new();
        let request = RequestContext::new(None, "/checkout");
        for n in 0..3 {
            log.record(GatewayLogEntry::new(
                &request,
                LogDirection::Output,
                serde_json::json!({ "n": n }),
                true,
            ))
            .await
            .expect("record");
        }
        assert_eq!(std::mem::size_of::<TracingGatewayLog>(), 0);
    }
}
