//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use midtrans_gateway::api::{router, AppState};
use midtrans_gateway::database::memory::{InMemoryGatewayLog, InMemoryInvoiceStore};
use midtrans_gateway::payments::error::{PaymentError, PaymentResult};
use midtrans_gateway::payments::provider::PaymentProvider;
use midtrans_gateway::payments::providers::MidtransConfig;
use midtrans_gateway::payments::signature::expected_signature;
use midtrans_gateway::payments::types::{NotificationPayload, PaymentSession, SnapToken};
use midtrans_gateway::services::MidtransGateway;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const SERVER_KEY: &str = "SECRET";

/// In-process stand-in for the Midtrans APIs.
#[derive(Default)]
pub struct FakeMidtrans {
    session_calls: AtomicUsize,
    statuses: Mutex<HashMap<String, NotificationPayload>>,
}

impl FakeMidtrans {
    pub fn session_calls(&self) -> usize {
        self.session_calls.load(Ordering::SeqCst)
    }

    pub fn put_status(&self, payload: NotificationPayload) {
        self.statuses
            .lock()
            .unwrap()
            .insert(payload.order_id.clone(), payload);
    }
}

#[async_trait]
impl PaymentProvider for FakeMidtrans {
    async fn create_session(
        &self,
        _config: &MidtransConfig,
        session: &PaymentSession,
    ) -> PaymentResult<SnapToken> {
        self.session_calls.fetch_add(1, Ordering::SeqCst);
        Ok(SnapToken {
            token: "66e4fa55-fdac-4ef9-91b5-733b97d1b862".to_string(),
            redirect_url: format!(
                "https://app.sandbox.midtrans.com/snap/v2/vtweb/{}",
                session.order_id()
            ),
        })
    }

    async fn query_status(
        &self,
        _config: &MidtransConfig,
        order_id: &str,
    ) -> PaymentResult<NotificationPayload> {
        self.statuses
            .lock()
            .unwrap()
            .get(order_id)
            .cloned()
            .ok_or_else(|| PaymentError::RemoteServiceError {
                message: "Transaction doesn't exist.".to_string(),
            })
    }

    fn name(&self) -> &'static str {
        "fake-midtrans"
    }
}

pub fn config() -> MidtransConfig {
    MidtransConfig {
        merchant_id: "G141532850".to_string(),
        client_key: "SB-Mid-client-test".to_string(),
        server_key: SERVER_KEY.to_string(),
        sandbox: true,
        ..Default::default()
    }
}

/// A notification signed with `SERVER_KEY`.
pub fn signed_payload(
    order_id: &str,
    gross_amount: &str,
    transaction_status: &str,
    payment_type: &str,
    fraud_status: Option<&str>,
) -> NotificationPayload {
    NotificationPayload {
        transaction_status: transaction_status.to_string(),
        payment_type: payment_type.to_string(),
        status_code: "200".to_string(),
        order_id: order_id.to_string(),
        fraud_status: fraud_status.map(str::to_string),
        currency: Some("IDR".to_string()),
        gross_amount: gross_amount.to_string(),
        transaction_id: "513f1f01-c9da-474c-9fc9-d5c64364b709".to_string(),
        signature_key: expected_signature(order_id, "200", gross_amount, SERVER_KEY),
    }
}

pub struct TestApp {
    pub router: Router,
    pub gateway: Arc<MidtransGateway>,
    pub provider: Arc<FakeMidtrans>,
    pub gateway_log: Arc<InMemoryGatewayLog>,
}

/// Invoices 12 and 13 belong to client 7.
pub fn test_app() -> TestApp {
    test_app_with(config())
}

pub fn test_app_with(config: MidtransConfig) -> TestApp {
    let provider = Arc::new(FakeMidtrans::default());
    let invoices = Arc::new(
        InMemoryInvoiceStore::new()
            .with_invoice("12", "7")
            .with_invoice("13", "7"),
    );
    let gateway_log = Arc::new(InMemoryGatewayLog::new());
    let gateway = Arc::new(MidtransGateway::new(
        Arc::new(config),
        provider.clone(),
        invoices,
        gateway_log.clone(),
    ));

    TestApp {
        router: router(AppState::new(gateway.clone())),
        gateway,
        provider,
        gateway_log,
    }
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
