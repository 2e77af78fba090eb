//! Checkout and reconciliation flows through the gateway facade

mod common;

use bigdecimal::BigDecimal;
use common::{signed_payload, test_app};
use midtrans_gateway::database::repository::RequestContext;
use midtrans_gateway::payments::error::PaymentError;
use midtrans_gateway::payments::order_reference::{decode, encode};
use midtrans_gateway::payments::signature::verify;
use midtrans_gateway::payments::types::{
    CustomerDetails, InvoiceAllocation, NotificationPayload, TransactionStatus,
};
use sha2::{Digest, Sha512};
use std::str::FromStr;

fn request() -> RequestContext {
    RequestContext::new(Some("req-flow".to_string()), "/callbacks/midtrans/notification")
}

#[test]
fn allocations_survive_the_order_id() {
    let allocations = vec![InvoiceAllocation::new("12", 500), InvoiceAllocation::new("13", 250)];
    let order_id = encode(&allocations);
    assert_eq!(order_id, "12-500|13-250");
    assert_eq!(decode(&order_id), allocations);
}

#[tokio::test]
async fn settlement_with_valid_signature_is_approved() {
    let app = test_app();
    let digest = hex::encode(Sha512::digest(b"12-500200500.00SECRET"));
    let payload = NotificationPayload {
        transaction_status: "settlement".to_string(),
        payment_type: "bank_transfer".to_string(),
        status_code: "200".to_string(),
        order_id: "12-500".to_string(),
        gross_amount: "500.00".to_string(),
        transaction_id: "tx-settle-1".to_string(),
        signature_key: digest,
        ..Default::default()
    };
    assert!(verify(&payload, common::SERVER_KEY));

    let outcome = app.gateway.validate(&request(), payload).await;

    assert_eq!(outcome.status_code, 200);
    let tx = outcome.transaction.expect("verified");
    assert_eq!(tx.status, TransactionStatus::Approved);
    assert_eq!(tx.amount, BigDecimal::from_str("500.00").unwrap());
    assert_eq!(tx.transaction_id, "tx-settle-1");
    // No currency in the notification: the configured one applies.
    assert_eq!(tx.currency, "IDR");
    assert_eq!(tx.parent_transaction_id, None);
}

#[tokio::test]
async fn signature_off_by_one_character_is_rejected() {
    let app = test_app();
    let mut payload = signed_payload("12-500", "500.00", "settlement", "bank_transfer", None);
    let first = payload.signature_key.remove(0);
    payload
        .signature_key
        .insert(0, if first == 'a' { 'b' } else { 'a' });

    let outcome = app.gateway.validate(&request(), payload).await;

    assert_eq!(outcome.status_code, 403);
    assert_eq!(outcome.acknowledgment.error, Some(true));
    assert!(!outcome.is_verified());
    assert_eq!(app.gateway_log.entries().len(), 1);
}

#[tokio::test]
async fn card_capture_depends_on_fraud_status() {
    let app = test_app();

    let challenged = signed_payload(
        "12-500",
        "500.00",
        "capture",
        "credit_card",
        Some("challenge"),
    );
    let outcome = app.gateway.validate(&request(), challenged).await;
    assert_eq!(
        outcome.transaction.map(|t| t.status),
        Some(TransactionStatus::Declined)
    );

    let accepted = signed_payload("12-500", "500.00", "capture", "credit_card", Some("accept"));
    let outcome = app.gateway.validate(&request(), accepted).await;
    assert_eq!(
        outcome.transaction.map(|t| t.status),
        Some(TransactionStatus::Approved)
    );

    assert_eq!(app.gateway_log.entries().len(), 2);
}

#[tokio::test]
async fn over_long_order_id_never_reaches_midtrans() {
    let app = test_app();
    let allocations: Vec<_> = (0..4)
        .map(|i| InvoiceAllocation::new(format!("100000{}", i), 1000))
        .collect();
    assert_eq!(encode(&allocations).chars().count(), 51);

    let result = app
        .gateway
        .build_process(
            &allocations,
            BigDecimal::from(4000),
            CustomerDetails::default(),
            &request(),
        )
        .await;

    assert_eq!(
        result,
        Err(PaymentError::OrderReferenceTooLong { length: 51, max: 50 })
    );
    assert_eq!(app.provider.session_calls(), 0);
}

#[tokio::test]
async fn expire_and_cancel_void_the_transaction() {
    let app = test_app();
    for status in ["expire", "cancel"] {
        let payload = signed_payload("13-250", "250.00", status, "gopay", None);
        let outcome = app.gateway.validate(&request(), payload).await;
        assert_eq!(
            outcome.transaction.map(|t| t.status),
            Some(TransactionStatus::Void),
            "status {}",
            status
        );
    }
}

#[tokio::test]
async fn unsupported_operations_do_not_touch_midtrans() {
    let app = test_app();
    let amount = BigDecimal::from(500);

    assert!(matches!(
        app.gateway.capture("12-500", "tx-1", &amount).await,
        Err(PaymentError::Unsupported { .. })
    ));
    assert!(matches!(
        app.gateway.void("12-500", "tx-1", None).await,
        Err(PaymentError::Unsupported { .. })
    ));
    assert!(matches!(
        app.gateway.refund("12-500", "tx-1", &amount, None).await,
        Err(PaymentError::Unsupported { .. })
    ));
    assert_eq!(app.provider.session_calls(), 0);
    assert!(app.gateway_log.entries().is_empty());
}
