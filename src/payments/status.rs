use crate::payments::error::{PaymentError, PaymentResult};
use crate::payments::types::{NotificationPayload, TransactionStatus};

const CREDIT_CARD: &str = "credit_card";
const FRAUD_CHALLENGE: &str = "challenge";

/// Maps a Midtrans transaction to the billing platform's status.
///
/// | transaction_status | condition                              | status   |
/// |--------------------|----------------------------------------|----------|
/// | capture            | credit_card, fraud_status == challenge | declined |
/// | capture            | credit_card, any other fraud_status    | approved |
/// | settlement         |                                        | approved |
/// | pending            |                                        | pending  |
/// | deny               |                                        | declined |
/// | expire, cancel     |                                        | void     |
///
/// Anything else, including a capture on a non-card payment type, is an
/// `UnknownTransactionStatus` error.
pub fn map_status(
    transaction_status: &str,
    payment_type: &str,
    fraud_status: Option<&str>,
) -> PaymentResult<TransactionStatus> {
    match transaction_status {
        "capture" if payment_type == CREDIT_CARD => {
            if fraud_status == Some(FRAUD_CHALLENGE) {
                Ok(TransactionStatus::Declined)
            } else {
                Ok(TransactionStatus::Approved)
            }
        }
        "settlement" => Ok(TransactionStatus::Approved),
        "pending" => Ok(TransactionStatus::Pending),
        "deny" => Ok(TransactionStatus::Declined),
        "expire" | "cancel" => Ok(TransactionStatus::Void),
        _ => Err(PaymentError::UnknownTransactionStatus {
            transaction_status: transaction_status.to_string(),
            payment_type: payment_type.to_string(),
        }),
    }
}

pub fn map_payload_status(payload: &NotificationPayload) -> PaymentResult<TransactionStatus> {
    map_status(
        &payload.transaction_status,
        &payload.payment_type,
        payload.fraud_status.as_deref(),
    )
}
