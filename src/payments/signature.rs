use crate::payments::types::NotificationPayload;
use sha2::{Digest, Sha512};

/// Lowercase hex SHA-512 of `order_id || status_code || gross_amount || server_key`.
pub fn expected_signature(
    order_id: &str,
    status_code: &str,
    gross_amount: &str,
    server_key: &str,
) -> String {
    let mut hasher = Sha512::new();
    hasher.update(order_id.as_bytes());
    hasher.update(status_code.as_bytes());
    hasher.update(gross_amount.as_bytes());
    hasher.update(server_key.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn verify(payload: &NotificationPayload, server_key: &str) -> bool {
    let expected = expected_signature(
        &payload.order_id,
        &payload.status_code,
        &payload.gross_amount,
        server_key,
    );
    secure_eq(expected.as_bytes(), payload.signature_key.as_bytes())
}

pub fn secure_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter()
        .zip(b.iter())
        .fold(0_u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}
