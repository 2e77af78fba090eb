use crate::payments::error::PaymentResult;
use crate::payments::providers::MidtransConfig;
use crate::payments::types::{NotificationPayload, PaymentSession, SnapToken};
use async_trait::async_trait;

/// Remote side of the gateway: the hosted checkout and its status lookup.
///
/// Configuration is passed into every call; implementations hold no
/// credentials of their own.
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Opens a hosted payment session and returns its redirect URL.
    async fn create_session(
        &self,
        config: &MidtransConfig,
        session: &PaymentSession,
    ) -> PaymentResult<SnapToken>;

    /// Fetches the current status record for an order. The record carries
    /// its own signature and must be verified like a notification.
    async fn query_status(
        &self,
        config: &MidtransConfig,
        order_id: &str,
    ) -> PaymentResult<NotificationPayload>;

    fn name(&self) -> &'static str;
}
