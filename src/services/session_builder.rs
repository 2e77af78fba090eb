//! Builds the hosted checkout for a set of invoices.

use std::sync::Arc;

use bigdecimal::BigDecimal;
use serde_json::json;
use tracing::{error, info, warn};

use crate::database::repository::{GatewayLogEntry, GatewayLogSink, LogDirection, RequestContext};
use crate::payments::error::{PaymentError, PaymentResult};
use crate::payments::order_reference::encode_checked;
use crate::payments::provider::PaymentProvider;
use crate::payments::providers::midtrans::snap_request_body;
use crate::payments::providers::MidtransConfig;
use crate::payments::types::{
    require_positive, CheckoutRedirect, CustomerDetails, InvoiceAllocation, PaymentSession,
};

pub struct SessionBuilder {
    provider: Arc<dyn PaymentProvider>,
    gateway_log: Arc<dyn GatewayLogSink>,
}

impl SessionBuilder {
    pub fn new(provider: Arc<dyn PaymentProvider>, gateway_log: Arc<dyn GatewayLogSink>) -> Self {
        Self {
            provider,
            gateway_log,
        }
    }

    /// Packs `allocations` into the order id and opens a Snap session.
    ///
    /// Configuration, amount and order id length are all checked before the
    /// provider is called.
    pub async fn create_session(
        &self,
        config: &MidtransConfig,
        allocations: &[InvoiceAllocation],
        gross_amount: BigDecimal,
        customer: CustomerDetails,
        request: &RequestContext,
    ) -> PaymentResult<CheckoutRedirect> {
        config.validate()?;
        if allocations.is_empty() {
            return Err(PaymentError::validation(
                "at least one invoice is required",
                "invoices",
            ));
        }
        require_positive(&gross_amount, "amount")?;

        let order_id = encode_checked(allocations).map_err(|e| {
            warn!(invoices = allocations.len(), error = %e, "order reference rejected");
            e
        })?;

        let session = PaymentSession::new(order_id, gross_amount, customer);
        self.audit(
            request,
            LogDirection::Input,
            snap_request_body(config, &session),
            true,
        )
        .await;

        match self.provider.create_session(config, &session).await {
            Ok(token) => {
                self.audit(
                    request,
                    LogDirection::Output,
                    json!({ "token": token.token, "redirect_url": token.redirect_url }),
                    true,
                )
                .await;
                info!(
                    order_id = %session.order_id(),
                    provider = self.provider.name(),
                    "checkout session created"
                );
                Ok(CheckoutRedirect {
                    order_id: session.order_id().to_string(),
                    redirect_url: token.redirect_url,
                    token: token.token,
                })
            }
            Err(e) => {
                self.audit(
                    request,
                    LogDirection::Output,
                    json!({ "error": e.to_string() }),
                    false,
                )
                .await;
                error!(order_id = %session.order_id(), error = %e, "checkout session failed");
                Err(e)
            }
        }
    }

    async fn audit(
        &self,
        request: &RequestContext,
        direction: LogDirection,
        data: serde_json::Value,
        success: bool,
    ) {
        let entry = GatewayLogEntry::new(request, direction, data, success);
        if let Err(e) = self.gateway_log.record(entry).await {
            warn!(error = %e, "failed to record gateway log entry");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::InMemoryGatewayLog;
    use crate::payments::types::{NotificationPayload, SnapToken};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingProvider {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl PaymentProvider for CountingProvider {
        async fn create_session(
            &self,
            _config: &MidtransConfig,
            session: &PaymentSession,
        ) -> PaymentResult<SnapToken> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(PaymentError::RemoteServiceError {
                    message: "order_id has already been taken".to_string(),
                });
            }
            Ok(SnapToken {
                token: "snap-token".to_string(),
                redirect_url: format!(
                    "https://app.sandbox.midtrans.com/snap/v2/vtweb/{}",
                    session.order_id()
                ),
            })
        }

        async fn query_status(
            &self,
            _config: &MidtransConfig,
            _order_id: &str,
        ) -> PaymentResult<NotificationPayload> {
            unreachable!("session builder never queries status")
        }

        fn name(&self) -> &'static str {
            "counting"
        }
    }

    fn config() -> MidtransConfig {
        MidtransConfig {
            merchant_id: "G141532850".to_string(),
            client_key: "SB-Mid-client-test".to_string(),
            server_key: "SB-Mid-server-test".to_string(),
            sandbox: true,
            ..Default::default()
        }
    }

    fn builder(provider: Arc<CountingProvider>) -> (SessionBuilder, Arc<InMemoryGatewayLog>) {
        let log = Arc::new(InMemoryGatewayLog::new());
        (SessionBuilder::new(provider, log.clone()), log)
    }

    fn request() -> RequestContext {
        RequestContext::new(Some("req-1".to_string()), "/api/payments/checkout")
    }

    #[tokio::test]
    async fn creates_session_with_packed_order_id() {
        let provider = Arc::new(CountingProvider::default());
        let (builder, log) = builder(provider.clone());
        let allocations = vec![
            InvoiceAllocation::new("12", 500),
            InvoiceAllocation::new("13", 250),
        ];

        let redirect = builder
            .create_session(
                &config(),
                &allocations,
                BigDecimal::from(750),
                CustomerDetails::default(),
                &request(),
            )
            .await
            .expect("session should be created");

        assert_eq!(redirect.order_id, "12-500|13-250");
        assert!(redirect.redirect_url.ends_with("12-500|13-250"));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].direction, LogDirection::Input);
        assert_eq!(entries[0].data["transaction_details"]["order_id"], "12-500|13-250");
        assert_eq!(entries[1].direction, LogDirection::Output);
        assert!(entries[1].success);
    }

    #[tokio::test]
    async fn over_long_reference_fails_before_remote_call() {
        let provider = Arc::new(CountingProvider::default());
        let (builder, log) = builder(provider.clone());
        // three "1000000-1000|" plus "1000003-1000" = 13 * 3 + 12 = 51 chars
        let allocations = vec![
            InvoiceAllocation::new("1000000", 1000),
            InvoiceAllocation::new("1000001", 1000),
            InvoiceAllocation::new("1000002", 1000),
            InvoiceAllocation::new("1000003", 1000),
        ];
        assert_eq!(crate::payments::order_reference::encode(&allocations).len(), 51);

        let result = builder
            .create_session(
                &config(),
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
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
        assert!(log.entries().is_empty());
    }

    #[tokio::test]
    async fn missing_credentials_fail_before_remote_call() {
        let provider = Arc::new(CountingProvider::default());
        let (builder, _log) = builder(provider.clone());
        let mut c = config();
        c.client_key.clear();

        let result = builder
            .create_session(
                &c,
                &[InvoiceAllocation::new("12", 500)],
                BigDecimal::from(500),
                CustomerDetails::default(),
                &request(),
            )
            .await;

        assert_eq!(
            result,
            Err(PaymentError::ConfigurationInvalid {
                field: "client_key".to_string()
            })
        );
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_invoices_and_zero_amount_are_rejected() {
        let provider = Arc::new(CountingProvider::default());
        let (builder, _log) = builder(provider.clone());

        let empty = builder
            .create_session(
                &config(),
                &[],
                BigDecimal::from(500),
                CustomerDetails::default(),
                &request(),
            )
            .await;
        assert!(matches!(empty, Err(PaymentError::ValidationError { .. })));

        let zero = builder
            .create_session(
                &config(),
                &[InvoiceAllocation::new("12", 0)],
                BigDecimal::from(0),
                CustomerDetails::default(),
                &request(),
            )
            .await;
        assert!(matches!(zero, Err(PaymentError::ValidationError { .. })));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn remote_failure_is_returned_and_logged() {
        let provider = Arc::new(CountingProvider {
            fail: true,
            ..Default::default()
        });
        let (builder, log) = builder(provider.clone());

        let result = builder
            .create_session(
                &config(),
                &[InvoiceAllocation::new("12", 500)],
                BigDecimal::from(500),
                CustomerDetails::default(),
                &request(),
            )
            .await;

        assert!(matches!(result, Err(PaymentError::RemoteServiceError { .. })));
        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert!(!entries[1].success);
        assert!(entries[1].data["error"]
            .as_str()
            .unwrap_or_default()
            .contains("already been taken"));
    }
}
