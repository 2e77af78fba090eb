//! The gateway as the billing platform sees it.

use bigdecimal::BigDecimal;
use std::sync::Arc;
use tracing::warn;

use crate::database::repository::{GatewayLogSink, InvoiceLookup, RequestContext};
use crate::payments::error::{PaymentError, PaymentResult};
use crate::payments::provider::PaymentProvider;
use crate::payments::providers::MidtransConfig;
use crate::payments::types::{
    CanonicalTransaction, CheckoutRedirect, CustomerDetails, InvoiceAllocation,
    NotificationOutcome, NotificationPayload,
};
use crate::services::reconciler::NotificationReconciler;
use crate::services::session_builder::SessionBuilder;

pub struct MidtransGateway {
    config: Arc<MidtransConfig>,
    session_builder: SessionBuilder,
    reconciler: NotificationReconciler,
}

impl MidtransGateway {
    pub fn new(
        config: Arc<MidtransConfig>,
        provider: Arc<dyn PaymentProvider>,
        invoices: Arc<dyn InvoiceLookup>,
        gateway_log: Arc<dyn GatewayLogSink>,
    ) -> Self {
        Self {
            config,
            session_builder: SessionBuilder::new(provider.clone(), gateway_log.clone()),
            reconciler: NotificationReconciler::new(provider, invoices, gateway_log),
        }
    }

    pub fn config(&self) -> &MidtransConfig {
        &self.config
    }

    /// Starts a hosted checkout covering `allocations`.
    pub async fn build_process(
        &self,
        allocations: &[InvoiceAllocation],
        amount: BigDecimal,
        customer: CustomerDetails,
        request: &RequestContext,
    ) -> PaymentResult<CheckoutRedirect> {
        self.session_builder
            .create_session(&self.config, allocations, amount, customer, request)
            .await
    }

    /// Handles a notification posted by Midtrans.
    pub async fn validate(
        &self,
        request: &RequestContext,
        payload: NotificationPayload,
    ) -> NotificationOutcome {
        self.reconciler
            .handle_notification(&self.config, request, payload)
            .await
    }

    /// Answers a notification body that could not be read as a status record.
    pub async fn reject_unparsed(
        &self,
        request: &RequestContext,
        raw_body: &str,
        reason: &str,
    ) -> NotificationOutcome {
        self.reconciler
            .reject_unparsed(request, raw_body, reason)
            .await
    }

    /// Handles the customer's browser returning from the hosted page.
    pub async fn success(
        &self,
        request: &RequestContext,
        order_id: &str,
    ) -> PaymentResult<CanonicalTransaction> {
        self.reconciler
            .handle_return(&self.config, request, order_id)
            .await
    }

    pub async fn capture(
        &self,
        reference_id: &str,
        transaction_id: &str,
        _amount: &BigDecimal,
    ) -> PaymentResult<CanonicalTransaction> {
        warn!(reference_id, transaction_id, "capture requested");
        Err(PaymentError::unsupported("capture"))
    }

    pub async fn void(
        &self,
        reference_id: &str,
        transaction_id: &str,
        _notes: Option<&str>,
    ) -> PaymentResult<CanonicalTransaction> {
        warn!(reference_id, transaction_id, "void requested");
        Err(PaymentError::unsupported("void"))
    }

    pub async fn refund(
        &self,
        reference_id: &str,
        transaction_id: &str,
        _amount: &BigDecimal,
        _notes: Option<&str>,
    ) -> PaymentResult<CanonicalTransaction> {
        warn!(reference_id, transaction_id, "refund requested");
        Err(PaymentError::unsupported("refund"))
    }
}
