use serde_json::{json, Value as JsonValue};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::database::repository::{
    GatewayLogEntry, GatewayLogSink, InvoiceLookup, LogDirection, RequestContext,
};
use crate::payments::error::{PaymentError, PaymentResult};
use crate::payments::order_reference::OrderReference;
use crate::payments::provider::PaymentProvider;
use crate::payments::providers::MidtransConfig;
use crate::payments::signature;
use crate::payments::status::map_payload_status;
use crate::payments::types::{
    Acknowledgment, CanonicalTransaction, NotificationOutcome, NotificationPayload,
};

/// Turns Midtrans status records into billing transactions.
///
/// Two entry points share one pipeline: the notification Midtrans posts to
/// us, and the status query made when the customer's browser comes back.
pub struct NotificationReconciler {
    provider: Arc<dyn PaymentProvider>,
    invoices: Arc<dyn InvoiceLookup>,
    gateway_log: Arc<dyn GatewayLogSink>,
}

impl NotificationReconciler {
    pub fn new(
        provider: Arc<dyn PaymentProvider>,
        invoices: Arc<dyn InvoiceLookup>,
        gateway_log: Arc<dyn GatewayLogSink>,
    ) -> Self {
        Self {
            provider,
            invoices,
            gateway_log,
        }
    }

    pub async fn handle_notification(
        &self,
        config: &MidtransConfig,
        request: &RequestContext,
        payload: NotificationPayload,
    ) -> NotificationOutcome {
        let result = self.reconcile(config, &payload).await;
        self.audit(request, raw_payload(&payload), result.is_ok())
            .await;

        match result {
            Ok(transaction) => {
                info!(
                    order_id = %payload.order_id,
                    transaction_id = %transaction.transaction_id,
                    status = %transaction.status,
                    "Notification reconciled"
                );
                NotificationOutcome {
                    status_code: 200,
                    acknowledgment: Acknowledgment::accepted(format!(
                        "Transaction {} recorded as {}",
                        transaction.transaction_id, transaction.status
                    )),
                    transaction: Some(transaction),
                }
            }
            Err(PaymentError::SignatureMismatch) => {
                warn!(order_id = %payload.order_id, "Invalid notification signature");
                NotificationOutcome {
                    status_code: 403,
                    acknowledgment: Acknowledgment::rejected("Invalid signature"),
                    transaction: None,
                }
            }
            Err(e) => {
                error!(order_id = %payload.order_id, error = %e, "Notification rejected");
                NotificationOutcome {
                    status_code: e.http_status_code(),
                    acknowledgment: Acknowledgment::rejected(e.user_message()),
                    transaction: None,
                }
            }
        }
    }

    /// Answers a notification body that is not a status record. The raw
    /// text is kept in the audit entry as a JSON string.
    pub async fn reject_unparsed(
        &self,
        request: &RequestContext,
        raw_body: &str,
        reason: &str,
    ) -> NotificationOutcome {
        warn!(error = %reason, "Invalid notification payload");
        self.audit(request, JsonValue::String(raw_body.to_string()), false)
            .await;

        NotificationOutcome {
            status_code: 400,
            acknowledgment: Acknowledgment::rejected("Invalid JSON payload"),
            transaction: None,
        }
    }

    pub async fn handle_return(
        &self,
        config: &MidtransConfig,
        request: &RequestContext,
        order_id: &str,
    ) -> PaymentResult<CanonicalTransaction> {
        let queried = match config.validate() {
            Ok(()) => self.provider.query_status(config, order_id).await,
            Err(e) => Err(e),
        };

        let payload = match queried {
            Ok(payload) => payload,
            Err(e) => {
                self.audit(
                    request,
                    json!({ "order_id": order_id, "error": e.to_string() }),
                    false,
                )
                .await;
                error!(order_id = %order_id, error = %e, "Status query failed");
                return Err(e);
            }
        };

        let result = self.reconcile(config, &payload).await;
        self.audit(request, raw_payload(&payload), result.is_ok())
            .await;

        match &result {
            Ok(transaction) => info!(
                order_id = %order_id,
                transaction_id = %transaction.transaction_id,
                status = %transaction.status,
                "Return reconciled"
            ),
            Err(e) => warn!(order_id = %order_id, error = %e, "Return rejected"),
        }
        result
    }

    async fn reconcile(
        &self,
        config: &MidtransConfig,
        payload: &NotificationPayload,
    ) -> PaymentResult<CanonicalTransaction> {
        // An empty server key would make every forged signature valid.
        config.validate()?;

        if !signature::verify(payload, &config.server_key) {
            return Err(PaymentError::SignatureMismatch);
        }

        let reference = OrderReference::parse(&payload.order_id)?;
        let client_id = self.resolve_client(&reference).await?;
        let status = map_payload_status(payload)?;
        let amount = payload.parsed_gross_amount()?;

        let currency = payload
            .currency
            .as_deref()
            .filter(|c| !c.is_empty())
            .unwrap_or(&config.currency)
            .to_string();

        Ok(CanonicalTransaction {
            client_id,
            amount,
            currency,
            status,
            reference_id: Some(payload.order_id.clone()),
            transaction_id: payload.transaction_id.clone(),
            parent_transaction_id: None,
            invoices: reference.into_allocations(),
        })
    }

    async fn resolve_client(&self, reference: &OrderReference) -> PaymentResult<String> {
        let invoice_id = reference
            .first_invoice_id()
            .ok_or_else(|| PaymentError::MalformedOrderReference {
                order_id: String::new(),
            })?;

        self.invoices
            .find_client_id(invoice_id)
            .await?
            .ok_or_else(|| PaymentError::ClientNotFound {
                invoice_id: invoice_id.to_string(),
            })
    }

    async fn audit(&self, request: &RequestContext, data: JsonValue, success: bool) {
        let entry = GatewayLogEntry::new(request, LogDirection::Output, data, success);
        if let Err(e) = self.gateway_log.record(entry).await {
            warn!(error = %e, "failed to record gateway log entry");
        }
    }
}

fn raw_payload(payload: &NotificationPayload) -> JsonValue {
    serde_json::to_value(payload).unwrap_or(JsonValue::Null)
}
