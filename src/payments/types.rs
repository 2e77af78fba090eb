use crate::payments::error::{PaymentError, PaymentResult};
use bigdecimal::{BigDecimal, ToPrimitive, Zero};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A slice of a payment applied to one invoice. Amounts carry no fractional
/// cents once packed into an order reference.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InvoiceAllocation {
    pub invoice_id: String,
    pub amount: i64,
}

impl InvoiceAllocation {
    pub fn new(invoice_id: impl Into<String>, amount: i64) -> Self {
        Self {
            invoice_id: invoice_id.into(),
            amount,
        }
    }

    /// Drops the fractional part of `amount` (toward zero).
    pub fn truncated(invoice_id: impl Into<String>, amount: &BigDecimal) -> PaymentResult<Self> {
        let whole = amount
            .with_scale(0)
            .to_i64()
            .ok_or_else(|| PaymentError::validation(
                format!("invoice amount out of range: {}", amount),
                "invoices.amount",
            ))?;
        Ok(Self::new(invoice_id, whole))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomerDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Outbound hosted-checkout request. Built once per checkout and never
/// mutated after it is handed to the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentSession {
    order_id: String,
    gross_amount: BigDecimal,
    customer: CustomerDetails,
}

impl PaymentSession {
    pub fn new(order_id: String, gross_amount: BigDecimal, customer: CustomerDetails) -> Self {
        Self {
            order_id,
            gross_amount,
            customer,
        }
    }

    pub fn order_id(&self) -> &str {
        &self.order_id
    }

    pub fn gross_amount(&self) -> &BigDecimal {
        &self.gross_amount
    }

    pub fn customer(&self) -> &CustomerDetails {
        &self.customer
    }
}

/// Token and hosted page URL returned by Snap.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SnapToken {
    pub token: String,
    pub redirect_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CheckoutRedirect {
    pub order_id: String,
    pub redirect_url: String,
    pub token: String,
}

/// Raw transaction status record, as posted by Midtrans to the notification
/// URL or returned by the status API. Nothing here is trusted until the
/// signature has been checked.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NotificationPayload {
    #[serde(default)]
    pub transaction_status: String,
    #[serde(default)]
    pub payment_type: String,
    #[serde(default)]
    pub status_code: String,
    #[serde(default)]
    pub order_id: String,
    #[serde(default)]
    pub fraud_status: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub gross_amount: String,
    #[serde(default)]
    pub transaction_id: String,
    #[serde(default)]
    pub signature_key: String,
}

impl NotificationPayload {
    pub fn parsed_gross_amount(&self) -> PaymentResult<BigDecimal> {
        BigDecimal::from_str(self.gross_amount.trim()).map_err(|_| {
            PaymentError::validation(
                format!("invalid gross_amount: {:?}", self.gross_amount),
                "gross_amount",
            )
        })
    }
}

/// Billing platform transaction status.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Approved,
    Declined,
    Void,
    Pending,
    Reconciled,
    Refunded,
    Returned,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Approved => "approved",
            TransactionStatus::Declined => "declined",
            TransactionStatus::Void => "void",
            TransactionStatus::Pending => "pending",
            TransactionStatus::Reconciled => "reconciled",
            TransactionStatus::Refunded => "refunded",
            TransactionStatus::Returned => "returned",
        }
    }
}

impl std::fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The record handed back to the billing platform for one verified
/// notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CanonicalTransaction {
    pub client_id: String,
    pub amount: BigDecimal,
    pub currency: String,
    pub status: TransactionStatus,
    pub reference_id: Option<String>,
    pub transaction_id: String,
    pub parent_transaction_id: Option<String>,
    pub invoices: Vec<InvoiceAllocation>,
}

/// JSON body returned to Midtrans for a notification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Acknowledgment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<bool>,
    pub message: String,
}

impl Acknowledgment {
    pub fn accepted(message: impl Into<String>) -> Self {
        Self {
            success: Some(true),
            error: None,
            message: message.into(),
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: None,
            error: Some(true),
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success.unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationOutcome {
    pub status_code: u16,
    pub acknowledgment: Acknowledgment,
    pub transaction: Option<CanonicalTransaction>,
}

impl NotificationOutcome {
    pub fn is_verified(&self) -> bool {
        self.transaction.is_some()
    }
}

pub(crate) fn require_positive(amount: &BigDecimal, field: &str) -> PaymentResult<()> {
    if amount <= &BigDecimal::zero() {
        return Err(PaymentError::validation(
            "amount must be greater than zero",
            field,
        ));
    }
    Ok(())
}
