//! Packs the invoices settled by one payment into the Midtrans `order_id`.
//!
//! Wire format: `{invoice_id}-{amount}` pairs joined by `|`, for example
//! `12-500|13-250`. Delimiters inside invoice ids are not escaped, so an id
//! containing `-` or `|` will not survive a round trip.

use crate::payments::error::{PaymentError, PaymentResult};
use crate::payments::types::InvoiceAllocation;

/// Length limit of the Midtrans `order_id` field.
pub const MAX_ORDER_ID_LEN: usize = 50;

const PAIR_SEPARATOR: char = '|';
const FIELD_SEPARATOR: char = '-';

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderReference {
    allocations: Vec<InvoiceAllocation>,
}

impl OrderReference {
    pub fn new(allocations: Vec<InvoiceAllocation>) -> Self {
        Self { allocations }
    }

    /// Strict decode: an order id that yields no allocation is rejected.
    pub fn parse(order_id: &str) -> PaymentResult<Self> {
        let allocations = decode(order_id);
        if allocations.is_empty() {
            return Err(PaymentError::MalformedOrderReference {
                order_id: order_id.to_string(),
            });
        }
        Ok(Self { allocations })
    }

    pub fn allocations(&self) -> &[InvoiceAllocation] {
        &self.allocations
    }

    pub fn into_allocations(self) -> Vec<InvoiceAllocation> {
        self.allocations
    }

    pub fn first_invoice_id(&self) -> Option<&str> {
        self.allocations.first().map(|a| a.invoice_id.as_str())
    }

    pub fn to_order_id(&self) -> PaymentResult<String> {
        encode_checked(&self.allocations)
    }
}

pub fn encode(allocations: &[InvoiceAllocation]) -> String {
    allocations
        .iter()
        .map(|a| format!("{}{}{}", a.invoice_id, FIELD_SEPARATOR, a.amount))
        .collect::<Vec<_>>()
        .join(&PAIR_SEPARATOR.to_string())
}

/// Encodes and enforces the remote field limit.
pub fn encode_checked(allocations: &[InvoiceAllocation]) -> PaymentResult<String> {
    let encoded = encode(allocations);
    let length = encoded.chars().count();
    if length > MAX_ORDER_ID_LEN {
        return Err(PaymentError::OrderReferenceTooLong {
            length,
            max: MAX_ORDER_ID_LEN,
        });
    }
    Ok(encoded)
}

/// Lenient decode. Segments without a separator, with an empty invoice id, or
/// with a non-integer amount are dropped.
pub fn decode(order_id: &str) -> Vec<InvoiceAllocation> {
    order_id
        .split(PAIR_SEPARATOR)
        .filter_map(|segment| {
            let (invoice_id, amount) = segment.split_once(FIELD_SEPARATOR)?;
            if invoice_id.is_empty() {
                return None;
            }
            let amount = amount.parse::<i64>().ok()?;
            Some(InvoiceAllocation::new(invoice_id, amount))
        })
        .collect()
}
