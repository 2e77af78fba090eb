//! Midtrans payment integration
//!
//! Order reference packing, notification signatures, status mapping and the
//! remote Snap/status client.

pub mod error;
pub mod order_reference;
pub mod provider;
pub mod providers;
pub mod signature;
pub mod status;
pub mod types;
pub mod utils;
