//! Midtrans payment gateway for a billing platform.
//!
//! Opens Snap checkouts for one or more invoices and turns Midtrans status
//! records into billing transactions.

pub mod api;
pub mod config;
pub mod database;
pub mod health;
pub mod logging;
pub mod middleware;
pub mod payments;
pub mod services;
