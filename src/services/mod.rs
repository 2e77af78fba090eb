//! Services module for the gateway's business logic

pub mod gateway;
pub mod reconciler;
pub mod session_builder;

pub use gateway::MidtransGateway;
pub use reconciler::NotificationReconciler;
pub use session_builder::SessionBuilder;
