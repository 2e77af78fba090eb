//! Health check module
//! Reports whether the gateway can take traffic: its configuration and, when
//! one is attached, the database.

use serde::Serialize;
use std::collections::HashMap;
#[cfg(feature = "database")]
use std::time::{Duration, Instant};
#[cfg(feature = "database")]
use tokio::time::timeout;
use tracing::{error, info};

use crate::payments::providers::MidtransConfig;

/// Health status response
#[derive(Debug, Serialize, Clone)]
pub struct HealthStatus {
    pub status: HealthState,
    pub checks: HashMap<String, ComponentHealth>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Overall health state
#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HealthState {
    Healthy,
    Unhealthy,
}

/// Individual component health status
#[derive(Debug, Serialize, Clone)]
pub struct ComponentHealth {
    pub status: ComponentState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u128>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ComponentState {
    Up,
    Down,
}

impl HealthStatus {
    pub fn new() -> Self {
        Self {
            status: HealthState::Healthy,
            checks: HashMap::new(),
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn is_healthy(&self) -> bool {
        matches!(self.status, HealthState::Healthy)
    }

    fn record(&mut self, component: &str, health: ComponentHealth) {
        if health.status == ComponentState::Down {
            self.status = HealthState::Unhealthy;
        }
        self.checks.insert(component.to_string(), health);
    }
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentHealth {
    pub fn up(response_time_ms: Option<u128>) -> Self {
        Self {
            status: ComponentState::Up,
            response_time_ms,
            details: None,
        }
    }

    pub fn down(details: Option<String>) -> Self {
        Self {
            status: ComponentState::Down,
            response_time_ms: None,
            details,
        }
    }
}

#[derive(Clone, Default)]
pub struct HealthChecker {
    #[cfg(feature = "database")]
    db_pool: Option<sqlx::PgPool>,
}

impl HealthChecker {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(feature = "database")]
    pub fn with_database(mut self, pool: sqlx::PgPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Checks the Midtrans configuration offline and pings the database, if any.
    pub async fn check_health(&self, config: &MidtransConfig) -> HealthStatus {
        let mut health_status = HealthStatus::new();

        match config.validate() {
            Ok(()) => health_status.record("midtrans", ComponentHealth::up(None)),
            Err(e) => {
                error!(error = %e, "Midtrans configuration check failed");
                health_status.record("midtrans", ComponentHealth::down(Some(e.to_string())));
            }
        }

        #[cfg(feature = "database")]
        if let Some(pool) = &self.db_pool {
            match timeout(Duration::from_secs(5), check_database_health(pool)).await {
                Ok(Ok(response_time)) => {
                    info!("Database health check: OK ({}ms)", response_time);
                    health_status.record("database", ComponentHealth::up(Some(response_time)));
                }
                Ok(Err(e)) => {
                    error!("Database health check failed: {}", e);
                    health_status.record("database", ComponentHealth::down(Some(e)));
                }
                Err(_) => {
                    error!("Database health check timed out");
                    health_status.record(
                        "database",
                        ComponentHealth::down(Some("timeout".to_string())),
                    );
                }
            }
        }

        if health_status.is_healthy() {
            info!("Health check passed");
        }
        health_status
    }
}

#[cfg(feature = "database")]
async fn check_database_health(pool: &sqlx::PgPool) -> Result<u128, String> {
    let start = Instant::now();
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map_err(|e| e.to_string())?;
    Ok(start.elapsed().as_millis())
}
