use crate::logging::mask_secret;
use crate::payments::error::{PaymentError, PaymentResult};
use crate::payments::provider::PaymentProvider;
use crate::payments::types::{NotificationPayload, PaymentSession, SnapToken};
use crate::payments::utils::PaymentHttpClient;
use async_trait::async_trait;
use bigdecimal::{BigDecimal, ToPrimitive};
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::{debug, info};

pub const SANDBOX_SNAP_URL: &str = "https://app.sandbox.midtrans.com";
pub const PRODUCTION_SNAP_URL: &str = "https://app.midtrans.com";
pub const SANDBOX_API_URL: &str = "https://api.sandbox.midtrans.com";
pub const PRODUCTION_API_URL: &str = "https://api.midtrans.com";

/// Gateway settings. Read-only once loaded and passed by reference into
/// every gateway operation.
#[derive(Clone)]
pub struct MidtransConfig {
    pub merchant_id: String,
    pub client_key: String,
    pub server_key: String,
    pub sandbox: bool,
    pub enable_3ds: bool,
    pub timeout_secs: u64,
    pub currency: String,
    pub snap_base_url: Option<String>,
    pub api_base_url: Option<String>,
}

impl Default for MidtransConfig {
    fn default() -> Self {
        Self {
            merchant_id: String::new(),
            client_key: String::new(),
            server_key: String::new(),
            sandbox: false,
            enable_3ds: false,
            timeout_secs: 30,
            currency: "IDR".to_string(),
            snap_base_url: None,
            api_base_url: None,
        }
    }
}

impl std::fmt::Debug for MidtransConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MidtransConfig")
            .field("merchant_id", &self.merchant_id)
            .field("client_key", &self.client_key)
            .field("server_key", &mask_secret(&self.server_key))
            .field("sandbox", &self.sandbox)
            .field("enable_3ds", &self.enable_3ds)
            .field("timeout_secs", &self.timeout_secs)
            .field("currency", &self.currency)
            .field("snap_base_url", &self.snap_base_url)
            .field("api_base_url", &self.api_base_url)
            .finish()
    }
}

impl MidtransConfig {
    pub fn from_env() -> PaymentResult<Self> {
        let defaults = Self::default();
        let config = Self {
            merchant_id: std::env::var("MIDTRANS_MERCHANT_ID").unwrap_or_default(),
            client_key: std::env::var("MIDTRANS_CLIENT_KEY").unwrap_or_default(),
            server_key: std::env::var("MIDTRANS_SERVER_KEY").unwrap_or_default(),
            sandbox: env_flag("MIDTRANS_SANDBOX").unwrap_or(defaults.sandbox),
            enable_3ds: env_flag("MIDTRANS_ENABLE_3DS").unwrap_or(defaults.enable_3ds),
            timeout_secs: std::env::var("MIDTRANS_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(defaults.timeout_secs),
            currency: std::env::var("MIDTRANS_CURRENCY").unwrap_or(defaults.currency),
            snap_base_url: std::env::var("MIDTRANS_SNAP_BASE_URL").ok(),
            api_base_url: std::env::var("MIDTRANS_API_BASE_URL").ok(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects missing credentials. Runs before any remote call.
    pub fn validate(&self) -> PaymentResult<()> {
        for (field, value) in [
            ("merchant_id", &self.merchant_id),
            ("client_key", &self.client_key),
            ("server_key", &self.server_key),
        ] {
            if value.trim().is_empty() {
                return Err(PaymentError::ConfigurationInvalid {
                    field: field.to_string(),
                });
            }
        }
        if self.timeout_secs == 0 {
            return Err(PaymentError::ConfigurationInvalid {
                field: "timeout_secs".to_string(),
            });
        }
        Ok(())
    }

    pub fn snap_base_url(&self) -> &str {
        match &self.snap_base_url {
            Some(url) => url,
            None if self.sandbox => SANDBOX_SNAP_URL,
            None => PRODUCTION_SNAP_URL,
        }
    }

    pub fn api_base_url(&self) -> &str {
        match &self.api_base_url {
            Some(url) => url,
            None if self.sandbox => SANDBOX_API_URL,
            None => PRODUCTION_API_URL,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn env_flag(name: &str) -> Option<bool> {
    std::env::var(name)
        .ok()
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes" | "on"))
}

/// Snap (hosted checkout) and Core API status client.
pub struct MidtransProvider {
    http: PaymentHttpClient,
}

impl MidtransProvider {
    pub fn new() -> PaymentResult<Self> {
        let http = PaymentHttpClient::new(Duration::from_secs(10))?;
        Ok(Self { http })
    }

    fn endpoint(base: &str, segments: &[&str]) -> PaymentResult<Url> {
        let invalid = || PaymentError::ConfigurationInvalid {
            field: format!("base url {}", base),
        };
        let mut url = Url::parse(base).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

/// Request body for `POST /snap/v1/transactions`.
pub fn snap_request_body(config: &MidtransConfig, session: &PaymentSession) -> JsonValue {
    let mut payload = serde_json::json!({
        "transaction_details": {
            "order_id": session.order_id(),
            "gross_amount": amount_json(session.gross_amount()),
        },
        "customer_details": session.customer(),
    });
    if config.enable_3ds {
        payload["credit_card"] = serde_json::json!({ "secure": true });
    }
    payload
}

fn amount_json(amount: &BigDecimal) -> JsonValue {
    if amount.is_integer() {
        if let Some(whole) = amount.to_i64() {
            return JsonValue::from(whole);
        }
    }
    amount
        .to_f64()
        .map(JsonValue::from)
        .unwrap_or_else(|| JsonValue::String(amount.to_string()))
}

#[async_trait]
impl PaymentProvider for MidtransProvider {
    async fn create_session(
        &self,
        config: &MidtransConfig,
        session: &PaymentSession,
    ) -> PaymentResult<SnapToken> {
        let url = Self::endpoint(config.snap_base_url(), &["snap", "v1", "transactions"])?;
        let payload = snap_request_body(config, session);

        let token: SnapToken = self
            .http
            .request_json(
                reqwest::Method::POST,
                url.as_str(),
                &config.server_key,
                Some(&payload),
                config.timeout(),
            )
            .await?;

        info!(order_id = %session.order_id(), "midtrans snap session created");
        Ok(token)
    }

    async fn query_status(
        &self,
        config: &MidtransConfig,
        order_id: &str,
    ) -> PaymentResult<NotificationPayload> {
        let url = Self::endpoint(config.api_base_url(), &["v2", order_id, "status"])?;
        let raw: StatusBody = self
            .http
            .request_json(
                reqwest::Method::GET,
                url.as_str(),
                &config.server_key,
                None,
                config.timeout(),
            )
            .await?;

        // The status API answers 200 with an embedded status_code for unknown orders.
        if raw.payload.transaction_status.is_empty() {
            return Err(PaymentError::RemoteServiceError {
                message: format!(
                    "status query for {} returned {}: {}",
                    order_id,
                    raw.payload.status_code,
                    raw.status_message.unwrap_or_default()
                ),
            });
        }

        debug!(
            order_id = %order_id,
            transaction_status = %raw.payload.transaction_status,
            "midtrans status retrieved"
        );
        Ok(raw.payload)
    }

    fn name(&self) -> &'static str {
        "midtrans"
    }
}

#[derive(Debug, Deserialize)]
struct StatusBody {
    #[serde(flatten)]
    payload: NotificationPayload,
    #[serde(default)]
    status_message: Option<String>,
}
