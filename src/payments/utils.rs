use crate::payments::error::{PaymentError, PaymentResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::warn;

/// Thin JSON client for the Midtrans APIs. Each call is attempted once; the
/// host decides whether to retry.
#[derive(Clone)]
pub struct PaymentHttpClient {
    client: Client,
}

impl PaymentHttpClient {
    pub fn new(connect_timeout: Duration) -> PaymentResult<Self> {
        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| PaymentError::RemoteServiceError {
                message: format!("failed to initialize HTTP client: {}", e),
            })?;

        Ok(Self { client })
    }

    pub async fn request_json<T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        url: &str,
        server_key: &str,
        body: Option<&JsonValue>,
        timeout: Duration,
    ) -> PaymentResult<T> {
        let mut request = self
            .client
            .request(method, url)
            .timeout(timeout)
            .header("Accept", "application/json")
            .header("Authorization", basic_auth_header(server_key));
        if let Some(payload) = body {
            request = request.json(payload);
        }

        let response = request
            .send()
            .await
            .map_err(|e| PaymentError::RemoteServiceError {
                message: if e.is_timeout() {
                    format!("request to midtrans timed out after {:?}", timeout)
                } else {
                    format!("request to midtrans failed: {}", e)
                },
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| PaymentError::RemoteServiceError {
                message: format!("failed to read midtrans response: {}", e),
            })?;

        if !status.is_success() {
            let message = remote_error_message(&text)
                .unwrap_or_else(|| format!("HTTP {}: {}", status, text));
            warn!(status = %status, error = %message, "midtrans returned an error response");
            return Err(PaymentError::RemoteServiceError { message });
        }

        serde_json::from_str::<T>(&text).map_err(|e| PaymentError::RemoteServiceError {
            message: format!("invalid midtrans JSON response: {}", e),
        })
    }
}

/// `Basic base64(server_key + ":")`, the scheme both Snap and the Core API
/// expect.
pub fn basic_auth_header(server_key: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:", server_key)))
}

#[derive(Debug, Deserialize)]
struct RemoteErrorBody {
    #[serde(default)]
    error_messages: Vec<String>,
    #[serde(default)]
    status_message: Option<String>,
}

/// Pulls the human-readable message out of a Midtrans error body.
pub fn remote_error_message(body: &str) -> Option<String> {
    let parsed: RemoteErrorBody = serde_json::from_str(body).ok()?;
    if !parsed.error_messages.is_empty() {
        return Some(parsed.error_messages.join("; "));
    }
    parsed.status_message
}
