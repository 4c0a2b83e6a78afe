//! JSON-over-HTTP notification gateway.

use std::time::Duration;

use billflow_shared::config::GatewayConfig;
use serde::Deserialize;

use super::error::GatewayError;
use super::gateway::{NotificationGateway, NotificationRequest};
use crate::bundle::lenient;
use crate::record::GatewayResponse;

/// Response body of the gateway; codes may arrive as numbers.
#[derive(Default, Deserialize)]
#[serde(default)]
struct WireResponse {
    #[serde(deserialize_with = "lenient::text")]
    code: String,
    #[serde(deserialize_with = "lenient::text")]
    message: String,
    #[serde(deserialize_with = "lenient::text")]
    key: String,
}

impl From<WireResponse> for GatewayResponse {
    fn from(wire: WireResponse) -> Self {
        Self {
            code: wire.code,
            message: wire.message,
            key: wire.key,
        }
    }
}

/// Posts each notification to the gateway endpoint.
#[derive(Clone)]
pub struct HttpNotificationGateway {
    client: reqwest::Client,
    endpoint: String,
    timeout: Duration,
}

impl HttpNotificationGateway {
    /// Creates the gateway client.
    ///
    /// # Errors
    ///
    /// Returns an error if the endpoint is empty or the client cannot be built.
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let endpoint = config.endpoint.trim();
        if endpoint.is_empty() {
            return Err(GatewayError::InvalidRequest(
                "gateway.endpoint is required for the http transport".to_string(),
            ));
        }
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            timeout: config.timeout(),
        })
    }

    async fn post(&self, request: &NotificationRequest) -> Result<GatewayResponse, GatewayError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout(self.timeout.as_secs())
                } else {
                    GatewayError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<WireResponse>()
            .await
            .map(GatewayResponse::from)
            .map_err(|e| GatewayError::Transport(format!("undecodable gateway response: {e}")))
    }
}

impl NotificationGateway for HttpNotificationGateway {
    async fn send(&self, request: &NotificationRequest) -> Result<GatewayResponse, GatewayError> {
        tokio::time::timeout(self.timeout, self.post(request))
            .await
            .map_err(|_| GatewayError::Timeout(self.timeout.as_secs()))?
    }
}
