//! HTTP/JSON client for the ERP bridge service.
//!
//! The bridge fronts the vendor RFC connection and exposes one endpoint per
//! data-retrieval call. The client is configured explicitly; there is no
//! process-wide connection registry.

use std::future::Future;
use std::time::Duration;

use billflow_shared::config::ErpConfig;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::ErpError;
use super::source::ErpSource;
use super::types::{EnrollmentCandidate, ErpQuery};
use crate::bundle::{BillingSummary, CustomerProfile, LineItem, TypeSummary};

/// Response body of the related-lines count endpoint.
#[derive(serde::Deserialize)]
struct CountResponse {
    count: u64,
}

/// ERP bridge client.
#[derive(Clone)]
pub struct HttpErpSource {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpErpSource {
    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &ErpConfig) -> Result<Self, ErpError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ErpError::Connection(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            timeout: config.timeout(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    async fn bounded<T>(&self, call: impl Future<Output = Result<T, ErpError>>) -> Result<T, ErpError> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| ErpError::Timeout(self.timeout.as_secs()))?
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ErpError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ErpError::Status {
                status: status.as_u16(),
                body,
            });
        }
        response
            .json()
            .await
            .map_err(|e| ErpError::Decode(e.to_string()))
    }

    fn send_error(&self, err: &reqwest::Error) -> ErpError {
        if err.is_timeout() {
            ErpError::Timeout(self.timeout.as_secs())
        } else {
            ErpError::Connection(err.to_string())
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ErpError> {
        self.bounded(async {
            let mut request = self.client.get(self.url(path));
            if let Some(key) = &self.api_key {
                request = request.bearer_auth(key);
            }
            let response = request.send().await.map_err(|e| self.send_error(&e))?;
            Self::decode(response).await
        })
        .await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ErpError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        self.bounded(async {
            let mut request = self.client.post(self.url(path)).json(body);
            if let Some(key) = &self.api_key {
                request = request.bearer_auth(key);
            }
            let response = request.send().await.map_err(|e| self.send_error(&e))?;
            Self::decode(response).await
        })
        .await
    }
}

impl ErpSource for HttpErpSource {
    async fn list_enrollable(&self) -> Result<Vec<EnrollmentCandidate>, ErpError> {
        self.get_json("enrollable").await
    }

    async fn count_related_lines(&self, query: &ErpQuery) -> Result<u64, ErpError> {
        let response: CountResponse = self.post_json("related-lines/count", query).await?;
        Ok(response.count)
    }

    async fn customer_profile(&self, query: &ErpQuery) -> Result<CustomerProfile, ErpError> {
        self.post_json("customer-profile", query).await
    }

    async fn billing_summary(&self, query: &ErpQuery) -> Result<BillingSummary, ErpError> {
        self.post_json("billing-summary", query).await
    }

    async fn per_type_summary(&self, query: &ErpQuery) -> Result<Vec<TypeSummary>, ErpError> {
        self.post_json("type-summary", query).await
    }

    async fn line_items(&self, query: &ErpQuery) -> Result<Vec<LineItem>, ErpError> {
        self.post_json("line-items", query).await
    }
}
