//! Notification gateway boundary.

use std::collections::BTreeMap;

use billflow_shared::config::{GatewayConfig, GatewayKind};
use serde::Serialize;

use super::error::GatewayError;
use super::http::HttpNotificationGateway;
use super::smtp::SmtpNotificationGateway;
use crate::record::GatewayResponse;
use crate::storage::StorageService;

/// One statement notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    /// Primary recipient.
    pub recipient: String,
    /// Secondary recipient.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cc: Option<String>,
    /// Subject line.
    pub subject: String,
    /// Rendered HTML body.
    pub html_body: String,
    /// Sender display name.
    pub from_name: String,
    /// Sender address.
    pub from_address: String,
    /// Attachment display name.
    pub attachment_name: String,
    /// Attachment storage key.
    pub attachment_path: String,
    /// Fixed routing metadata.
    pub routing: BTreeMap<String, String>,
}

/// Sends notifications. Success is judged by the caller from the response
/// code.
pub trait NotificationGateway: Send + Sync {
    /// Send one notification.
    fn send(
        &self,
        request: &NotificationRequest,
    ) -> impl std::future::Future<Output = Result<GatewayResponse, GatewayError>> + Send;
}

/// Gateway selected by configuration.
pub enum Gateway {
    /// JSON over HTTP.
    Http(HttpNotificationGateway),
    /// SMTP with the attachment read from storage.
    Smtp(SmtpNotificationGateway),
}

impl Gateway {
    /// Builds the configured gateway.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport cannot be initialised.
    pub fn from_config(config: &GatewayConfig, storage: StorageService) -> Result<Self, GatewayError> {
        match config.kind {
            GatewayKind::Http => HttpNotificationGateway::new(config).map(Self::Http),
            GatewayKind::Smtp => SmtpNotificationGateway::new(config, storage).map(Self::Smtp),
        }
    }

    /// Transport name for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Http(_) => "http",
            Self::Smtp(_) => "smtp",
        }
    }
}

impl NotificationGateway for Gateway {
    async fn send(&self, request: &NotificationRequest) -> Result<GatewayResponse, GatewayError> {
        match self {
            Self::Http(gateway) => gateway.send(request).await,
            Self::Smtp(gateway) => gateway.send(request).await,
        }
    }
}
