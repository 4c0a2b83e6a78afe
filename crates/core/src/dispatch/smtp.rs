//! SMTP notification gateway.
//!
//! Uses `lettre` for SMTP transport. The attachment is read from storage
//! and sent alongside the HTML body.

use std::time::Duration;

use billflow_shared::config::{GatewayConfig, SmtpConfig};
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::error::GatewayError;
use super::gateway::{NotificationGateway, NotificationRequest};
use crate::record::GatewayResponse;
use crate::storage::StorageService;

/// Delivers notifications directly over SMTP.
pub struct SmtpNotificationGateway {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    storage: StorageService,
    success_code: String,
    timeout: Duration,
}

impl SmtpNotificationGateway {
    /// Creates the gateway.
    ///
    /// # Errors
    ///
    /// Returns an error if the SMTP relay cannot be configured.
    pub fn new(config: &GatewayConfig, storage: StorageService) -> Result<Self, GatewayError> {
        Ok(Self {
            transport: Self::create_transport(&config.smtp, config.timeout())?,
            storage,
            success_code: config.success_code.clone(),
            timeout: config.timeout(),
        })
    }

    /// Creates an SMTP transport; without credentials a plain local relay
    /// is used.
    fn create_transport(
        smtp: &SmtpConfig,
        timeout: Duration,
    ) -> Result<AsyncSmtpTransport<Tokio1Executor>, GatewayError> {
        if smtp.username.is_empty() {
            return Ok(AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&smtp.host)
                .port(smtp.port)
                .timeout(Some(timeout))
                .build());
        }

        let creds = Credentials::new(smtp.username.clone(), smtp.password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(&smtp.host)
            .map_err(|e| GatewayError::Transport(e.to_string()))?
            .port(smtp.port)
            .credentials(creds)
            .timeout(Some(timeout))
            .build();
        Ok(transport)
    }

    async fn build_message(&self, request: &NotificationRequest) -> Result<Message, GatewayError> {
        let from = format!("{} <{}>", request.from_name, request.from_address);
        let mut builder = Message::builder()
            .from(parse_mailbox(&from)?)
            .to(parse_mailbox(&request.recipient)?)
            .subject(request.subject.clone());
        if let Some(cc) = &request.cc {
            builder = builder.cc(parse_mailbox(cc)?);
        }

        let bytes = self
            .storage
            .read(&request.attachment_path)
            .await
            .map_err(|e| GatewayError::Attachment(e.to_string()))?;
        let content_type = ContentType::parse(content_type_for(&request.attachment_name))
            .map_err(|e| GatewayError::InvalidRequest(e.to_string()))?;
        let attachment = Attachment::new(request.attachment_name.clone()).body(bytes, content_type);

        builder
            .multipart(
                MultiPart::mixed()
                    .singlepart(SinglePart::html(request.html_body.clone()))
                    .singlepart(attachment),
            )
            .map_err(|e| GatewayError::InvalidRequest(e.to_string()))
    }
}

impl NotificationGateway for SmtpNotificationGateway {
    async fn send(&self, request: &NotificationRequest) -> Result<GatewayResponse, GatewayError> {
        let message = self.build_message(request).await?;
        let key = message
            .headers()
            .get_raw("Message-ID")
            .unwrap_or_default()
            .to_string();

        let response = tokio::time::timeout(self.timeout, self.transport.send(message))
            .await
            .map_err(|_| GatewayError::Timeout(self.timeout.as_secs()))?
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let code = if response.is_positive() {
            self.success_code.clone()
        } else {
            response.code().to_string()
        };
        Ok(GatewayResponse {
            code,
            message: response
                .message()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" "),
            key,
        })
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, GatewayError> {
    address
        .parse()
        .map_err(|e| GatewayError::InvalidRequest(format!("invalid address {address}: {e}")))
}

fn content_type_for(name: &str) -> &'static str {
    if name.ends_with(".xlsx") {
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    } else if name.ends_with(".html") {
        "text/html; charset=utf-8"
    } else {
        "application/octet-stream"
    }
}
