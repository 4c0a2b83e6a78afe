//! Dispatch engine.
//!
//! Selects send-ready records, assembles the notification, calls the
//! gateway and records every attempt.
//!
//! # Modules
//!
//! - `content` - Subject/body variables and their defaults
//! - `gateway` - Gateway trait, request type and transport selection
//! - `http` - JSON-over-HTTP transport
//! - `smtp` - SMTP transport with storage-backed attachments
//! - `service` - Automated and manual dispatch
//! - `error` - Gateway and dispatch errors

pub mod content;
pub mod error;
pub mod gateway;
pub mod http;
pub mod service;
pub mod smtp;


pub use content::{ContentAssembler, MailContent, MailVariables};
pub use error::{DispatchError, GatewayError};
pub use gateway::{Gateway, NotificationGateway, NotificationRequest};
pub use http::HttpNotificationGateway;
pub use service::{DispatchOptions, DispatchOutcome, DispatchReport, DispatchService};
pub use smtp::SmtpNotificationGateway;
