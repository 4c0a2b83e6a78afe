//! Application configuration management.
//!
//! Every external collaborator is configured explicitly here and handed to
//! its adapter at construction time.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::types::{GridRegion, HeaderCell, SizeBand};

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration.
    pub database: DatabaseConfig,
    /// File storage configuration.
    #[serde(default)]
    pub storage: StorageSettings,
    /// ERP bridge configuration.
    pub erp: ErpConfig,
    /// Notification gateway configuration.
    #[serde(default)]
    pub gateway: GatewayConfig,
    /// Rendering stage configuration.
    #[serde(default)]
    pub render: RenderConfig,
    /// Dispatch stage configuration.
    #[serde(default)]
    pub dispatch: DispatchConfig,
    /// Business calendar configuration.
    #[serde(default)]
    pub calendar: CalendarConfig,
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones overriding earlier ones:
    /// `config/default.toml`, `config/{RUN_MODE}.toml`, `BILLFLOW__*` env vars.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("BILLFLOW").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

/// Storage provider configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StorageProvider {
    /// S3-compatible storage: Cloudflare R2, Supabase, AWS S3, DigitalOcean Spaces
    S3 {
        /// S3 endpoint URL.
        endpoint: String,
        /// S3 bucket name.
        bucket: String,
        /// AWS access key ID.
        access_key_id: String,
        /// AWS secret access key.
        secret_access_key: String,
        /// AWS region.
        region: String,
    },
    /// Azure Blob Storage
    AzureBlob {
        /// Azure storage account name.
        account: String,
        /// Azure storage access key.
        access_key: String,
        /// Azure container name.
        container: String,
    },
    /// Local filesystem
    LocalFs {
        /// Root directory path.
        root: PathBuf,
    },
}

impl StorageProvider {
    /// Create local filesystem provider.
    #[must_use]
    pub fn local_fs(root: impl Into<PathBuf>) -> Self {
        Self::LocalFs { root: root.into() }
    }

    /// Get the provider name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::S3 { .. } => "s3",
            Self::AzureBlob { .. } => "azure_blob",
            Self::LocalFs { .. } => "local",
        }
    }
}

/// File storage settings.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    /// Backend provider.
    #[serde(default = "default_storage_provider")]
    pub provider: StorageProvider,
    /// Key prefix under which master templates live.
    #[serde(default = "default_template_prefix")]
    pub template_prefix: String,
    /// Key prefix under which rendered artifacts are written.
    #[serde(default = "default_output_prefix")]
    pub output_prefix: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            provider: default_storage_provider(),
            template_prefix: default_template_prefix(),
            output_prefix: default_output_prefix(),
        }
    }
}

fn default_storage_provider() -> StorageProvider {
    StorageProvider::local_fs("./storage")
}

fn default_template_prefix() -> String {
    "templates".to_string()
}

fn default_output_prefix() -> String {
    "statements".to_string()
}

/// ERP bridge configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ErpConfig {
    /// Base URL of the ERP bridge service.
    pub base_url: String,
    /// Optional API key sent as a bearer token.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Per-call timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl ErpConfig {
    /// Per-call timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_timeout_secs() -> u64 {
    30
}

/// Notification transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GatewayKind {
    /// JSON over HTTP to the notification gateway.
    #[default]
    Http,
    /// Direct SMTP delivery.
    Smtp,
}

/// Notification gateway configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Which transport to use.
    #[serde(default)]
    pub kind: GatewayKind,
    /// Gateway endpoint URL (HTTP transport).
    #[serde(default)]
    pub endpoint: String,
    /// Response code that denotes a successful send.
    #[serde(default = "default_success_code")]
    pub success_code: String,
    /// Per-send timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Sender display name.
    #[serde(default = "default_from_name")]
    pub from_name: String,
    /// Sender address.
    #[serde(default = "default_from_address")]
    pub from_address: String,
    /// Fixed routing metadata attached to every request.
    #[serde(default)]
    pub routing: BTreeMap<String, String>,
    /// SMTP settings (SMTP transport).
    #[serde(default)]
    pub smtp: SmtpConfig,
}

impl GatewayConfig {
    /// Per-send timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            kind: GatewayKind::default(),
            endpoint: String::new(),
            success_code: default_success_code(),
            timeout_secs: default_timeout_secs(),
            from_name: default_from_name(),
            from_address: default_from_address(),
            routing: BTreeMap::new(),
            smtp: SmtpConfig::default(),
        }
    }
}

fn default_success_code() -> String {
    "200".to_string()
}

fn default_from_name() -> String {
    "Billing".to_string()
}

fn default_from_address() -> String {
    "noreply@localhost".to_string()
}

/// SMTP transport configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
    /// SMTP host.
    #[serde(default = "default_smtp_host")]
    pub host: String,
    /// SMTP port.
    #[serde(default = "default_smtp_port")]
    pub port: u16,
    /// SMTP username.
    #[serde(default)]
    pub username: String,
    /// SMTP password.
    #[serde(default)]
    pub password: String,
}

impl Default for SmtpConfig {
    fn default() -> Self {
        Self {
            host: default_smtp_host(),
            port: default_smtp_port(),
            username: String::new(),
            password: String::new(),
        }
    }
}

fn default_smtp_host() -> String {
    "localhost".to_string()
}

fn default_smtp_port() -> u16 {
    1025
}

/// What to do when a business has no visibility profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingProfilePolicy {
    /// Render with every optional section and column visible.
    #[default]
    Default,
    /// Fail the record.
    Fail,
}

/// Rendering stage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    /// HTML master template key (relative to the template prefix).
    #[serde(default = "default_html_template")]
    pub html_template: String,
    /// Excel master template key (relative to the template prefix).
    #[serde(default = "default_excel_template")]
    pub excel_template: String,
    /// Per-record failures tolerated before the batch aborts.
    #[serde(default = "default_skip_limit")]
    pub skip_limit: u32,
    /// Records fetched per page.
    #[serde(default = "default_page_size")]
    pub page_size: u64,
    /// Missing visibility profile policy.
    #[serde(default)]
    pub missing_profile: MissingProfilePolicy,
    /// Excel ledger layout.
    #[serde(default)]
    pub excel: ExcelLayoutConfig,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            html_template: default_html_template(),
            excel_template: default_excel_template(),
            skip_limit: default_skip_limit(),
            page_size: default_page_size(),
            missing_profile: MissingProfilePolicy::default(),
            excel: ExcelLayoutConfig::default(),
        }
    }
}

fn default_html_template() -> String {
    "statement.html".to_string()
}

fn default_excel_template() -> String {
    "ledger.xlsx".to_string()
}

fn default_skip_limit() -> u32 {
    10
}

fn default_page_size() -> u64 {
    100
}

/// Excel ledger layout.
#[derive(Debug, Clone, Deserialize)]
pub struct ExcelLayoutConfig {
    /// First line-item row (one-based).
    #[serde(default = "default_data_start_row")]
    pub data_start_row: u32,
    /// Last row blanked when a column is hidden (one-based).
    #[serde(default = "default_data_end_row")]
    pub data_end_row: u32,
    /// Label written into the first visible column of the totals row.
    #[serde(default = "default_totals_label")]
    pub totals_label: String,
    /// Drawing regions where a stamp image may be anchored.
    #[serde(default = "default_stamp_regions")]
    pub stamp_regions: Vec<GridRegion>,
    /// Bounding-box spans typical of stamp images.
    #[serde(default = "default_stamp_size_bands")]
    pub stamp_size_bands: Vec<SizeBand>,
    /// Header cells filled from scalar placeholders.
    #[serde(default = "default_header_cells")]
    pub header_cells: Vec<HeaderCell>,
}

impl Default for ExcelLayoutConfig {
    fn default() -> Self {
        Self {
            data_start_row: default_data_start_row(),
            data_end_row: default_data_end_row(),
            totals_label: default_totals_label(),
            stamp_regions: default_stamp_regions(),
            stamp_size_bands: default_stamp_size_bands(),
            header_cells: default_header_cells(),
        }
    }
}

fn default_data_start_row() -> u32 {
    12
}

fn default_data_end_row() -> u32 {
    500
}

fn default_totals_label() -> String {
    "TOTAL".to_string()
}

fn default_stamp_regions() -> Vec<GridRegion> {
    vec![
        GridRegion::new(20, 0, 25, 5),
        GridRegion::new(20, 5, 25, 10),
        GridRegion::new(0, 0, 3, 4),
        GridRegion::new(8, 4, 12, 9),
    ]
}

fn default_stamp_size_bands() -> Vec<SizeBand> {
    vec![
        SizeBand::new(1, 1, 2, 4),
        SizeBand::new(2, 2, 3, 5),
        SizeBand::new(3, 3, 5, 7),
    ]
}

fn default_header_cells() -> Vec<HeaderCell> {
    vec![
        HeaderCell {
            column: 2,
            row: 3,
            placeholder: "name1".to_string(),
        },
        HeaderCell {
            column: 2,
            row: 4,
            placeholder: "stcd2".to_string(),
        },
        HeaderCell {
            column: 2,
            row: 5,
            placeholder: "billPeriod".to_string(),
        },
        HeaderCell {
            column: 2,
            row: 6,
            placeholder: "totalAmount_FMT".to_string(),
        },
        HeaderCell {
            column: 2,
            row: 7,
            placeholder: "dueDate_DOT".to_string(),
        },
    ]
}

/// Which rendered artifact is attached to the notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    /// The HTML statement.
    #[default]
    Html,
    /// The Excel ledger.
    Excel,
}

/// Dispatch stage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DispatchConfig {
    /// Notification body template key (relative to the template prefix).
    #[serde(default = "default_mail_template")]
    pub mail_template: String,
    /// Subject line template.
    #[serde(default = "default_subject_template")]
    pub subject_template: String,
    /// Fixed pause between consecutive sends, in milliseconds.
    #[serde(default = "default_throttle_millis")]
    pub throttle_millis: u64,
    /// Cap on automatic attempts per record; unset means unbounded.
    #[serde(default)]
    pub max_attempts: Option<u32>,
    /// Artifact attached to the notification.
    #[serde(default)]
    pub attachment: AttachmentKind,
    /// Substituted when the customer name is missing.
    #[serde(default = "default_customer_label")]
    pub default_customer_label: String,
}

impl DispatchConfig {
    /// Fixed pause between consecutive sends.
    #[must_use]
    pub const fn throttle(&self) -> Duration {
        Duration::from_millis(self.throttle_millis)
    }
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            mail_template: default_mail_template(),
            subject_template: default_subject_template(),
            throttle_millis: default_throttle_millis(),
            max_attempts: None,
            attachment: AttachmentKind::default(),
            default_customer_label: default_customer_label(),
        }
    }
}

fn default_mail_template() -> String {
    "mail.html".to_string()
}

fn default_subject_template() -> String {
    "[${customerName}] ${billYear}.${billMonth} billing statement".to_string()
}

fn default_throttle_millis() -> u64 {
    1000
}

fn default_customer_label() -> String {
    "Customer".to_string()
}

/// Business calendar configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CalendarConfig {
    /// Time zone that defines "today" for scheduling.
    #[serde(default = "default_timezone")]
    pub timezone: Tz,
    /// Holidays recurring every year, as `MM-DD`.
    #[serde(default = "default_fixed_holidays")]
    pub fixed_holidays: Vec<String>,
    /// One-off holidays (lunar holidays, substitute days).
    #[serde(default)]
    pub extra_holidays: Vec<NaiveDate>,
}

impl Default for CalendarConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            fixed_holidays: default_fixed_holidays(),
            extra_holidays: Vec::new(),
        }
    }
}

fn default_timezone() -> Tz {
    chrono_tz::Asia::Seoul
}

fn default_fixed_holidays() -> Vec<String> {
    ["01-01", "03-01", "05-05", "06-06", "08-15", "10-03", "10-09", "12-25"]
        .into_iter()
        .map(String::from)
        .collect()
}
