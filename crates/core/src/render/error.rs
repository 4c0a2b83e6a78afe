//! Render error types.

use billflow_shared::types::BillRecordId;
use thiserror::Error;

use crate::profile::ProfileError;
use crate::record::RecordError;
use crate::storage::StorageError;

/// Template loading and parsing errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TemplateError {
    /// Template object is absent from storage.
    #[error("Template not found: {0}")]
    Missing(String),

    /// Template bytes are not valid UTF-8.
    #[error("Template {0} is not valid UTF-8")]
    NotUtf8(String),

    /// A `BEGIN`/`END` comment that does not follow the marker grammar.
    #[error("Malformed block marker: {0}")]
    MalformedMarker(String),

    /// `SECTION` names an unknown section.
    #[error("Unknown template section: {0}")]
    UnknownSection(String),

    /// `COL` names an unknown ledger column.
    #[error("Unknown ledger column: {0}")]
    UnknownColumn(String),

    /// `ROWS` names a list absent from the render data.
    #[error("Unknown repeated list: {0}")]
    UnknownList(String),

    /// `END` marker with no open block.
    #[error("End marker without begin: {0}")]
    EndWithoutBegin(String),

    /// `END` marker closing a different block than the open one.
    #[error("Block {open} closed by {found}")]
    Mismatched {
        /// Innermost open block.
        open: String,
        /// Block named by the end marker.
        found: String,
    },

    /// Block still open at end of template.
    #[error("Unclosed block: {0}")]
    Unclosed(String),
}

impl TemplateError {
    /// Returns the error code for logs and operator output.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Missing(_) => "TEMPLATE_MISSING",
            Self::NotUtf8(_) => "TEMPLATE_NOT_UTF8",
            Self::MalformedMarker(_) => "TEMPLATE_MALFORMED_MARKER",
            Self::UnknownSection(_) => "TEMPLATE_UNKNOWN_SECTION",
            Self::UnknownColumn(_) => "TEMPLATE_UNKNOWN_COLUMN",
            Self::UnknownList(_) => "TEMPLATE_UNKNOWN_LIST",
            Self::EndWithoutBegin(_) => "TEMPLATE_END_WITHOUT_BEGIN",
            Self::Mismatched { .. } => "TEMPLATE_MISMATCHED_MARKER",
            Self::Unclosed(_) => "TEMPLATE_UNCLOSED_BLOCK",
        }
    }
}

/// Errors raised while rendering statements.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Bundle fields failed validation.
    #[error("Invalid bundle: {0}")]
    Validation(String),

    /// Template missing or unparseable.
    #[error(transparent)]
    Template(#[from] TemplateError),

    /// Visibility profile could not be resolved.
    #[error(transparent)]
    Profile(#[from] ProfileError),

    /// Artifact or template I/O failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Workbook could not be read or written.
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),

    /// Record store failure.
    #[error(transparent)]
    Record(#[from] RecordError),

    /// Record is not in a renderable state.
    #[error("Record {id} is not renderable: {reason}")]
    NotRenderable {
        /// Record id.
        id: BillRecordId,
        /// Why it was rejected.
        reason: String,
    },

    /// Per-record failures exceeded the skip limit.
    #[error("Render batch aborted after {failures} failures (limit {limit})")]
    BatchAborted {
        /// Failures counted so far.
        failures: u32,
        /// Configured skip limit.
        limit: u32,
    },
}

impl RenderError {
    /// Returns true if the failure needs manual correction before a retry
    /// can succeed.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Template(_) | Self::Profile(ProfileError::Missing(_))
        )
    }

    /// Returns the error code for logs and operator output.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "RENDER_VALIDATION",
            Self::Template(err) => err.error_code(),
            Self::Profile(err) => err.error_code(),
            Self::Storage(err) => err.error_code(),
            Self::Spreadsheet(_) => "RENDER_SPREADSHEET",
            Self::Record(err) => err.error_code(),
            Self::NotRenderable { .. } => "RENDER_NOT_RENDERABLE",
            Self::BatchAborted { .. } => "RENDER_BATCH_ABORTED",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_classification() {
        assert!(RenderError::Validation("stcd2".into()).is_terminal());
        assert!(RenderError::Template(TemplateError::Missing("t".into())).is_terminal());
        assert!(RenderError::Profile(ProfileError::Missing("1".into())).is_terminal());
        assert!(!RenderError::Profile(ProfileError::Store("down".into())).is_terminal());
        assert!(!RenderError::Storage(StorageError::Operation("io".into())).is_terminal());
        assert!(!RenderError::Spreadsheet("zip".into()).is_terminal());
    }

    #[test]
    fn test_error_codes_delegate() {
        assert_eq!(
            RenderError::Template(TemplateError::Unclosed("ROWS items".into())).error_code(),
            "TEMPLATE_UNCLOSED_BLOCK"
        );
        assert_eq!(
            RenderError::BatchAborted { failures: 11, limit: 10 }.error_code(),
            "RENDER_BATCH_ABORTED"
        );
    }
}
