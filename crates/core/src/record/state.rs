//! Record flag states and their legal transitions.
//!
//! Flags persist as single-letter codes: `N` pending, `Y` done, `E` failed.
//! The valid transitions are:
//! - file creation: N → Y (rendered), N → E (failed), Y → Y (re-rendered)
//! - mail send: N → Y (sent)

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::RecordError;

/// File creation state of a bill record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileCreateState {
    /// Not yet rendered (`N`).
    Pending,
    /// Statement files rendered (`Y`).
    Created,
    /// Rendering failed; needs manual correction (`E`).
    Failed,
}

impl FileCreateState {
    /// Returns the persisted flag code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Pending => "N",
            Self::Created => "Y",
            Self::Failed => "E",
        }
    }

    /// Parses a persisted flag code.
    pub fn parse(code: &str) -> Option<Self> {
        match code.trim() {
            "N" => Some(Self::Pending),
            "Y" => Some(Self::Created),
            "E" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Returns true if moving to `to` is allowed.
    #[must_use]
    pub fn can_transition(&self, to: Self) -> bool {
        matches!(
            (self, to),
            (Self::Pending, Self::Created | Self::Failed) | (Self::Created, Self::Created)
        )
    }

    /// Validates a transition and returns the target state.
    ///
    /// # Errors
    ///
    /// Returns `InvalidFileTransition` for any regression.
    pub fn transition(self, to: Self) -> Result<Self, RecordError> {
        if self.can_transition(to) {
            Ok(to)
        } else {
            Err(RecordError::InvalidFileTransition { from: self, to })
        }
    }
}

impl fmt::Display for FileCreateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Mail send state of a bill record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MailSendState {
    /// Not yet sent (`N`).
    Pending,
    /// Sent successfully (`Y`).
    Sent,
}

impl MailSendState {
    /// Returns the persisted flag code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Pending => "N",
            Self::Sent => "Y",
        }
    }

    /// Parses a persisted flag code.
    pub fn parse(code: &str) -> Option<Self> {
        match code.trim() {
            "N" => Some(Self::Pending),
            "Y" => Some(Self::Sent),
            _ => None,
        }
    }

    /// Validates a transition and returns the target state.
    ///
    /// # Errors
    ///
    /// Returns `InvalidMailTransition` for anything but N → Y.
    pub fn transition(self, to: Self) -> Result<Self, RecordError> {
        match (self, to) {
            (Self::Pending, Self::Sent) => Ok(to),
            _ => Err(RecordError::InvalidMailTransition { from: self, to }),
        }
    }
}

impl fmt::Display for MailSendState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Encodes a yes/no flag.
#[must_use]
pub fn flag_code(value: bool) -> &'static str {
    if value { "Y" } else { "N" }
}

/// Decodes a yes/no flag; anything but `Y` is false.
#[must_use]
pub fn parse_flag(code: &str) -> bool {
    code.trim().eq_ignore_ascii_case("Y")
}
