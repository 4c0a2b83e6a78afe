//! Typed IDs for type-safe entity references.
//!
//! Bill records are keyed by a database sequence, so the ID wraps an `i64`
//! rather than a UUID.

use serde::{Deserialize, Serialize};

/// Sequence identifier of a bill record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BillRecordId(pub i64);

impl BillRecordId {
    /// Returns the inner sequence value.
    #[must_use]
    pub const fn into_inner(self) -> i64 {
        self.0
    }
}

impl From<i64> for BillRecordId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for BillRecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for BillRecordId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
