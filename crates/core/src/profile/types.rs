//! Template visibility profile.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::bundle::LedgerColumn;

/// Per-business flags governing which optional sections and columns render.
///
/// A column missing from `columns` is visible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateVisibilityProfile {
    /// Business the profile belongs to.
    pub business_id: String,
    /// Per-column visibility flags.
    pub columns: BTreeMap<LedgerColumn, bool>,
    /// Company stamp image.
    pub show_stamp: bool,
    /// Per-type summary table.
    pub show_type_summary: bool,
    /// Notice block.
    pub show_notice: bool,
    /// Bank account block.
    pub show_bank_account: bool,
    /// Contact block.
    pub show_contact: bool,
    /// Notice guidance text.
    pub notice_text: String,
    /// Bank account guidance text.
    pub bank_account_text: String,
    /// Contact guidance text.
    pub contact_text: String,
}

impl TemplateVisibilityProfile {
    /// Profile with every section and column visible and no free text.
    #[must_use]
    pub fn all_visible(business_id: impl Into<String>) -> Self {
        Self {
            business_id: business_id.into(),
            columns: BTreeMap::new(),
            show_stamp: true,
            show_type_summary: true,
            show_notice: true,
            show_bank_account: true,
            show_contact: true,
            notice_text: String::new(),
            bank_account_text: String::new(),
            contact_text: String::new(),
        }
    }

    /// Hides a column.
    #[must_use]
    pub fn hiding(mut self, column: LedgerColumn) -> Self {
        self.columns.insert(column, false);
        self
    }

    /// Returns true if the column renders.
    #[must_use]
    pub fn column_visible(&self, column: LedgerColumn) -> bool {
        self.columns.get(&column).copied().unwrap_or(true)
    }

    /// Columns whose flag is false, in ledger order.
    #[must_use]
    pub fn hidden_columns(&self) -> Vec<LedgerColumn> {
        LedgerColumn::ALL
            .into_iter()
            .filter(|column| !self.column_visible(*column))
            .collect()
    }
}

impl Default for TemplateVisibilityProfile {
    fn default() -> Self {
        Self::all_visible("")
    }
}
