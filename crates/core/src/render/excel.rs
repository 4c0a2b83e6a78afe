//! Excel ledger filling.
//!
//! The filler works against [`LedgerSheet`] so the layout rules can be
//! exercised without a workbook; `workbook` adapts a real worksheet.

use std::collections::BTreeMap;

use billflow_shared::config::ExcelLayoutConfig;
use rust_decimal::Decimal;
use tracing::debug;

use super::stamp::{DrawingAnchor, StampHeuristic};
use crate::bundle::{BillDataBundle, CellValue, LedgerColumn, RenderContext};
use crate::profile::TemplateVisibilityProfile;

/// Zero-decimal thousands-separated number format.
pub const AMOUNT_FORMAT: &str = "#,##0";

/// Cell-level operations the ledger filler needs. Coordinates are one-based.
pub trait LedgerSheet {
    /// Writes text into a cell.
    fn set_text(&mut self, col: u32, row: u32, value: &str);

    /// Writes an amount into a cell with a number format.
    fn set_amount(&mut self, col: u32, row: u32, amount: Decimal, format: &str);

    /// Blanks a cell.
    fn clear(&mut self, col: u32, row: u32);

    /// Hides a column.
    fn hide_column(&mut self, col: u32);

    /// Removes every drawing matching `is_match`; returns how many were removed.
    fn remove_drawings(&mut self, is_match: &dyn Fn(&DrawingAnchor) -> bool) -> usize;
}

/// What was written to the ledger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerTotals {
    /// Line items written.
    pub rows: u32,
    /// Sheet row holding the totals.
    pub totals_row: u32,
    /// Running sums of the summed columns.
    pub sums: BTreeMap<LedgerColumn, Decimal>,
    /// Sum of the per-row totals.
    pub row_total: Decimal,
    /// Stamp drawings removed.
    pub stamps_removed: usize,
}

/// Fills the ledger template for one bundle.
#[derive(Debug, Clone)]
pub struct ExcelRenderer {
    layout: ExcelLayoutConfig,
    stamp: StampHeuristic,
}

impl ExcelRenderer {
    /// Creates a renderer for the configured layout.
    #[must_use]
    pub fn new(layout: ExcelLayoutConfig) -> Self {
        let stamp = StampHeuristic::from_layout(&layout);
        Self { layout, stamp }
    }

    /// Fills header cells, hides columns, removes stamps and writes the
    /// line items followed by a totals row.
    pub fn fill<S: LedgerSheet>(
        &self,
        sheet: &mut S,
        context: &RenderContext,
        bundle: &BillDataBundle,
        profile: &TemplateVisibilityProfile,
    ) -> LedgerTotals {
        let mut totals = LedgerTotals::default();

        for cell in &self.layout.header_cells {
            let value = context.scalar(&cell.placeholder).unwrap_or_default();
            sheet.set_text(cell.column, cell.row, &value);
        }

        for column in profile.hidden_columns() {
            let col = column.position();
            for row in self.layout.data_start_row..=self.layout.data_end_row {
                sheet.clear(col, row);
            }
            sheet.hide_column(col);
        }

        if !profile.show_stamp {
            totals.stamps_removed = sheet.remove_drawings(&|anchor| self.stamp.is_stamp(anchor));
            debug!(removed = totals.stamps_removed, "stamp drawings removed");
        }

        let visible: Vec<LedgerColumn> = LedgerColumn::ALL
            .into_iter()
            .filter(|column| profile.column_visible(*column))
            .collect();

        let mut row = self.layout.data_start_row;
        for item in &bundle.items {
            for column in &visible {
                match item.value(*column) {
                    CellValue::Text(text) => sheet.set_text(column.position(), row, text),
                    CellValue::Amount(amount) => {
                        sheet.set_amount(column.position(), row, amount, AMOUNT_FORMAT);
                    }
                }
            }
            for column in LedgerColumn::ALL.into_iter().filter(LedgerColumn::is_summed) {
                if let CellValue::Amount(amount) = item.value(column) {
                    *totals.sums.entry(column).or_insert(Decimal::ZERO) += amount;
                }
            }
            let row_total = item.row_total();
            sheet.set_amount(LedgerColumn::ROW_TOTAL_COLUMN, row, row_total, AMOUNT_FORMAT);
            totals.row_total += row_total;
            totals.rows += 1;
            row += 1;
        }

        totals.totals_row = row;
        if let Some(label_column) = visible.iter().find(|column| !column.is_monetary()) {
            sheet.set_text(label_column.position(), row, &self.layout.totals_label);
        }
        for column in visible.iter().filter(|column| column.is_summed()) {
            let sum = totals.sums.get(column).copied().unwrap_or(Decimal::ZERO);
            sheet.set_amount(column.position(), row, sum, AMOUNT_FORMAT);
        }
        sheet.set_amount(
            LedgerColumn::ROW_TOTAL_COLUMN,
            row,
            totals.row_total,
            AMOUNT_FORMAT,
        );

        totals
    }
}
