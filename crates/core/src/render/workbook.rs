//! `umya-spreadsheet` adapter for the ledger template.

use std::io::Cursor;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use umya_spreadsheet::{Image, Spreadsheet, Worksheet};

use super::error::RenderError;
use super::excel::LedgerSheet;
use super::stamp::DrawingAnchor;

/// Reads a workbook from template bytes.
///
/// # Errors
///
/// Returns `Spreadsheet` if the bytes are not a readable `.xlsx`.
pub fn read_workbook(bytes: &[u8]) -> Result<Spreadsheet, RenderError> {
    umya_spreadsheet::reader::xlsx::read_reader(Cursor::new(bytes), true)
        .map_err(|e| RenderError::Spreadsheet(format!("read: {e}")))
}

/// Serializes a workbook to `.xlsx` bytes.
///
/// # Errors
///
/// Returns `Spreadsheet` if writing fails.
pub fn write_workbook(book: &Spreadsheet) -> Result<Vec<u8>, RenderError> {
    let mut cursor = Cursor::new(Vec::new());
    umya_spreadsheet::writer::xlsx::write_writer(book, &mut cursor)
        .map_err(|e| RenderError::Spreadsheet(format!("write: {e}")))?;
    Ok(cursor.into_inner())
}

/// The first worksheet of the ledger template.
///
/// # Errors
///
/// Returns `Spreadsheet` if the workbook has no sheets.
pub fn first_sheet(book: &mut Spreadsheet) -> Result<WorksheetLedger<'_>, RenderError> {
    book.get_sheet_mut(&0)
        .map(|sheet| WorksheetLedger { sheet })
        .ok_or_else(|| RenderError::Spreadsheet("template has no worksheet".to_string()))
}

/// [`LedgerSheet`] over a `umya-spreadsheet` worksheet.
pub struct WorksheetLedger<'a> {
    sheet: &'a mut Worksheet,
}

impl LedgerSheet for WorksheetLedger<'_> {
    fn set_text(&mut self, col: u32, row: u32, value: &str) {
        self.sheet.get_cell_mut((col, row)).set_value(value);
    }

    fn set_amount(&mut self, col: u32, row: u32, amount: Decimal, format: &str) {
        // Cell boundary: the xlsx number model is f64.
        let number = amount.to_f64().unwrap_or_default();
        self.sheet.get_cell_mut((col, row)).set_value_number(number);
        self.sheet
            .get_style_mut((col, row))
            .get_number_format_mut()
            .set_format_code(format);
    }

    fn clear(&mut self, col: u32, row: u32) {
        if self.sheet.get_cell((col, row)).is_some() {
            self.sheet.get_cell_mut((col, row)).set_value("");
        }
    }

    fn hide_column(&mut self, col: u32) {
        self.sheet
            .get_column_dimension_by_number_mut(&col)
            .set_hidden(true);
    }

    fn remove_drawings(&mut self, is_match: &dyn Fn(&DrawingAnchor) -> bool) -> usize {
        let images = self.sheet.get_image_collection_mut();
        let before = images.len();
        images.retain(|image| image_anchor(image).is_none_or(|anchor| !is_match(&anchor)));
        before - images.len()
    }
}

/// Anchor markers of an embedded picture; one-cell anchors have no span.
fn image_anchor(image: &Image) -> Option<DrawingAnchor> {
    if let Some(anchor) = image.get_two_cell_anchor() {
        let from = anchor.get_from_marker();
        let to = anchor.get_to_marker();
        return Some(DrawingAnchor::new(
            *from.get_col(),
            *from.get_row(),
            *to.get_col(),
            *to.get_row(),
        ));
    }
    image.get_one_cell_anchor().map(|anchor| {
        let from = anchor.get_from_marker();
        DrawingAnchor::new(*from.get_col(), *from.get_row(), *from.get_col(), *from.get_row())
    })
}
