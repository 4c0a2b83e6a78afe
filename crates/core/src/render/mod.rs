//! Statement rendering.
//!
//! Turns a record's frozen bundle into an HTML statement and an Excel
//! ledger, shaped by the business's visibility profile.
//!
//! # Modules
//!
//! - `template` - Block-aware template parser (`ROWS`, `SECTION`, `COL`)
//! - `html` - Statement view over the render context
//! - `excel` - Ledger filling against the `LedgerSheet` seam
//! - `workbook` - `umya-spreadsheet` adapter
//! - `stamp` - Stamp picture heuristic
//! - `validate` - Bundle parsing and identity validation
//! - `service` - Batch loop with skip budget and checkpoint cursor
//! - `error` - Template and render errors

pub mod error;
pub mod excel;
pub mod html;
pub mod service;
pub mod stamp;
pub mod template;
pub mod validate;
pub mod workbook;

#[cfg(test)]
mod template_props;
#[cfg(test)]
mod tests;

pub use error::{RenderError, TemplateError};
pub use excel::{AMOUNT_FORMAT, ExcelRenderer, LedgerSheet, LedgerTotals};
pub use html::{StatementView, render_statement};
pub use service::{RENDER_STAGE, RenderOptions, RenderReport, RenderService};
pub use stamp::{DrawingAnchor, StampHeuristic};
pub use template::{Escape, Template, TemplateData, TemplateSection};
pub use validate::{ParsedBundle, parse_bundle};
