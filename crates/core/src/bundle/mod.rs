//! Bill-data bundle.
//!
//! # Modules
//!
//! - `types` - Typed bundle groups (customer, summary, type summary, items)
//! - `columns` - The 25 optional line-item ledger columns
//! - `derive` - Render lookup context with derived fields
//! - `lenient` - Tolerant deserializers for ERP-sourced values

pub mod columns;
pub mod derive;
pub mod lenient;
pub mod types;

pub use columns::LedgerColumn;
pub use derive::{Fields, RenderContext, SHOW_MORE_THRESHOLD};
pub use types::{BillDataBundle, BillingSummary, CellValue, CustomerProfile, LineItem, TypeSummary};
