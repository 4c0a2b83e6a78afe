//! Common types used across the application.

pub mod id;
pub mod layout;
pub mod money;

pub use id::BillRecordId;
pub use layout::{GridRegion, HeaderCell, SizeBand};
pub use money::{format_thousands, parse_amount};
