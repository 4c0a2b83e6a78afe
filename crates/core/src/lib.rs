//! Core pipeline logic for Billflow.
//!
//! This crate contains the billing statement pipeline with ZERO web or
//! database dependencies. Persistence and the ERP source sit behind traits
//! implemented elsewhere.
//!
//! # Modules
//!
//! - `calendar` - Business-day computation for fallback due dates
//! - `record` - Bill record model and its flag state machine
//! - `bundle` - Frozen bill-data bundle and derived render fields
//! - `erp` - ERP source boundary and correlation-key policy
//! - `enrollment` - Target selection, deduplication and aggregation
//! - `profile` - Per-business template visibility profiles
//! - `render` - HTML and Excel statement rendering
//! - `storage` - Vendor-agnostic file storage
//! - `dispatch` - Notification content, gateways and the dispatch engine
//! - `pipeline` - Trigger surface over all stages

pub mod bundle;
pub mod calendar;
pub mod dispatch;
pub mod enrollment;
pub mod erp;
pub mod pipeline;
pub mod profile;
pub mod record;
pub mod render;
pub mod storage;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;
