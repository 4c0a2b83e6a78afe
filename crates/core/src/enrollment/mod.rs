//! Target selection, deduplication and data aggregation.
//!
//! # Modules
//!
//! - `service` - Candidate loop with the enrollment guard and dedup check
//! - `aggregator` - Four-query bundle assembly and due-date fallback
//! - `error` - Enrollment error types

pub mod aggregator;
pub mod error;
pub mod service;

#[cfg(test)]
mod tests;

pub use aggregator::{DataAggregator, apply_due_date_fallback};
pub use error::EnrollmentError;
pub use service::{EnrollmentOutcome, EnrollmentReport, EnrollmentService};
