//! Bill record store.
//!
//! This module holds the enrollment/job record, its flag state machine and
//! the persistence traits the db crate implements.
//!
//! # Modules
//!
//! - `types` - Record, insert payload, artifacts and dispatch log entries
//! - `state` - File creation and mail send flag states
//! - `repository` - Record and checkpoint persistence traits
//! - `error` - Record-specific error types

pub mod error;
pub mod repository;
pub mod state;
pub mod types;

#[cfg(test)]
mod state_props;

pub use error::RecordError;
pub use repository::{BillRecordRepository, CheckpointStore};
pub use state::{FileCreateState, MailSendState, flag_code, parse_flag};
pub use types::{
    AttemptOutcome, BillRecord, DispatchAttempt, DuplicateProbe, GatewayResponse, NewBillRecord,
    RenderedArtifact, RenderedArtifacts,
};
