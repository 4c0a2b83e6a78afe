//! Repository implementations of the core persistence traits.
//!
//! Repositories hide the `SeaORM` details from the pipeline services.

pub mod bill_record;
pub mod checkpoint;
pub mod profile;

pub use bill_record::BillRecordRepository;
pub use checkpoint::CheckpointRepository;
pub use profile::ProfileRepository;
