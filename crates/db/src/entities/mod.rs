//! `SeaORM` entity definitions.

pub mod batch_checkpoints;
pub mod bill_records;
pub mod dispatch_attempts;
pub mod visibility_profiles;
