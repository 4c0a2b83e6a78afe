//! Shared types, errors, and configuration for Billflow.
//!
//! This crate provides common types used across all other crates:
//! - Amount parsing and thousands-separated formatting
//! - Typed record IDs
//! - Spreadsheet layout geometry (grid regions, size bands, header cells)
//! - Application-wide error types
//! - Configuration management

pub mod config;
pub mod error;
pub mod types;

pub use config::AppConfig;
pub use error::{AppError, AppResult};
