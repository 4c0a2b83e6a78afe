//! Storage service for templates and rendered statements using Apache OpenDAL.
//!
//! This module provides vendor-agnostic object storage with support for:
//! - S3-compatible: Cloudflare R2, Supabase Storage, AWS S3, DigitalOcean Spaces
//! - Azure Blob Storage
//! - Local filesystem
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Apache OpenDAL                              │
//! │                   (Unified Storage API)                          │
//! ├─────────────────────────────────────────────────────────────────┤
//! │ op.write("key", data)      │ op.read("key")                      │
//! │ op.stat("key")             │ directories created on write        │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

mod error;
mod service;

pub use error::StorageError;
pub use service::{StorageService, join_key, sanitize_filename};
