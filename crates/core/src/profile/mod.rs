//! Per-business template visibility profiles.

pub mod store;
pub mod types;

pub use store::{ProfileError, ProfileStore, resolve_profile};
pub use types::TemplateVisibilityProfile;
