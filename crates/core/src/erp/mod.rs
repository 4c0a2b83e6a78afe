//! ERP source boundary.
//!
//! # Modules
//!
//! - `types` - Enrollment candidates, correlation keys and query parameters
//! - `source` - The read-only `ErpSource` trait
//! - `http` - ERP bridge client over HTTP/JSON
//! - `error` - ERP error types

pub mod error;
pub mod http;
pub mod source;
pub mod types;

pub use error::ErpError;
pub use http::HttpErpSource;
pub use source::ErpSource;
pub use types::{CorrelationKey, EnrollmentCandidate, ErpQuery};
