//! Stored bundle parsing and identity validation.

use garde::Validate;
use serde_json::Value;

use super::error::RenderError;
use crate::bundle::BillDataBundle;
use crate::validation::{not_blank, six_digits, ten_digits, validate_struct};

/// A stored bundle in both raw (key order preserved) and typed form.
#[derive(Debug, Clone)]
pub struct ParsedBundle {
    /// Raw JSON, used for first-group-wins placeholder lookup.
    pub raw: Value,
    /// Typed view, used for totals and spreadsheet rows.
    pub bundle: BillDataBundle,
}

/// Identity fields that must be well-formed before anything is rendered.
#[derive(Debug, Validate)]
struct BundleIdentity {
    #[garde(custom(ten_digits))]
    stcd2: String,
    #[garde(custom(not_blank))]
    name1: String,
    #[garde(custom(six_digits))]
    bill_period: String,
}

/// Parses and validates a stored bundle.
///
/// # Errors
///
/// Returns `RenderError::Validation` if the payload is not a JSON object, or
/// if the business id, customer name or billing period is malformed.
pub fn parse_bundle(payload: &str) -> Result<ParsedBundle, RenderError> {
    let raw: Value = serde_json::from_str(payload)
        .map_err(|e| RenderError::Validation(format!("bundle is not valid JSON: {e}")))?;
    if !raw.is_object() {
        return Err(RenderError::Validation("bundle is not a JSON object".to_string()));
    }
    let bundle: BillDataBundle = serde_json::from_value(raw.clone())
        .map_err(|e| RenderError::Validation(format!("bundle shape: {e}")))?;

    let identity = BundleIdentity {
        stcd2: bundle.customer.stcd2.clone(),
        name1: bundle.customer.name1.clone(),
        bill_period: bundle.summary.bill_period.clone(),
    };
    validate_struct(&identity).map_err(RenderError::Validation)?;

    Ok(ParsedBundle { raw, bundle })
}
