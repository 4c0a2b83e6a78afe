//! Garde validation utilities.

use garde::{Report, Validate};

/// Validates a struct, flattening the garde report into one message.
///
/// # Errors
///
/// Returns the formatted report if any rule fails.
pub fn validate_struct<T>(value: &T) -> Result<(), String>
where
    T: Validate,
    T::Context: Default,
{
    value
        .validate()
        .map_err(|report| format_validation_errors(&report))
}

/// Format validation errors from garde Report into a human-readable string
fn format_validation_errors(report: &Report) -> String {
    report
        .iter()
        .map(|(path, error)| {
            if path.to_string().is_empty() {
                error.message().to_string()
            } else {
                format!("{}: {}", path, error.message())
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Rejects empty or whitespace-only text.
pub fn not_blank(value: &str, _ctx: &()) -> garde::Result {
    if value.trim().is_empty() {
        return Err(garde::Error::new("must not be blank"));
    }
    Ok(())
}

/// Requires exactly ten ASCII digits (business registration number).
pub fn ten_digits(value: &str, _ctx: &()) -> garde::Result {
    exact_digits(value, 10)
}

/// Requires exactly six ASCII digits (`YYYYMM` period).
pub fn six_digits(value: &str, _ctx: &()) -> garde::Result {
    exact_digits(value, 6)
}

fn exact_digits(value: &str, len: usize) -> garde::Result {
    if value.len() == len && value.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(garde::Error::new(format!("must be exactly {len} digits")))
    }
}
