//! Tolerant deserializers for ERP-sourced fields.
//!
//! The ERP bridge sends codes and amounts as either strings or numbers, and
//! drops empty columns entirely.

use billflow_shared::types::parse_amount;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Text from a string, number or bool; null becomes empty.
pub fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    })
}

/// Amount from a number or numeric string; blank or malformed becomes zero.
pub fn amount<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(parse_amount(&value).unwrap_or(Decimal::ZERO))
}

/// Count from a number or numeric string; blank or malformed becomes zero.
pub fn count<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64().unwrap_or_default(),
        Value::String(s) => s.trim().parse().unwrap_or_default(),
        _ => 0,
    })
}
