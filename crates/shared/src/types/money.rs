//! Monetary amount parsing and display formatting.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts are `rust_decimal::Decimal` end to end; the only float conversion
//! happens at the spreadsheet cell boundary.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::Value;

/// Parses an amount from a bundle value.
///
/// Accepts JSON numbers and numeric strings. Thousands separators and
/// surrounding whitespace in strings are ignored. Returns `None` for
/// anything else, including empty strings.
#[must_use]
pub fn parse_amount(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
        }
        Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| *c != ',' && !c.is_whitespace())
                .collect();
            if cleaned.is_empty() {
                return None;
            }
            Decimal::from_str(&cleaned).ok()
        }
        _ => None,
    }
}

/// Formats an amount with `,` thousands separators.
///
/// Trailing fractional zeros are dropped, so `15680.00` renders as `15,680`
/// while `1234.5` renders as `1,234.5`.
#[must_use]
pub fn format_thousands(amount: Decimal) -> String {
    let text = amount.normalize().to_string();
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text.as_str()),
    };
    let (integer, fraction) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, ch) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match fraction {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

#[cfg(test)]
#[path = "money_tests.rs"]
mod tests;
