//! Derived render fields.
//!
//! Builds the lookup context templates are rendered against: the bundle's
//! object-valued groups (in insertion order) enriched with formatted
//! siblings, the bundle's lists, and a trailing `computed` group of totals
//! and flags.

use std::collections::BTreeMap;

use billflow_shared::types::{format_thousands, parse_amount};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use super::columns::LedgerColumn;
use super::types::BillDataBundle;
use crate::profile::TemplateVisibilityProfile;

/// A flat field map (one bundle group or one list element).
pub type Fields = Map<String, Value>;

/// Line-item count from which the "show more" affordance is displayed.
pub const SHOW_MORE_THRESHOLD: usize = 11;

/// Summary fields holding amounts.
const SUMMARY_AMOUNT_FIELDS: [&str; 5] = [
    "totalAmount",
    "supplyAmount",
    "taxAmount",
    "unpaidAmount",
    "amount",
];

/// Fields holding a `YYYYMM` period.
const PERIOD_FIELDS: [&str; 1] = ["billPeriod"];

/// Render lookup context for one bundle.
#[derive(Debug, Clone, Default)]
pub struct RenderContext {
    groups: Vec<Fields>,
    lists: BTreeMap<String, Vec<Fields>>,
    show_more: bool,
}

impl RenderContext {
    /// Builds the context from the stored bundle JSON and its typed view.
    #[must_use]
    pub fn build(
        raw: &Value,
        bundle: &BillDataBundle,
        profile: &TemplateVisibilityProfile,
        today: NaiveDate,
    ) -> Self {
        let mut groups = Vec::new();
        let mut lists = BTreeMap::new();

        if let Some(object) = raw.as_object() {
            for (name, value) in object {
                match value {
                    Value::Object(fields) => {
                        let mut fields = fields.clone();
                        add_siblings(&mut fields);
                        groups.push(fields);
                    }
                    Value::Array(elements) => {
                        let rows = elements
                            .iter()
                            .filter_map(Value::as_object)
                            .map(|element| {
                                let mut row = element.clone();
                                if name == "items" {
                                    add_row_total(&mut row);
                                }
                                add_siblings(&mut row);
                                row
                            })
                            .collect();
                        lists.insert(name.clone(), rows);
                    }
                    _ => {}
                }
            }
        }

        let show_more = bundle.items.len() >= SHOW_MORE_THRESHOLD;
        groups.push(computed_group(bundle, profile, today, show_more));

        Self {
            groups,
            lists,
            show_more,
        }
    }

    /// Resolves a scalar placeholder.
    ///
    /// Searches the groups in insertion order and returns the value from the
    /// first group containing the key; a key present in more than one group
    /// resolves to the earliest.
    #[must_use]
    pub fn scalar(&self, name: &str) -> Option<String> {
        self.groups
            .iter()
            .find_map(|group| group.get(name))
            .map(value_text)
    }

    /// Returns the elements of a bundle list.
    #[must_use]
    pub fn list(&self, name: &str) -> Option<&[Fields]> {
        self.lists.get(name).map(Vec::as_slice)
    }

    /// Whether the line-item count reaches the "show more" threshold.
    #[must_use]
    pub fn show_more(&self) -> bool {
        self.show_more
    }
}

/// Renders a JSON value as placeholder text; null is empty.
#[must_use]
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Formats an 8-digit or ISO date as `YYYY.MM.DD`.
#[must_use]
pub fn dotted_date(text: &str) -> Option<String> {
    let text = text.trim();
    let date = if text.len() == 8 && text.bytes().all(|b| b.is_ascii_digit()) {
        NaiveDate::parse_from_str(text, "%Y%m%d").ok()?
    } else {
        NaiveDate::parse_from_str(text.get(..10)?, "%Y-%m-%d").ok()?
    };
    Some(date.format("%Y.%m.%d").to_string())
}

/// Splits a `YYYYMM` period into year and two-digit month.
#[must_use]
pub fn split_period(text: &str) -> Option<(String, String)> {
    let text = text.trim();
    if text.len() != 6 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let (year, month) = text.split_at(4);
    Some((year.to_string(), month.to_string()))
}

fn is_amount_field(key: &str) -> bool {
    SUMMARY_AMOUNT_FIELDS.contains(&key)
        || key == "rowTotal"
        || LedgerColumn::from_key(key).is_some_and(|column| column.is_monetary())
}

fn is_date_field(key: &str) -> bool {
    LedgerColumn::from_key(key).is_some_and(|column| column.is_date())
}

fn add_siblings(fields: &mut Fields) {
    let mut siblings = Vec::new();
    for (key, value) in fields.iter() {
        if is_amount_field(key) {
            if let Some(amount) = parse_amount(value) {
                siblings.push((format!("{key}_FMT"), format_thousands(amount)));
            }
        }
        if is_date_field(key) {
            if let Some(dotted) = dotted_date(&value_text(value)) {
                siblings.push((format!("{key}_DOT"), dotted));
            }
        }
        if PERIOD_FIELDS.contains(&key.as_str()) {
            if let Some((year, month)) = split_period(&value_text(value)) {
                siblings.push((format!("{key}_YEAR"), year));
                siblings.push((format!("{key}_MONTH"), month));
            }
        }
    }
    for (key, value) in siblings {
        fields.entry(key).or_insert(Value::String(value));
    }
}

fn add_row_total(row: &mut Fields) {
    let part = |key: &str| row.get(key).and_then(parse_amount).unwrap_or(Decimal::ZERO);
    let total = part("supplyAmount") + part("taxAmount");
    row.insert("rowTotal".to_string(), Value::String(total.to_string()));
}

fn computed_group(
    bundle: &BillDataBundle,
    profile: &TemplateVisibilityProfile,
    today: NaiveDate,
    show_more: bool,
) -> Fields {
    let supply: Decimal = bundle.items.iter().map(|item| item.supply_amount).sum();
    let tax: Decimal = bundle.items.iter().map(|item| item.tax_amount).sum();
    let type_count: i64 = bundle.type_summary.iter().map(|row| row.count).sum();
    let type_amount: Decimal = bundle.type_summary.iter().map(|row| row.amount).sum();

    let mut fields = Fields::new();
    let mut put = |key: &str, value: String| {
        fields.insert(key.to_string(), Value::String(value));
    };
    put("TODAY", today.format("%Y.%m.%d").to_string());
    for (key, amount) in [
        ("ITEM_SUPPLY_TOTAL", supply),
        ("ITEM_TAX_TOTAL", tax),
        ("ITEM_GRAND_TOTAL", supply + tax),
        ("TYPE_AMOUNT_TOTAL", type_amount),
    ] {
        put(key, amount.to_string());
        put(&format!("{key}_FMT"), format_thousands(amount));
    }
    put("TYPE_COUNT_TOTAL", type_count.to_string());
    put("TYPE_COUNT_TOTAL_FMT", format_thousands(Decimal::from(type_count)));
    put("SHOW_MORE", show_more.to_string());
    put("NOTICE_TEXT", profile.notice_text.clone());
    put("BANK_ACCOUNT_TEXT", profile.bank_account_text.clone());
    put("CONTACT_TEXT", profile.contact_text.clone());
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    use crate::bundle::types::{BillingSummary, CustomerProfile, LineItem, TypeSummary};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 9, 1).unwrap()
    }

    fn bundle_with_items(count: usize) -> BillDataBundle {
        BillDataBundle {
            customer: CustomerProfile {
                stcd2: "1234567890".to_string(),
                name1: "Acme Corp".to_string(),
                ..CustomerProfile::default()
            },
            summary: BillingSummary {
                bill_period: "202508".to_string(),
                total_amount: dec!(15680),
                due_date: "20250910".to_string(),
                sel_count: 1,
                ..BillingSummary::default()
            },
            type_summary: vec![
                TypeSummary {
                    bill_type: "01".to_string(),
                    count: 2,
                    amount: dec!(1000),
                    ..TypeSummary::default()
                },
                TypeSummary {
                    bill_type: "02".to_string(),
                    count: 3,
                    amount: dec!(2500),
                    ..TypeSummary::default()
                },
            ],
            items: (0..count)
                .map(|_| LineItem {
                    supply_amount: dec!(1000),
                    tax_amount: dec!(100),
                    ..LineItem::default()
                })
                .collect(),
        }
    }

    fn context(bundle: &BillDataBundle) -> RenderContext {
        let raw = serde_json::to_value(bundle).unwrap();
        RenderContext::build(&raw, bundle, &TemplateVisibilityProfile::default(), today())
    }

    #[test]
    fn test_monetary_sibling_is_comma_formatted() {
        let ctx = context(&bundle_with_items(1));
        assert_eq!(ctx.scalar("totalAmount_FMT").as_deref(), Some("15,680"));
    }

    #[test]
    fn test_period_and_date_siblings() {
        let ctx = context(&bundle_with_items(1));
        assert_eq!(ctx.scalar("billPeriod_YEAR").as_deref(), Some("2025"));
        assert_eq!(ctx.scalar("billPeriod_MONTH").as_deref(), Some("08"));
        assert_eq!(ctx.scalar("dueDate_DOT").as_deref(), Some("2025.09.10"));
        assert_eq!(ctx.scalar("TODAY").as_deref(), Some("2025.09.01"));
    }

    #[test]
    fn test_show_more_boundary() {
        assert!(!context(&bundle_with_items(10)).show_more());
        assert_eq!(
            context(&bundle_with_items(10)).scalar("SHOW_MORE").as_deref(),
            Some("false")
        );
        assert!(context(&bundle_with_items(11)).show_more());
        assert_eq!(
            context(&bundle_with_items(11)).scalar("SHOW_MORE").as_deref(),
            Some("true")
        );
    }

    #[test]
    fn test_item_and_type_totals() {
        let ctx = context(&bundle_with_items(12));
        assert_eq!(ctx.scalar("ITEM_SUPPLY_TOTAL_FMT").as_deref(), Some("12,000"));
        assert_eq!(ctx.scalar("ITEM_TAX_TOTAL_FMT").as_deref(), Some("1,200"));
        assert_eq!(ctx.scalar("ITEM_GRAND_TOTAL_FMT").as_deref(), Some("13,200"));
        assert_eq!(ctx.scalar("TYPE_COUNT_TOTAL").as_deref(), Some("5"));
        assert_eq!(ctx.scalar("TYPE_AMOUNT_TOTAL_FMT").as_deref(), Some("3,500"));
    }

    #[test]
    fn test_row_total_per_item() {
        let ctx = context(&bundle_with_items(2));
        let rows = ctx.list("items").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(value_text(&rows[0]["rowTotal_FMT"]), "1,100");
        assert_eq!(value_text(&rows[0]["supplyAmount_FMT"]), "1,000");
    }

    #[test]
    fn test_first_group_containing_key_wins() {
        let raw = json!({
            "customer": { "name1": "From Customer", "shared": "customer" },
            "summary": { "shared": "summary", "only": "summary" }
        });
        let ctx = RenderContext::build(
            &raw,
            &BillDataBundle::default(),
            &TemplateVisibilityProfile::default(),
            today(),
        );
        assert_eq!(ctx.scalar("shared").as_deref(), Some("customer"));
        assert_eq!(ctx.scalar("only").as_deref(), Some("summary"));
        assert_eq!(ctx.scalar("missing"), None);
    }

    #[test]
    fn test_dotted_date_formats() {
        assert_eq!(dotted_date("20250829").as_deref(), Some("2025.08.29"));
        assert_eq!(dotted_date("2025-08-29").as_deref(), Some("2025.08.29"));
        assert_eq!(dotted_date("2025-08-29T10:00:00").as_deref(), Some("2025.08.29"));
        assert_eq!(dotted_date("29/08/2025"), None);
        assert_eq!(dotted_date(""), None);
    }

    #[test]
    fn test_split_period_rejects_malformed() {
        assert_eq!(
            split_period("202501"),
            Some(("2025".to_string(), "01".to_string()))
        );
        assert_eq!(split_period("2025-01"), None);
        assert_eq!(split_period("20251"), None);
    }
}
