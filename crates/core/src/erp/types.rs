//! ERP boundary types and the correlation-key policy.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::bundle::lenient;

/// Customer flagged eligible for automated billing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EnrollmentCandidate {
    /// 10-digit business registration number.
    #[serde(deserialize_with = "lenient::text")]
    pub business_id: String,
    /// ERP customer code.
    #[serde(deserialize_with = "lenient::text")]
    pub customer_code: String,
    /// Customer display name.
    #[serde(deserialize_with = "lenient::text")]
    pub customer_name: String,
    /// Group number; null or all zeros means "no group".
    pub group_no: Option<String>,
    /// Order number.
    pub order_no: Option<String>,
    /// Dispatch day of month.
    pub fixed_day: u32,
    /// Primary recipient.
    pub email: Option<String>,
    /// Secondary recipient.
    pub email_cc: Option<String>,
    /// Billing period, `YYYYMM`.
    #[serde(deserialize_with = "lenient::text")]
    pub bill_period: String,
    /// Whether automated dispatch is enabled.
    pub send_auto: bool,
}

/// Join key relating customer and bill-line rows for one enrollment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CorrelationKey {
    /// Group number.
    Group(String),
    /// Order number (used when the group number is null or zero).
    Order(String),
}

impl CorrelationKey {
    /// Applies the correlation-key policy.
    ///
    /// The group number takes precedence unless it is null or zero, in
    /// which case the order number is used. Returns `None` if neither is
    /// usable.
    #[must_use]
    pub fn select(group_no: Option<&str>, order_no: Option<&str>) -> Option<Self> {
        match group_no {
            Some(group) if !is_null_or_zero(group) => Some(Self::Group(group.trim().to_string())),
            _ => order_no
                .map(str::trim)
                .filter(|order| !order.is_empty())
                .map(|order| Self::Order(order.to_string())),
        }
    }

    /// The key value.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Group(value) | Self::Order(value) => value,
        }
    }
}

impl fmt::Display for CorrelationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Group(value) => write!(f, "group:{value}"),
            Self::Order(value) => write!(f, "order:{value}"),
        }
    }
}

/// Blank or all zeros ("0", "0000000000").
fn is_null_or_zero(value: &str) -> bool {
    value.trim().chars().all(|c| c == '0')
}

/// Query parameters shared by the per-candidate ERP calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErpQuery {
    /// Business id.
    pub business_id: String,
    /// Customer code.
    pub customer_code: String,
    /// Billing period, `YYYYMM`.
    pub bill_period: String,
    /// Chosen correlation key.
    pub key: CorrelationKey,
}

impl ErpQuery {
    /// Builds the query for a candidate and its chosen key.
    #[must_use]
    pub fn for_candidate(candidate: &EnrollmentCandidate, key: CorrelationKey) -> Self {
        Self {
            business_id: candidate.business_id.clone(),
            customer_code: candidate.customer_code.clone(),
            bill_period: candidate.bill_period.clone(),
            key,
        }
    }
}
