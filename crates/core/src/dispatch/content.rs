//! Notification content assembly.
//!
//! The body and subject templates see three variables: `customerName`,
//! `billYear` and `billMonth` (no leading zero). Missing source values fall
//! back to fixed defaults: the configured customer label, the current year
//! and month `1`.

use chrono::{Datelike, NaiveDate};

use super::error::DispatchError;
use crate::bundle::derive::split_period;
use crate::bundle::{Fields, LedgerColumn};
use crate::record::BillRecord;
use crate::render::{Escape, Template, TemplateData, TemplateSection};

/// Substitution variables of one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailVariables {
    /// Customer display name.
    pub customer_name: String,
    /// Billing year.
    pub bill_year: String,
    /// Billing month without leading zero.
    pub bill_month: String,
    /// Variables that fell back to a default.
    pub defaulted: Vec<&'static str>,
}

impl MailVariables {
    /// Resolves the variables for a record.
    #[must_use]
    pub fn resolve(record: &BillRecord, default_customer_label: &str, today: NaiveDate) -> Self {
        let mut defaulted = Vec::new();

        let customer_name = if record.customer_name.trim().is_empty() {
            defaulted.push("customerName");
            default_customer_label.to_string()
        } else {
            record.customer_name.trim().to_string()
        };

        let period = split_period(&record.bill_period).and_then(|(year, month)| {
            let month: u32 = month.parse().ok()?;
            (1..=12).contains(&month).then(|| (year, month.to_string()))
        });
        let (bill_year, bill_month) = period.unwrap_or_else(|| {
            defaulted.push("billYear");
            defaulted.push("billMonth");
            (today.year().to_string(), "1".to_string())
        });

        Self {
            customer_name,
            bill_year,
            bill_month,
            defaulted,
        }
    }
}

impl TemplateData for MailVariables {
    fn scalar(&self, name: &str) -> Option<String> {
        match name {
            "customerName" => Some(self.customer_name.clone()),
            "billYear" => Some(self.bill_year.clone()),
            "billMonth" => Some(self.bill_month.clone()),
            _ => None,
        }
    }

    fn rows(&self, _list: &str) -> Option<&[Fields]> {
        None
    }

    fn section_visible(&self, _section: TemplateSection) -> bool {
        true
    }

    fn column_visible(&self, _column: LedgerColumn) -> bool {
        true
    }
}

/// Rendered subject and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailContent {
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html_body: String,
}

/// Parsed body and subject templates.
#[derive(Debug, Clone)]
pub struct ContentAssembler {
    body: Template,
    subject: Template,
}

impl ContentAssembler {
    /// Parses the templates.
    ///
    /// # Errors
    ///
    /// Returns a template error if either template is malformed.
    pub fn new(body: &Template, subject: &str) -> Result<Self, DispatchError> {
        Ok(Self {
            body: body.clone(),
            subject: Template::parse(subject)?,
        })
    }

    /// Renders subject and body.
    ///
    /// # Errors
    ///
    /// Returns a template error if a template uses a repeated list.
    pub fn assemble(&self, variables: &MailVariables) -> Result<MailContent, DispatchError> {
        Ok(MailContent {
            subject: self.subject.render(variables, Escape::Plain)?,
            html_body: self.body.render(variables, Escape::Html)?,
        })
    }
}
