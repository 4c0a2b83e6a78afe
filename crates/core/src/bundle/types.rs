//! Bill-data bundle wire format.
//!
//! The bundle is captured once at enrollment and stored verbatim on the
//! record, so rendering reflects the ERP state at enrollment time.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::columns::LedgerColumn;
use super::lenient;

/// Customer master data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomerProfile {
    /// Business registration number (10 digits).
    #[serde(deserialize_with = "lenient::text")]
    pub stcd2: String,
    /// Customer code.
    #[serde(deserialize_with = "lenient::text")]
    pub kunnr: String,
    /// Customer name.
    #[serde(deserialize_with = "lenient::text")]
    pub name1: String,
    /// Representative name.
    #[serde(deserialize_with = "lenient::text")]
    pub j1kfrepre: String,
    /// Street address.
    #[serde(deserialize_with = "lenient::text")]
    pub stras: String,
    /// Telephone.
    #[serde(deserialize_with = "lenient::text")]
    pub telf1: String,
}

/// Aggregated billing summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BillingSummary {
    /// Billing period, `YYYYMM`.
    #[serde(deserialize_with = "lenient::text")]
    pub bill_period: String,
    /// Total billed amount.
    #[serde(deserialize_with = "lenient::amount")]
    pub total_amount: Decimal,
    /// Supply amount.
    #[serde(deserialize_with = "lenient::amount")]
    pub supply_amount: Decimal,
    /// Tax amount.
    #[serde(deserialize_with = "lenient::amount")]
    pub tax_amount: Decimal,
    /// Outstanding amount.
    #[serde(deserialize_with = "lenient::amount")]
    pub unpaid_amount: Decimal,
    /// Due date, `YYYYMMDD` or ISO.
    #[serde(deserialize_with = "lenient::text")]
    pub due_date: String,
    /// Number of selected lines; below 1 triggers the fallback due date.
    #[serde(deserialize_with = "lenient::count")]
    pub sel_count: i64,
}

/// Per-billing-type summary row.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TypeSummary {
    /// Billing type code.
    #[serde(deserialize_with = "lenient::text")]
    pub bill_type: String,
    /// Billing type name.
    #[serde(deserialize_with = "lenient::text")]
    pub bill_type_name: String,
    /// Number of lines of this type.
    #[serde(deserialize_with = "lenient::count")]
    pub count: i64,
    /// Summed amount of this type.
    #[serde(deserialize_with = "lenient::amount")]
    pub amount: Decimal,
}

/// One billed line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
#[allow(missing_docs)]
pub struct LineItem {
    #[serde(deserialize_with = "lenient::text")]
    pub bill_date: String,
    #[serde(deserialize_with = "lenient::text")]
    pub bill_type: String,
    #[serde(deserialize_with = "lenient::text")]
    pub bill_type_name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub contract_no: String,
    #[serde(deserialize_with = "lenient::text")]
    pub order_no: String,
    #[serde(deserialize_with = "lenient::text")]
    pub group_no: String,
    #[serde(deserialize_with = "lenient::text")]
    pub product_code: String,
    #[serde(deserialize_with = "lenient::text")]
    pub product_name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub spec: String,
    #[serde(deserialize_with = "lenient::text")]
    pub quantity: String,
    #[serde(deserialize_with = "lenient::text")]
    pub unit: String,
    #[serde(deserialize_with = "lenient::amount")]
    pub unit_price: Decimal,
    #[serde(deserialize_with = "lenient::amount")]
    pub supply_amount: Decimal,
    #[serde(deserialize_with = "lenient::amount")]
    pub tax_amount: Decimal,
    #[serde(deserialize_with = "lenient::amount")]
    pub discount_amount: Decimal,
    #[serde(deserialize_with = "lenient::amount")]
    pub paid_amount: Decimal,
    #[serde(deserialize_with = "lenient::amount")]
    pub unpaid_amount: Decimal,
    #[serde(deserialize_with = "lenient::text")]
    pub due_date: String,
    #[serde(deserialize_with = "lenient::text")]
    pub site_name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub site_address: String,
    #[serde(deserialize_with = "lenient::text")]
    pub service_start: String,
    #[serde(deserialize_with = "lenient::text")]
    pub service_end: String,
    #[serde(deserialize_with = "lenient::text")]
    pub meter_reading: String,
    #[serde(deserialize_with = "lenient::text")]
    pub usage_qty: String,
    #[serde(deserialize_with = "lenient::text")]
    pub remark: String,
}

/// Typed value of one ledger cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue<'a> {
    /// Text column.
    Text(&'a str),
    /// Amount column.
    Amount(Decimal),
}

impl LineItem {
    /// Returns the value of `column`.
    #[must_use]
    pub fn value(&self, column: LedgerColumn) -> CellValue<'_> {
        match column {
            LedgerColumn::BillDate => CellValue::Text(&self.bill_date),
            LedgerColumn::BillType => CellValue::Text(&self.bill_type),
            LedgerColumn::BillTypeName => CellValue::Text(&self.bill_type_name),
            LedgerColumn::ContractNo => CellValue::Text(&self.contract_no),
            LedgerColumn::OrderNo => CellValue::Text(&self.order_no),
            LedgerColumn::GroupNo => CellValue::Text(&self.group_no),
            LedgerColumn::ProductCode => CellValue::Text(&self.product_code),
            LedgerColumn::ProductName => CellValue::Text(&self.product_name),
            LedgerColumn::Spec => CellValue::Text(&self.spec),
            LedgerColumn::Quantity => CellValue::Text(&self.quantity),
            LedgerColumn::Unit => CellValue::Text(&self.unit),
            LedgerColumn::UnitPrice => CellValue::Amount(self.unit_price),
            LedgerColumn::SupplyAmount => CellValue::Amount(self.supply_amount),
            LedgerColumn::TaxAmount => CellValue::Amount(self.tax_amount),
            LedgerColumn::DiscountAmount => CellValue::Amount(self.discount_amount),
            LedgerColumn::PaidAmount => CellValue::Amount(self.paid_amount),
            LedgerColumn::UnpaidAmount => CellValue::Amount(self.unpaid_amount),
            LedgerColumn::DueDate => CellValue::Text(&self.due_date),
            LedgerColumn::SiteName => CellValue::Text(&self.site_name),
            LedgerColumn::SiteAddress => CellValue::Text(&self.site_address),
            LedgerColumn::ServiceStart => CellValue::Text(&self.service_start),
            LedgerColumn::ServiceEnd => CellValue::Text(&self.service_end),
            LedgerColumn::MeterReading => CellValue::Text(&self.meter_reading),
            LedgerColumn::UsageQty => CellValue::Text(&self.usage_qty),
            LedgerColumn::Remark => CellValue::Text(&self.remark),
        }
    }

    /// Per-row total: supply plus tax.
    #[must_use]
    pub fn row_total(&self) -> Decimal {
        self.supply_amount + self.tax_amount
    }
}

/// The frozen bill-data bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BillDataBundle {
    /// Customer master data.
    pub customer: CustomerProfile,
    /// Billing summary.
    pub summary: BillingSummary,
    /// Per-type summaries.
    pub type_summary: Vec<TypeSummary>,
    /// Line items.
    pub items: Vec<LineItem>,
}

impl BillDataBundle {
    /// Serializes the bundle for storage on the record.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
