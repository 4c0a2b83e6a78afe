//! Line-item ledger columns.
//!
//! Each column has a bundle key, a fixed spreadsheet position and a
//! visibility flag in the business's template profile.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Optional line-item column of the statement and the Excel ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LedgerColumn {
    /// Billing date.
    BillDate,
    /// Billing type code.
    BillType,
    /// Billing type name.
    BillTypeName,
    /// Contract number.
    ContractNo,
    /// Order number.
    OrderNo,
    /// Group number.
    GroupNo,
    /// Product code.
    ProductCode,
    /// Product name.
    ProductName,
    /// Product specification.
    Spec,
    /// Quantity.
    Quantity,
    /// Unit of measure.
    Unit,
    /// Unit price.
    UnitPrice,
    /// Supply amount.
    SupplyAmount,
    /// Tax amount.
    TaxAmount,
    /// Discount amount.
    DiscountAmount,
    /// Paid amount.
    PaidAmount,
    /// Unpaid amount.
    UnpaidAmount,
    /// Line due date.
    DueDate,
    /// Site name.
    SiteName,
    /// Site address.
    SiteAddress,
    /// Service period start.
    ServiceStart,
    /// Service period end.
    ServiceEnd,
    /// Meter reading.
    MeterReading,
    /// Usage quantity.
    UsageQty,
    /// Free-text remark.
    Remark,
}

impl LedgerColumn {
    /// All columns in ledger order.
    pub const ALL: [Self; 25] = [
        Self::BillDate,
        Self::BillType,
        Self::BillTypeName,
        Self::ContractNo,
        Self::OrderNo,
        Self::GroupNo,
        Self::ProductCode,
        Self::ProductName,
        Self::Spec,
        Self::Quantity,
        Self::Unit,
        Self::UnitPrice,
        Self::SupplyAmount,
        Self::TaxAmount,
        Self::DiscountAmount,
        Self::PaidAmount,
        Self::UnpaidAmount,
        Self::DueDate,
        Self::SiteName,
        Self::SiteAddress,
        Self::ServiceStart,
        Self::ServiceEnd,
        Self::MeterReading,
        Self::UsageQty,
        Self::Remark,
    ];

    /// Spreadsheet column holding the per-row total (one-based, right of `Remark`).
    pub const ROW_TOTAL_COLUMN: u32 = 26;

    /// Returns the bundle field key.
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Self::BillDate => "billDate",
            Self::BillType => "billType",
            Self::BillTypeName => "billTypeName",
            Self::ContractNo => "contractNo",
            Self::OrderNo => "orderNo",
            Self::GroupNo => "groupNo",
            Self::ProductCode => "productCode",
            Self::ProductName => "productName",
            Self::Spec => "spec",
            Self::Quantity => "quantity",
            Self::Unit => "unit",
            Self::UnitPrice => "unitPrice",
            Self::SupplyAmount => "supplyAmount",
            Self::TaxAmount => "taxAmount",
            Self::DiscountAmount => "discountAmount",
            Self::PaidAmount => "paidAmount",
            Self::UnpaidAmount => "unpaidAmount",
            Self::DueDate => "dueDate",
            Self::SiteName => "siteName",
            Self::SiteAddress => "siteAddress",
            Self::ServiceStart => "serviceStart",
            Self::ServiceEnd => "serviceEnd",
            Self::MeterReading => "meterReading",
            Self::UsageQty => "usageQty",
            Self::Remark => "remark",
        }
    }

    /// Parses a bundle field key.
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|column| column.key() == key)
    }

    /// Spreadsheet column (one-based).
    #[must_use]
    pub fn position(&self) -> u32 {
        Self::ALL
            .iter()
            .zip(1u32..)
            .find_map(|(column, position)| (column == self).then_some(position))
            .unwrap_or(0)
    }

    /// Returns true for amount columns (formatted and written as numbers).
    #[must_use]
    pub fn is_monetary(&self) -> bool {
        matches!(self, Self::UnitPrice) || self.is_summed()
    }

    /// Returns true for columns accumulated into the totals row.
    #[must_use]
    pub fn is_summed(&self) -> bool {
        matches!(
            self,
            Self::SupplyAmount
                | Self::TaxAmount
                | Self::DiscountAmount
                | Self::PaidAmount
                | Self::UnpaidAmount
        )
    }

    /// Returns true for date columns (get a dotted sibling).
    #[must_use]
    pub fn is_date(&self) -> bool {
        matches!(
            self,
            Self::BillDate | Self::DueDate | Self::ServiceStart | Self::ServiceEnd
        )
    }
}

impl fmt::Display for LedgerColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}
