//! ERP data source boundary.

use super::error::ErpError;
use super::types::{EnrollmentCandidate, ErpQuery};
use crate::bundle::{BillingSummary, CustomerProfile, LineItem, TypeSummary};

/// Read-only ERP source of customer and bill-line data.
pub trait ErpSource: Send + Sync {
    /// Customers flagged eligible for automated billing.
    fn list_enrollable(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<EnrollmentCandidate>, ErpError>> + Send;

    /// Count of bill lines joined to the customer through the correlation key.
    fn count_related_lines(
        &self,
        query: &ErpQuery,
    ) -> impl std::future::Future<Output = Result<u64, ErpError>> + Send;

    /// Customer master data.
    fn customer_profile(
        &self,
        query: &ErpQuery,
    ) -> impl std::future::Future<Output = Result<CustomerProfile, ErpError>> + Send;

    /// Aggregated total, due date and selected-line count.
    fn billing_summary(
        &self,
        query: &ErpQuery,
    ) -> impl std::future::Future<Output = Result<BillingSummary, ErpError>> + Send;

    /// Sums and counts grouped by billing type.
    fn per_type_summary(
        &self,
        query: &ErpQuery,
    ) -> impl std::future::Future<Output = Result<Vec<TypeSummary>, ErpError>> + Send;

    /// Full line-item list.
    fn line_items(
        &self,
        query: &ErpQuery,
    ) -> impl std::future::Future<Output = Result<Vec<LineItem>, ErpError>> + Send;
}
