//! Invoice model for dashboard-service.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Fixed number of rows per page of the invoice listing.
pub const ITEMS_PER_PAGE: i64 = 10;

/// Invoice status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    Pending,
    Paid,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Pending => "pending",
            InvoiceStatus::Paid => "paid",
        }
    }

    /// Exact match only; anything else is not a status.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(InvoiceStatus::Pending),
            "paid" => Some(InvoiceStatus::Paid),
            _ => None,
        }
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Invoice row as stored. `amount` is in cents.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Invoice {
    pub id: String,
    pub customer_id: String,
    pub amount: i64,
    pub status: String,
    pub date: NaiveDate,
}

/// Input for inserting an invoice.
#[derive(Debug, Clone)]
pub struct NewInvoice {
    pub customer_id: String,
    pub amount_cents: i64,
    pub status: InvoiceStatus,
    pub date: NaiveDate,
}

/// Input for updating an invoice. The stored date is never touched.
#[derive(Debug, Clone)]
pub struct InvoiceChanges {
    pub customer_id: String,
    pub amount_cents: i64,
    pub status: InvoiceStatus,
}

/// Raw row behind the "latest invoices" card.
#[derive(Debug, Clone, FromRow)]
pub struct LatestInvoiceRaw {
    pub id: String,
    pub name: String,
    pub image_url: String,
    pub email: String,
    pub amount: i64,
}

/// Latest invoice with the amount formatted for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatestInvoice {
    pub id: String,
    pub name: String,
    pub image_url: String,
    pub email: String,
    pub amount: String,
}

/// Raw row of the filtered listing; customer columns are null when the join misses.
#[derive(Debug, Clone, FromRow)]
pub struct InvoiceRow {
    pub id: String,
    pub amount: i64,
    pub date: NaiveDate,
    pub status: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub image_url: Option<String>,
}

/// Row of the invoices table as served to the listing view. `amount` is in cents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvoicesTableRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub image_url: String,
    pub amount: i64,
    pub date: NaiveDate,
    pub status: String,
}

impl From<InvoiceRow> for InvoicesTableRow {
    fn from(row: InvoiceRow) -> Self {
        Self {
            id: row.id,
            name: row.name.unwrap_or_else(|| "Unknown".to_string()),
            email: row.email.unwrap_or_default(),
            image_url: row.image_url.unwrap_or_default(),
            amount: row.amount,
            date: row.date,
            status: row.status,
        }
    }
}

/// Invoice shaped for the edit form; `amount` is back in currency units.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InvoiceForm {
    pub id: String,
    pub customer_id: String,
    pub amount: Decimal,
    pub status: String,
}

impl From<Invoice> for InvoiceForm {
    fn from(invoice: Invoice) -> Self {
        Self {
            id: invoice.id,
            customer_id: invoice.customer_id,
            amount: Decimal::new(invoice.amount, 2),
            status: invoice.status,
        }
    }
}

/// Paid and pending sums in cents. `None` when there is nothing to sum.
#[derive(Debug, Clone, Copy, Default, FromRow)]
pub struct StatusTotals {
    pub paid: Option<i64>,
    pub pending: Option<i64>,
}

/// Search and page window for the invoice listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceFilter {
    /// Trimmed search term; `None` means no filter.
    pub search: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

impl InvoiceFilter {
    /// Build the window for a 1-based page. Pages below 1 are treated as page 1.
    pub fn new(query: &str, page: i64) -> Self {
        let page = page.max(1);
        Self {
            search: search_term(query),
            limit: ITEMS_PER_PAGE,
            offset: (page - 1).saturating_mul(ITEMS_PER_PAGE),
        }
    }
}

/// Normalize a raw search box value.
pub fn search_term(query: &str) -> Option<String> {
    let trimmed = query.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Number of pages needed to show `count` rows.
pub fn total_pages(count: i64) -> i64 {
    if count <= 0 {
        return 0;
    }
    (count + ITEMS_PER_PAGE - 1) / ITEMS_PER_PAGE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parse_is_exact() {
        assert_eq!(InvoiceStatus::parse("paid"), Some(InvoiceStatus::Paid));
        assert_eq!(InvoiceStatus::parse("pending"), Some(InvoiceStatus::Pending));
        assert_eq!(InvoiceStatus::parse("Paid"), None);
        assert_eq!(InvoiceStatus::parse(""), None);
    }

    #[test]
    fn filter_offsets_by_page() {
        assert_eq!(InvoiceFilter::new("", 1).offset, 0);
        assert_eq!(InvoiceFilter::new("", 2).offset, 10);
        assert_eq!(InvoiceFilter::new("", 3).limit, ITEMS_PER_PAGE);
    }

    #[test]
    fn filter_clamps_pages_below_one() {
        assert_eq!(InvoiceFilter::new("", 0).offset, 0);
        assert_eq!(InvoiceFilter::new("", -4).offset, 0);
    }

    #[test]
    fn filter_trims_search_and_drops_blank() {
        assert_eq!(InvoiceFilter::new("  Lee ", 1).search.as_deref(), Some("Lee"));
        assert_eq!(InvoiceFilter::new("   ", 1).search, None);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0), 0);
        assert_eq!(total_pages(1), 1);
        assert_eq!(total_pages(10), 1);
        assert_eq!(total_pages(11), 2);
    }

    #[test]
    fn missing_customer_gets_placeholders() {
        let row = InvoicesTableRow::from(InvoiceRow {
            id: "inv-1".to_string(),
            amount: 1500,
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            status: "paid".to_string(),
            name: None,
            email: None,
            image_url: None,
        });

        assert_eq!(row.name, "Unknown");
        assert_eq!(row.email, "");
        assert_eq!(row.image_url, "");
        assert_eq!(row.amount, 1500);
    }

    #[test]
    fn edit_form_converts_cents_back() {
        let form = InvoiceForm::from(Invoice {
            id: "inv-1".to_string(),
            customer_id: "cust-1".to_string(),
            amount: 12345,
            status: "pending".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        });

        assert_eq!(form.amount.to_string(), "123.45");
    }
}
