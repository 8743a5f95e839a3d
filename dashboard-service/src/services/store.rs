//! Persistence seam between the dashboard layers and the relational store.

use async_trait::async_trait;
use service_core::error::AppError;

use crate::models::{
    CustomerField, Invoice, InvoiceChanges, InvoiceFilter, InvoiceRow, LatestInvoiceRaw,
    NewInvoice, Revenue, StatusTotals,
};

/// Single-statement reads and writes over `invoices`, `customers` and `revenue`.
///
/// Implementations report every failure as `AppError::DatabaseError`; callers
/// decide what the user gets to see.
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    async fn health_check(&self) -> Result<(), AppError>;

    async fn insert_invoice(&self, invoice: &NewInvoice) -> Result<(), AppError>;

    /// Returns the number of rows changed; zero when the id is unknown or malformed.
    async fn update_invoice(&self, id: &str, changes: &InvoiceChanges) -> Result<u64, AppError>;

    /// Returns the number of rows removed; zero when the id is unknown or malformed.
    async fn delete_invoice(&self, id: &str) -> Result<u64, AppError>;

    async fn revenue(&self) -> Result<Vec<Revenue>, AppError>;

    /// Most recently dated invoices joined with their customer.
    async fn latest_invoices(&self, limit: i64) -> Result<Vec<LatestInvoiceRaw>, AppError>;

    async fn count_invoices(&self) -> Result<i64, AppError>;

    async fn count_customers(&self) -> Result<i64, AppError>;

    async fn invoice_status_totals(&self) -> Result<StatusTotals, AppError>;

    /// Page of invoices, newest first, matching `filter.search` case-insensitively
    /// against invoice id, status, customer name and email.
    async fn filtered_invoices(&self, filter: &InvoiceFilter) -> Result<Vec<InvoiceRow>, AppError>;

    /// Number of invoices matching `search` (all invoices when `None`).
    async fn count_filtered_invoices(&self, search: Option<&str>) -> Result<i64, AppError>;

    async fn invoice_by_id(&self, id: &str) -> Result<Option<Invoice>, AppError>;

    /// All customers ordered by name.
    async fn customers(&self) -> Result<Vec<CustomerField>, AppError>;
}
