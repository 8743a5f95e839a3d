//! Read side of the dashboard.
//!
//! Each fetch logs the underlying store error and hands the caller a fixed
//! `AppError::FetchFailed` message instead. A failed fetch is never reported
//! as an empty result.

use std::sync::Arc;

use service_core::error::AppError;
use tracing::{error, instrument};

use crate::models::{
    total_pages, search_term, CardData, CustomerField, InvoiceFilter, InvoiceForm,
    InvoicesTableRow, LatestInvoice, Revenue,
};
use crate::services::metrics::FETCH_ERRORS_TOTAL;
use crate::services::InvoiceStore;
use crate::utils::format_currency;

/// Number of rows on the "latest invoices" card.
pub const LATEST_INVOICES_LIMIT: i64 = 5;

fn fetch_failed(
    operation: &'static str,
    message: &'static str,
) -> impl FnOnce(AppError) -> AppError {
    move |e| {
        error!(operation = operation, error = %e, "Database Error");
        FETCH_ERRORS_TOTAL.with_label_values(&[operation]).inc();
        AppError::FetchFailed(message.to_string())
    }
}

#[derive(Clone)]
pub struct DashboardData {
    store: Arc<dyn InvoiceStore>,
}

impl DashboardData {
    pub fn new(store: Arc<dyn InvoiceStore>) -> Self {
        Self { store }
    }

    /// Every row of the revenue report.
    #[instrument(skip(self))]
    pub async fn fetch_revenue(&self) -> Result<Vec<Revenue>, AppError> {
        self.store
            .revenue()
            .await
            .map_err(fetch_failed("fetch_revenue", "Failed to fetch revenue data."))
    }

    /// The five most recently dated invoices with display-formatted amounts.
    #[instrument(skip(self))]
    pub async fn fetch_latest_invoices(&self) -> Result<Vec<LatestInvoice>, AppError> {
        let rows = self
            .store
            .latest_invoices(LATEST_INVOICES_LIMIT)
            .await
            .map_err(fetch_failed(
                "fetch_latest_invoices",
                "Failed to fetch latest invoices.",
            ))?;

        Ok(rows
            .into_iter()
            .map(|row| LatestInvoice {
                amount: format_currency(row.amount),
                id: row.id,
                name: row.name,
                image_url: row.image_url,
                email: row.email,
            })
            .collect())
    }

    /// Summary counts and totals. The three aggregates run concurrently.
    #[instrument(skip(self))]
    pub async fn fetch_card_data(&self) -> Result<CardData, AppError> {
        let (number_of_invoices, number_of_customers, totals) = tokio::try_join!(
            self.store.count_invoices(),
            self.store.count_customers(),
            self.store.invoice_status_totals(),
        )
        .map_err(fetch_failed("fetch_card_data", "Failed to fetch card data."))?;

        Ok(CardData {
            number_of_invoices,
            number_of_customers,
            total_paid_invoices: format_currency(totals.paid.unwrap_or(0)),
            total_pending_invoices: format_currency(totals.pending.unwrap_or(0)),
        })
    }

    /// One page of the invoice listing. Amounts stay in cents.
    #[instrument(skip(self))]
    pub async fn fetch_filtered_invoices(
        &self,
        query: &str,
        page: i64,
    ) -> Result<Vec<InvoicesTableRow>, AppError> {
        let filter = InvoiceFilter::new(query, page);
        let rows = self.store.filtered_invoices(&filter).await.map_err(fetch_failed(
            "fetch_filtered_invoices",
            "Failed to fetch filtered invoices.",
        ))?;

        Ok(rows.into_iter().map(InvoicesTableRow::from).collect())
    }

    /// Number of listing pages for `query`.
    #[instrument(skip(self))]
    pub async fn fetch_invoices_pages(&self, query: &str) -> Result<i64, AppError> {
        let search = search_term(query);
        let count = self
            .store
            .count_filtered_invoices(search.as_deref())
            .await
            .map_err(fetch_failed(
                "fetch_invoices_pages",
                "Failed to fetch total number of invoices.",
            ))?;

        Ok(total_pages(count))
    }

    /// Invoice shaped for the edit form, or `None` when it does not exist.
    #[instrument(skip(self))]
    pub async fn fetch_invoice_by_id(&self, id: &str) -> Result<Option<InvoiceForm>, AppError> {
        let invoice = self
            .store
            .invoice_by_id(id)
            .await
            .map_err(fetch_failed("fetch_invoice_by_id", "Failed to fetch invoice."))?;

        Ok(invoice.map(InvoiceForm::from))
    }

    /// Customers for the invoice form's picker.
    #[instrument(skip(self))]
    pub async fn fetch_customers(&self) -> Result<Vec<CustomerField>, AppError> {
        self.store
            .customers()
            .await
            .map_err(fetch_failed("fetch_customers", "Failed to fetch all customers."))
    }
}
