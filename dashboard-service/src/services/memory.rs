//! In-process store with the same query semantics as the PostgreSQL one.
//!
//! Used by the test suites and for running the service without a database.

use crate::models::{
    Customer, CustomerField, Invoice, InvoiceChanges, InvoiceFilter, InvoiceRow,
    LatestInvoiceRaw, NewInvoice, Revenue, StatusTotals,
};
use crate::services::InvoiceStore;
use async_trait::async_trait;
use service_core::error::AppError;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    customers: Vec<Customer>,
    invoices: Vec<Invoice>,
    revenue: Vec<Revenue>,
}

impl Tables {
    fn customer(&self, id: &str) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == id)
    }

    fn check_customer(&self, customer_id: &str) -> Result<(), AppError> {
        if self.customer(customer_id).is_none() {
            return Err(AppError::DatabaseError(anyhow::anyhow!(
                "insert or update on table \"invoices\" violates foreign key constraint: customer {} does not exist",
                customer_id
            )));
        }
        Ok(())
    }

    /// Invoices newest first, left-joined with their customer.
    fn joined(&self) -> Vec<InvoiceRow> {
        let mut invoices: Vec<&Invoice> = self.invoices.iter().collect();
        invoices.sort_by(|a, b| b.date.cmp(&a.date));
        invoices
            .into_iter()
            .map(|invoice| {
                let customer = self.customer(&invoice.customer_id);
                InvoiceRow {
                    id: invoice.id.clone(),
                    amount: invoice.amount,
                    date: invoice.date,
                    status: invoice.status.clone(),
                    name: customer.map(|c| c.name.clone()),
                    email: customer.map(|c| c.email.clone()),
                    image_url: customer.map(|c| c.image_url.clone()),
                }
            })
            .collect()
    }

    fn matching(&self, search: Option<&str>) -> Vec<InvoiceRow> {
        let needle = search.map(str::to_lowercase);
        self.joined()
            .into_iter()
            .filter(|row| match &needle {
                None => true,
                Some(needle) => [
                    Some(&row.id),
                    Some(&row.status),
                    row.name.as_ref(),
                    row.email.as_ref(),
                ]
                .into_iter()
                .flatten()
                .any(|column| column.to_lowercase().contains(needle.as_str())),
            })
            .collect()
    }
}

fn positive_amount(amount: i64) -> Result<(), AppError> {
    if amount <= 0 {
        return Err(AppError::DatabaseError(anyhow::anyhow!(
            "new row for relation \"invoices\" violates check constraint on amount"
        )));
    }
    Ok(())
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_customer(mut self, customer: Customer) -> Self {
        self.tables.get_mut().customers.push(customer);
        self
    }

    pub fn with_invoice(mut self, invoice: Invoice) -> Self {
        self.tables.get_mut().invoices.push(invoice);
        self
    }

    pub fn with_revenue(mut self, revenue: Revenue) -> Self {
        self.tables.get_mut().revenue.push(revenue);
        self
    }

    /// Snapshot of every stored invoice, in insertion order.
    pub async fn invoices(&self) -> Vec<Invoice> {
        self.tables.read().await.invoices.clone()
    }
}

#[async_trait]
impl InvoiceStore for MemoryStore {
    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn insert_invoice(&self, invoice: &NewInvoice) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        tables.check_customer(&invoice.customer_id)?;
        positive_amount(invoice.amount_cents)?;

        tables.invoices.push(Invoice {
            id: Uuid::new_v4().to_string(),
            customer_id: invoice.customer_id.clone(),
            amount: invoice.amount_cents,
            status: invoice.status.as_str().to_string(),
            date: invoice.date,
        });
        Ok(())
    }

    async fn update_invoice(&self, id: &str, changes: &InvoiceChanges) -> Result<u64, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.invoices.iter().any(|i| i.id == id) {
            return Ok(0);
        }
        tables.check_customer(&changes.customer_id)?;
        positive_amount(changes.amount_cents)?;

        let mut updated = 0;
        for invoice in tables.invoices.iter_mut().filter(|i| i.id == id) {
            invoice.customer_id = changes.customer_id.clone();
            invoice.amount = changes.amount_cents;
            invoice.status = changes.status.as_str().to_string();
            updated += 1;
        }
        Ok(updated)
    }

    async fn delete_invoice(&self, id: &str) -> Result<u64, AppError> {
        let mut tables = self.tables.write().await;
        let before = tables.invoices.len();
        tables.invoices.retain(|i| i.id != id);
        Ok((before - tables.invoices.len()) as u64)
    }

    async fn revenue(&self) -> Result<Vec<Revenue>, AppError> {
        Ok(self.tables.read().await.revenue.clone())
    }

    async fn latest_invoices(&self, limit: i64) -> Result<Vec<LatestInvoiceRaw>, AppError> {
        let tables = self.tables.read().await;
        let limit = usize::try_from(limit).unwrap_or(0);
        // Inner join: invoices without a customer are left out.
        Ok(tables
            .joined()
            .into_iter()
            .filter_map(|row| {
                Some(LatestInvoiceRaw {
                    name: row.name?,
                    image_url: row.image_url?,
                    email: row.email?,
                    id: row.id,
                    amount: row.amount,
                })
            })
            .take(limit)
            .collect())
    }

    async fn count_invoices(&self) -> Result<i64, AppError> {
        Ok(self.tables.read().await.invoices.len() as i64)
    }

    async fn count_customers(&self) -> Result<i64, AppError> {
        Ok(self.tables.read().await.customers.len() as i64)
    }

    async fn invoice_status_totals(&self) -> Result<StatusTotals, AppError> {
        let tables = self.tables.read().await;
        if tables.invoices.is_empty() {
            return Ok(StatusTotals::default());
        }
        let sum = |status: &str| {
            tables
                .invoices
                .iter()
                .filter(|i| i.status == status)
                .map(|i| i.amount)
                .sum::<i64>()
        };
        Ok(StatusTotals {
            paid: Some(sum("paid")),
            pending: Some(sum("pending")),
        })
    }

    async fn filtered_invoices(&self, filter: &InvoiceFilter) -> Result<Vec<InvoiceRow>, AppError> {
        let tables = self.tables.read().await;
        let offset = usize::try_from(filter.offset).unwrap_or(0);
        let limit = usize::try_from(filter.limit).unwrap_or(0);
        Ok(tables
            .matching(filter.search.as_deref())
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect())
    }

    async fn count_filtered_invoices(&self, search: Option<&str>) -> Result<i64, AppError> {
        Ok(self.tables.read().await.matching(search).len() as i64)
    }

    async fn invoice_by_id(&self, id: &str) -> Result<Option<Invoice>, AppError> {
        Ok(self
            .tables
            .read()
            .await
            .invoices
            .iter()
            .find(|i| i.id == id)
            .cloned())
    }

    async fn customers(&self) -> Result<Vec<CustomerField>, AppError> {
        let tables = self.tables.read().await;
        let mut customers: Vec<CustomerField> = tables
            .customers
            .iter()
            .map(|c| CustomerField {
                id: c.id.clone(),
                name: c.name.clone(),
            })
            .collect();
        customers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(customers)
    }
}
