//! PostgreSQL store for dashboard-service.

use crate::models::{
    CustomerField, Invoice, InvoiceChanges, InvoiceFilter, InvoiceRow, LatestInvoiceRaw,
    NewInvoice, Revenue, StatusTotals,
};
use crate::services::metrics::DB_QUERY_DURATION;
use crate::services::InvoiceStore;
use async_trait::async_trait;
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::{debug, info, instrument};
use uuid::Uuid;

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::DatabaseError(anyhow::anyhow!("{}: {}", context, e))
}

/// `%term%` for ILIKE, with the pattern metacharacters in `term` escaped.
pub(crate) fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "dashboard-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }
}

#[async_trait]
impl InvoiceStore for Database {
    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(db_error("Health check failed"))?;
        Ok(())
    }

    #[instrument(skip(self, invoice), fields(customer_id = %invoice.customer_id))]
    async fn insert_invoice(&self, invoice: &NewInvoice) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["insert_invoice"])
            .start_timer();

        sqlx::query(
            r#"
            INSERT INTO invoices (customer_id, amount, status, date)
            VALUES ($1::uuid, $2, $3, $4)
            "#,
        )
        .bind(&invoice.customer_id)
        .bind(invoice.amount_cents)
        .bind(invoice.status.as_str())
        .bind(invoice.date)
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to insert invoice"))?;

        timer.observe_duration();

        info!(amount = invoice.amount_cents, status = %invoice.status, "Invoice inserted");

        Ok(())
    }

    #[instrument(skip(self, changes), fields(invoice_id = %id))]
    async fn update_invoice(&self, id: &str, changes: &InvoiceChanges) -> Result<u64, AppError> {
        let Ok(invoice_id) = Uuid::parse_str(id) else {
            return Ok(0);
        };

        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_invoice"])
            .start_timer();

        let result = sqlx::query(
            r#"
            UPDATE invoices
            SET customer_id = $2::uuid, amount = $3, status = $4
            WHERE id = $1
            "#,
        )
        .bind(invoice_id)
        .bind(&changes.customer_id)
        .bind(changes.amount_cents)
        .bind(changes.status.as_str())
        .execute(&self.pool)
        .await
        .map_err(db_error("Failed to update invoice"))?;

        timer.observe_duration();

        Ok(result.rows_affected())
    }

    #[instrument(skip(self), fields(invoice_id = %id))]
    async fn delete_invoice(&self, id: &str) -> Result<u64, AppError> {
        let Ok(invoice_id) = Uuid::parse_str(id) else {
            return Ok(0);
        };

        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_invoice"])
            .start_timer();

        let result = sqlx::query("DELETE FROM invoices WHERE id = $1")
            .bind(invoice_id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete invoice"))?;

        timer.observe_duration();

        let deleted = result.rows_affected();
        if deleted > 0 {
            info!(invoice_id = %id, "Invoice deleted");
        }

        Ok(deleted)
    }

    #[instrument(skip(self))]
    async fn revenue(&self) -> Result<Vec<Revenue>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["revenue"])
            .start_timer();

        let rows = sqlx::query_scalar::<_, serde_json::Value>("SELECT to_jsonb(r) FROM revenue r")
            .fetch_all(&self.pool)
            .await
            .map_err(db_error("Failed to read revenue"))?;

        timer.observe_duration();

        Ok(rows.into_iter().map(Revenue).collect())
    }

    #[instrument(skip(self))]
    async fn latest_invoices(&self, limit: i64) -> Result<Vec<LatestInvoiceRaw>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["latest_invoices"])
            .start_timer();

        let rows = sqlx::query_as::<_, LatestInvoiceRaw>(
            r#"
            SELECT invoices.id::text AS id, customers.name, customers.image_url,
                   customers.email, invoices.amount
            FROM invoices
            JOIN customers ON invoices.customer_id = customers.id
            ORDER BY invoices.date DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to read latest invoices"))?;

        timer.observe_duration();

        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn count_invoices(&self) -> Result<i64, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["count_invoices"])
            .start_timer();

        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM invoices")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count invoices"))?;

        timer.observe_duration();

        Ok(count)
    }

    #[instrument(skip(self))]
    async fn count_customers(&self) -> Result<i64, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["count_customers"])
            .start_timer();

        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM customers")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count customers"))?;

        timer.observe_duration();

        Ok(count)
    }

    #[instrument(skip(self))]
    async fn invoice_status_totals(&self) -> Result<StatusTotals, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["invoice_status_totals"])
            .start_timer();

        let totals = sqlx::query_as::<_, StatusTotals>(
            r#"
            SELECT
                SUM(CASE WHEN status = 'paid' THEN amount ELSE 0 END)::BIGINT AS paid,
                SUM(CASE WHEN status = 'pending' THEN amount ELSE 0 END)::BIGINT AS pending
            FROM invoices
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to sum invoice amounts"))?;

        timer.observe_duration();

        Ok(totals)
    }

    #[instrument(skip(self), fields(search = ?filter.search, offset = filter.offset))]
    async fn filtered_invoices(&self, filter: &InvoiceFilter) -> Result<Vec<InvoiceRow>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["filtered_invoices"])
            .start_timer();

        let pattern = filter.search.as_deref().map(like_pattern);

        let rows = sqlx::query_as::<_, InvoiceRow>(
            r#"
            SELECT invoices.id::text AS id, invoices.amount, invoices.date, invoices.status,
                   customers.name, customers.email, customers.image_url
            FROM invoices
            LEFT JOIN customers ON invoices.customer_id = customers.id
            WHERE $1::text IS NULL
               OR invoices.id::text ILIKE $1
               OR invoices.status ILIKE $1
               OR customers.name ILIKE $1
               OR customers.email ILIKE $1
            ORDER BY invoices.date DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(pattern)
        .bind(filter.limit)
        .bind(filter.offset)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to read filtered invoices"))?;

        timer.observe_duration();

        debug!(rows = rows.len(), "Filtered invoices read");

        Ok(rows)
    }

    #[instrument(skip(self))]
    async fn count_filtered_invoices(&self, search: Option<&str>) -> Result<i64, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["count_filtered_invoices"])
            .start_timer();

        let pattern = search.map(like_pattern);

        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM invoices
            LEFT JOIN customers ON invoices.customer_id = customers.id
            WHERE $1::text IS NULL
               OR invoices.id::text ILIKE $1
               OR invoices.status ILIKE $1
               OR customers.name ILIKE $1
               OR customers.email ILIKE $1
            "#,
        )
        .bind(pattern)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to count filtered invoices"))?;

        timer.observe_duration();

        Ok(count)
    }

    #[instrument(skip(self), fields(invoice_id = %id))]
    async fn invoice_by_id(&self, id: &str) -> Result<Option<Invoice>, AppError> {
        let Ok(invoice_id) = Uuid::parse_str(id) else {
            return Ok(None);
        };

        let timer = DB_QUERY_DURATION
            .with_label_values(&["invoice_by_id"])
            .start_timer();

        let invoice = sqlx::query_as::<_, Invoice>(
            r#"
            SELECT id::text AS id, customer_id::text AS customer_id, amount, status, date
            FROM invoices
            WHERE id = $1
            "#,
        )
        .bind(invoice_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to read invoice"))?;

        timer.observe_duration();

        Ok(invoice)
    }

    #[instrument(skip(self))]
    async fn customers(&self) -> Result<Vec<CustomerField>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["customers"])
            .start_timer();

        let customers = sqlx::query_as::<_, CustomerField>(
            "SELECT id::text AS id, name FROM customers ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to read customers"))?;

        timer.observe_duration();

        Ok(customers)
    }
}
