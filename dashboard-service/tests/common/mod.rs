//! Test helper module for dashboard-service integration tests.
//!
//! Spawns the service over a seeded in-memory store on a random port.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use dashboard_service::config::{DashboardConfig, DatabaseConfig};
use dashboard_service::models::{
    Customer, CustomerField, Invoice, InvoiceChanges, InvoiceFilter, InvoiceRow,
    LatestInvoiceRaw, NewInvoice, Revenue, StatusTotals,
};
use dashboard_service::services::{init_metrics, InvoiceStore, MemoryStore};
use dashboard_service::startup::Application;
use secrecy::Secret;
use service_core::config::Config as CoreConfig;
use service_core::error::AppError;
use std::sync::Arc;

pub const DELBA_ID: &str = "d6e15727-9fe1-4961-8c5b-ea44a9bd81aa";
pub const LEE_ID: &str = "3958dc9e-712f-4377-85e9-fec4b6a6442a";

/// Invoice owned by Delba, the oldest in the seed.
pub const PAID_INVOICE_ID: &str = "inv-paid";

pub fn test_config() -> DashboardConfig {
    DashboardConfig {
        common: CoreConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // Random port
        },
        service_name: "dashboard-service".to_string(),
        log_level: "warn".to_string(),
        otlp_endpoint: None,
        database: DatabaseConfig {
            url: Secret::new("postgres://unused".to_string()),
            max_connections: 1,
            min_connections: 1,
        },
    }
}

/// Two customers, twelve invoices and two revenue rows.
///
/// Lee has eleven pending invoices `inv-01`..`inv-11` for 10.00..110.00 dated
/// 2023-01-01..2023-01-11. Delba has one paid invoice of 157.95 dated 2022-12-06.
pub fn seeded_store() -> MemoryStore {
    let mut store = MemoryStore::new()
        .with_customer(Customer {
            id: DELBA_ID.to_string(),
            name: "Delba de Oliveira".to_string(),
            email: "delba@oliveira.com".to_string(),
            image_url: "/customers/delba-de-oliveira.png".to_string(),
        })
        .with_customer(Customer {
            id: LEE_ID.to_string(),
            name: "Lee Robinson".to_string(),
            email: "lee@robinson.com".to_string(),
            image_url: "/customers/lee-robinson.png".to_string(),
        })
        .with_invoice(Invoice {
            id: PAID_INVOICE_ID.to_string(),
            customer_id: DELBA_ID.to_string(),
            amount: 15795,
            status: "paid".to_string(),
            date: NaiveDate::from_ymd_opt(2022, 12, 6).unwrap(),
        })
        .with_revenue(Revenue(serde_json::json!({ "month": "Jan", "revenue": 2000 })))
        .with_revenue(Revenue(serde_json::json!({ "month": "Feb", "revenue": 1800 })));

    for day in 1..=11 {
        store = store.with_invoice(Invoice {
            id: format!("inv-{:02}", day),
            customer_id: LEE_ID.to_string(),
            amount: i64::from(day) * 1000,
            status: "pending".to_string(),
            date: NaiveDate::from_ymd_opt(2023, 1, day).unwrap(),
        });
    }

    store
}

/// Test application wrapper for integration tests.
pub struct TestApp {
    pub http_address: String,
    pub http_port: u16,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Spawn over the seeded in-memory store.
    pub async fn spawn() -> Self {
        Self::spawn_with_store(Arc::new(seeded_store())).await
    }

    /// Spawn over `store`.
    pub async fn spawn_with_store(store: Arc<dyn InvoiceStore>) -> Self {
        init_metrics();

        let app = Application::build_with_store(test_config(), store)
            .await
            .expect("Failed to build test application");

        let http_port = app.http_port();
        let http_address = format!("http://127.0.0.1:{}", http_port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Form actions answer with 303; tests inspect the redirect itself.
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("Failed to build HTTP client");

        // Wait for HTTP server to be ready by polling health endpoint
        let health_url = format!("{}/health", http_address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;
        }

        TestApp {
            http_address,
            http_port,
            client,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.http_address, path)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn get_json(&self, path: &str) -> serde_json::Value {
        self.get(path)
            .await
            .json()
            .await
            .expect("Failed to parse JSON")
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("Failed to execute request")
    }
}

/// Store that fails every statement, as an unreachable database would.
pub struct BrokenStore;

fn broken<T>() -> Result<T, AppError> {
    Err(AppError::DatabaseError(anyhow::anyhow!(
        "connection refused"
    )))
}

#[async_trait]
impl InvoiceStore for BrokenStore {
    async fn health_check(&self) -> Result<(), AppError> {
        broken()
    }
    async fn insert_invoice(&self, _: &NewInvoice) -> Result<(), AppError> {
        broken()
    }
    async fn update_invoice(&self, _: &str, _: &InvoiceChanges) -> Result<u64, AppError> {
        broken()
    }
    async fn delete_invoice(&self, _: &str) -> Result<u64, AppError> {
        broken()
    }
    async fn revenue(&self) -> Result<Vec<Revenue>, AppError> {
        broken()
    }
    async fn latest_invoices(&self, _: i64) -> Result<Vec<LatestInvoiceRaw>, AppError> {
        broken()
    }
    async fn count_invoices(&self) -> Result<i64, AppError> {
        broken()
    }
    async fn count_customers(&self) -> Result<i64, AppError> {
        broken()
    }
    async fn invoice_status_totals(&self) -> Result<StatusTotals, AppError> {
        broken()
    }
    async fn filtered_invoices(&self, _: &InvoiceFilter) -> Result<Vec<InvoiceRow>, AppError> {
        broken()
    }
    async fn count_filtered_invoices(&self, _: Option<&str>) -> Result<i64, AppError> {
        broken()
    }
    async fn invoice_by_id(&self, _: &str) -> Result<Option<Invoice>, AppError> {
        broken()
    }
    async fn customers(&self) -> Result<Vec<CustomerField>, AppError> {
        broken()
    }
}
