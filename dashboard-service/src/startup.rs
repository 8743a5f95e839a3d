//! Application startup and lifecycle management.

use crate::config::DashboardConfig;
use crate::handlers::{dashboard, health, invoices};
use crate::services::{
    init_metrics, Database, DashboardData, InvoiceActions, InvoiceStore, Revalidator,
};
use axum::{middleware, routing::get, routing::post, Router};
use secrecy::ExposeSecret;
use service_core::error::AppError;
use service_core::middleware::tracing::request_id_middleware;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: DashboardConfig,
    pub store: Arc<dyn InvoiceStore>,
    pub data: DashboardData,
    pub actions: InvoiceActions,
    pub revalidator: Revalidator,
}

impl AppState {
    pub fn new(config: DashboardConfig, store: Arc<dyn InvoiceStore>) -> Self {
        let revalidator = Revalidator::new();
        Self {
            config,
            data: DashboardData::new(store.clone()),
            actions: InvoiceActions::new(store.clone(), revalidator.clone()),
            store,
            revalidator,
        }
    }
}

/// Build the HTTP router over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .route("/metrics", get(health::metrics_handler))
        .route("/dashboard/revenue", get(dashboard::revenue))
        .route("/dashboard/latest-invoices", get(dashboard::latest_invoices))
        .route("/dashboard/cards", get(dashboard::cards))
        .route("/dashboard/customers", get(dashboard::customers))
        .route(
            "/dashboard/invoices",
            get(invoices::list_invoices).post(invoices::create_invoice),
        )
        .route("/dashboard/invoices/pages", get(invoices::invoice_pages))
        .route(
            "/dashboard/invoices/:id",
            get(invoices::get_invoice)
                .post(invoices::update_invoice)
                .delete(invoices::delete_invoice),
        )
        .route(
            "/dashboard/invoices/:id/delete",
            post(invoices::delete_invoice),
        )
        .layer(middleware::from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .with_state(state)
}

/// Application container for managing server lifecycle.
pub struct Application {
    http_port: u16,
    http_listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Connect to PostgreSQL, run migrations and bind the listener.
    pub async fn build(config: DashboardConfig) -> Result<Self, AppError> {
        let db = Database::new(
            config.database.url.expose_secret(),
            config.database.max_connections,
            config.database.min_connections,
        )
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to connect to PostgreSQL");
            e
        })?;

        db.run_migrations().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to run migrations");
            e
        })?;

        Self::build_with_store(config, Arc::new(db)).await
    }

    /// Bind the listener over an already constructed store.
    pub async fn build_with_store(
        config: DashboardConfig,
        store: Arc<dyn InvoiceStore>,
    ) -> Result<Self, AppError> {
        init_metrics();

        // Port 0 = random port for testing
        let http_addr = format!("{}:{}", config.common.host, config.common.port);
        let http_listener = TcpListener::bind(&http_addr).await.map_err(|e| {
            tracing::error!("Failed to bind HTTP listener to {}: {}", http_addr, e);
            AppError::from(e)
        })?;
        let http_port = http_listener.local_addr()?.port();

        tracing::info!(http_port = http_port, "Dashboard service listening");

        Ok(Self {
            http_port,
            http_listener,
            state: AppState::new(config, store),
        })
    }

    /// Get the HTTP port the server is listening on.
    pub fn http_port(&self) -> u16 {
        self.http_port
    }

    /// Get the application state.
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        axum::serve(self.http_listener, router(self.state)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MemoryStore;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use secrecy::Secret;
    use service_core::config::Config as CoreConfig;
    use tower::ServiceExt;

    fn state() -> AppState {
        let config = DashboardConfig {
            common: CoreConfig::default(),
            service_name: "dashboard-service".to_string(),
            log_level: "info".to_string(),
            otlp_endpoint: None,
            database: crate::config::DatabaseConfig {
                url: Secret::new("postgres://unused".to_string()),
                max_connections: 1,
                min_connections: 1,
            },
        };
        AppState::new(config, Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn actions_and_listing_share_one_revalidator() {
        let state = state();
        let app = router(state.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/dashboard/invoices/inv-1/delete")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(state.revalidator.generation(), 1);
    }

    #[tokio::test]
    async fn empty_create_form_is_unprocessable() {
        let response = router(state())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/dashboard/invoices")
                    .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                    .body(Body::from("amount=&status="))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let response = router(state())
            .oneshot(
                Request::builder()
                    .uri("/dashboard/nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
