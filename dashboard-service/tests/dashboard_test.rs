//! Dashboard overview read tests for dashboard-service.

mod common;

use common::{BrokenStore, TestApp, DELBA_ID, LEE_ID};
use dashboard_service::services::MemoryStore;
use reqwest::StatusCode;
use std::sync::Arc;

#[tokio::test]
async fn revenue_rows_pass_through() {
    let app = TestApp::spawn().await;

    let revenue = app.get_json("/dashboard/revenue").await;

    assert_eq!(
        revenue,
        serde_json::json!([
            { "month": "Jan", "revenue": 2000 },
            { "month": "Feb", "revenue": 1800 }
        ])
    );
}

#[tokio::test]
async fn latest_invoices_are_five_newest_with_formatted_amounts() {
    let app = TestApp::spawn().await;

    let latest = app.get_json("/dashboard/latest-invoices").await;
    let latest = latest.as_array().expect("expected an array");

    assert_eq!(latest.len(), 5);
    assert_eq!(latest[0]["id"], "inv-11");
    assert_eq!(latest[0]["amount"], "$110.00");
    assert_eq!(latest[0]["name"], "Lee Robinson");
    assert_eq!(latest[0]["email"], "lee@robinson.com");
    assert_eq!(latest[4]["id"], "inv-07");
    assert_eq!(latest[4]["amount"], "$70.00");
}

#[tokio::test]
async fn cards_summarize_counts_and_totals() {
    let app = TestApp::spawn().await;

    let cards = app.get_json("/dashboard/cards").await;

    assert_eq!(cards["number_of_invoices"], 12);
    assert_eq!(cards["number_of_customers"], 2);
    assert_eq!(cards["total_paid_invoices"], "$157.95");
    // 10 + 20 + ... + 110
    assert_eq!(cards["total_pending_invoices"], "$660.00");
}

#[tokio::test]
async fn cards_on_empty_store_show_zero() {
    let app = TestApp::spawn_with_store(Arc::new(MemoryStore::new())).await;

    let cards = app.get_json("/dashboard/cards").await;

    assert_eq!(cards["number_of_invoices"], 0);
    assert_eq!(cards["total_paid_invoices"], "$0.00");
    assert_eq!(cards["total_pending_invoices"], "$0.00");
}

#[tokio::test]
async fn customers_are_listed_for_the_picker() {
    let app = TestApp::spawn().await;

    let customers = app.get_json("/dashboard/customers").await;

    assert_eq!(
        customers,
        serde_json::json!([
            { "id": DELBA_ID, "name": "Delba de Oliveira" },
            { "id": LEE_ID, "name": "Lee Robinson" }
        ])
    );
}

#[tokio::test]
async fn broken_store_yields_operation_messages() {
    let app = TestApp::spawn_with_store(Arc::new(BrokenStore)).await;

    for (path, message) in [
        ("/dashboard/revenue", "Failed to fetch revenue data."),
        ("/dashboard/latest-invoices", "Failed to fetch latest invoices."),
        ("/dashboard/cards", "Failed to fetch card data."),
        ("/dashboard/customers", "Failed to fetch all customers."),
    ] {
        let response = app.get(path).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR, "{}", path);

        let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
        assert_eq!(body["error"], message, "{}", path);
    }
}
