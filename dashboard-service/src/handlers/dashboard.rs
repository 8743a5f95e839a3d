//! Dashboard overview reads: revenue chart, latest invoices, summary cards, customer picker.

use axum::{extract::State, Json};
use service_core::error::AppError;

use crate::models::{CardData, CustomerField, LatestInvoice, Revenue};
use crate::startup::AppState;

pub async fn revenue(State(state): State<AppState>) -> Result<Json<Vec<Revenue>>, AppError> {
    Ok(Json(state.data.fetch_revenue().await?))
}

pub async fn latest_invoices(
    State(state): State<AppState>,
) -> Result<Json<Vec<LatestInvoice>>, AppError> {
    Ok(Json(state.data.fetch_latest_invoices().await?))
}

pub async fn cards(State(state): State<AppState>) -> Result<Json<CardData>, AppError> {
    Ok(Json(state.data.fetch_card_data().await?))
}

pub async fn customers(
    State(state): State<AppState>,
) -> Result<Json<Vec<CustomerField>>, AppError> {
    Ok(Json(state.data.fetch_customers().await?))
}
