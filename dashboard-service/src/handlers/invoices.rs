//! Invoice listing and the create/update/delete form actions.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Form, Json,
};
use serde::Deserialize;
use serde_json::json;
use service_core::error::AppError;

use crate::dtos::InvoiceFormInput;
use crate::models::{InvoiceForm, InvoicesTableRow};
use crate::services::Outcome;
use crate::startup::AppState;

/// Response header carrying the listing's invalidation generation.
pub const LISTING_GENERATION_HEADER: &str = "x-listing-generation";

/// Search box and pager state from the listing URL.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub query: String,
    pub page: Option<String>,
}

impl ListParams {
    /// 1-based page; anything unparseable is the first page.
    pub fn page(&self) -> i64 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse::<i64>().ok())
            .unwrap_or(1)
    }
}

impl IntoResponse for Outcome {
    fn into_response(self) -> Response {
        let status = match &self {
            Outcome::Success { redirect_to, .. } => {
                return Redirect::to(redirect_to).into_response()
            }
            Outcome::ValidationFailure(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Outcome::MissingId => StatusCode::BAD_REQUEST,
            Outcome::StoreFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self.state().unwrap_or_default())).into_response()
    }
}

pub async fn list_invoices(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let generation = state.revalidator.generation();
    let rows: Vec<InvoicesTableRow> = state
        .data
        .fetch_filtered_invoices(&params.query, params.page())
        .await?;

    Ok((
        [(LISTING_GENERATION_HEADER, generation.to_string())],
        Json(rows),
    ))
}

pub async fn invoice_pages(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let total_pages = state.data.fetch_invoices_pages(&params.query).await?;
    Ok(Json(json!({ "total_pages": total_pages })))
}

pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<InvoiceForm>, AppError> {
    state
        .data
        .fetch_invoice_by_id(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Invoice not found")))
}

pub async fn create_invoice(
    State(state): State<AppState>,
    Form(form): Form<InvoiceFormInput>,
) -> Outcome {
    state.actions.create_invoice(&form).await
}

pub async fn update_invoice(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<InvoiceFormInput>,
) -> Outcome {
    state.actions.update_invoice(&id, &form).await
}

pub async fn delete_invoice(State(state): State<AppState>, Path(id): Path<String>) -> Outcome {
    state.actions.delete_invoice(&id).await
}
