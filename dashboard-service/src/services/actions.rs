//! Invoice form actions: create, update and delete.
//!
//! Each action validates before touching the store, issues a single statement,
//! and on success revalidates the listing view and names it as the redirect
//! target. Nothing here returns an error; every path ends in an [`Outcome`].

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, instrument};

use crate::dtos::{ActionState, FieldErrors, InvoiceFormInput, MISSING_ID_MESSAGE};
use crate::models::{InvoiceChanges, NewInvoice};
use crate::services::metrics::INVOICE_ACTIONS_TOTAL;
use crate::services::revalidate::{RefreshSignal, Revalidator, INVOICES_PATH};
use crate::services::InvoiceStore;

pub const CREATE_FAILED_MESSAGE: &str = "Database Error: Failed to create invoice.";
pub const UPDATE_FAILED_MESSAGE: &str = "Database Error: Failed to update invoice.";
pub const DELETE_FAILED_MESSAGE: &str = "Database Error: Failed to delete invoice.";

/// Result of a form action.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The write went through; the listing is stale and the caller should go there.
    Success {
        refresh: RefreshSignal,
        redirect_to: String,
    },
    /// The form was rejected. Nothing was written.
    ValidationFailure(FieldErrors),
    /// Update or delete was called without an id. The store was not touched.
    MissingId,
    /// The store refused or failed the statement. Carries a message safe to display.
    StoreFailure(String),
}

impl Outcome {
    /// State to hand back to the form, `None` on success.
    pub fn state(&self) -> Option<ActionState> {
        match self {
            Outcome::Success { .. } => None,
            Outcome::ValidationFailure(errors) => Some(ActionState::invalid(errors.clone())),
            Outcome::MissingId => Some(ActionState::message(MISSING_ID_MESSAGE)),
            Outcome::StoreFailure(message) => Some(ActionState::message(message.clone())),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }

    fn label(&self) -> &'static str {
        match self {
            Outcome::Success { .. } => "success",
            Outcome::ValidationFailure(_) => "invalid",
            Outcome::MissingId => "missing_id",
            Outcome::StoreFailure(_) => "store_failure",
        }
    }
}

#[derive(Clone)]
pub struct InvoiceActions {
    store: Arc<dyn InvoiceStore>,
    revalidator: Revalidator,
}

impl InvoiceActions {
    pub fn new(store: Arc<dyn InvoiceStore>, revalidator: Revalidator) -> Self {
        Self { store, revalidator }
    }

    /// Validate the form and insert a new invoice dated today (UTC).
    #[instrument(skip(self, form))]
    pub async fn create_invoice(&self, form: &InvoiceFormInput) -> Outcome {
        let outcome = match form.parse() {
            Err(errors) => Outcome::ValidationFailure(errors),
            Ok(valid) => {
                let invoice = NewInvoice {
                    customer_id: valid.customer_id,
                    amount_cents: valid.amount_cents,
                    status: valid.status,
                    date: Utc::now().date_naive(),
                };
                match self.store.insert_invoice(&invoice).await {
                    Ok(()) => self.succeed(),
                    Err(e) => {
                        error!(action = "create_invoice", error = %e, "Database Error");
                        Outcome::StoreFailure(CREATE_FAILED_MESSAGE.to_string())
                    }
                }
            }
        };
        record("create", outcome)
    }

    /// Validate the form and overwrite customer, amount and status of invoice `id`.
    #[instrument(skip(self, form))]
    pub async fn update_invoice(&self, id: &str, form: &InvoiceFormInput) -> Outcome {
        if id.is_empty() {
            return record("update", Outcome::MissingId);
        }

        let outcome = match form.parse() {
            Err(errors) => Outcome::ValidationFailure(errors),
            Ok(valid) => {
                let changes = InvoiceChanges {
                    customer_id: valid.customer_id,
                    amount_cents: valid.amount_cents,
                    status: valid.status,
                };
                match self.store.update_invoice(id, &changes).await {
                    Ok(updated) => {
                        info!(invoice_id = %id, rows = updated, "Invoice update applied");
                        self.succeed()
                    }
                    Err(e) => {
                        error!(action = "update_invoice", invoice_id = %id, error = %e, "Database Error");
                        Outcome::StoreFailure(UPDATE_FAILED_MESSAGE.to_string())
                    }
                }
            }
        };
        record("update", outcome)
    }

    /// Delete invoice `id`. An unknown id deletes nothing and still succeeds.
    #[instrument(skip(self))]
    pub async fn delete_invoice(&self, id: &str) -> Outcome {
        if id.is_empty() {
            return record("delete", Outcome::MissingId);
        }

        let outcome = match self.store.delete_invoice(id).await {
            Ok(deleted) => {
                info!(invoice_id = %id, rows = deleted, "Invoice delete applied");
                self.succeed()
            }
            Err(e) => {
                error!(action = "delete_invoice", invoice_id = %id, error = %e, "Database Error");
                Outcome::StoreFailure(DELETE_FAILED_MESSAGE.to_string())
            }
        };
        record("delete", outcome)
    }

    fn succeed(&self) -> Outcome {
        Outcome::Success {
            refresh: self.revalidator.revalidate(INVOICES_PATH),
            redirect_to: INVOICES_PATH.to_string(),
        }
    }
}

fn record(action: &'static str, outcome: Outcome) -> Outcome {
    INVOICE_ACTIONS_TOTAL
        .with_label_values(&[action, outcome.label()])
        .inc();
    outcome
}
