//! Invoice create/update form and its validation rules.

use std::borrow::Cow;
use std::str::FromStr;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::models::InvoiceStatus;

pub const CUSTOMER_REQUIRED_MESSAGE: &str = "Please select a customer.";
pub const AMOUNT_INVALID_MESSAGE: &str = "Please enter an amount greater than $0.";
pub const AMOUNT_TOO_LARGE_MESSAGE: &str = "Please enter a smaller amount.";
pub const STATUS_INVALID_MESSAGE: &str = "Please select an invoice status.";
pub const VALIDATION_FAILED_MESSAGE: &str = "Validation Error: Invalid invoice data.";
pub const MISSING_ID_MESSAGE: &str = "Missing invoice id";

/// Raw invoice form as posted by the browser.
///
/// Every field defaults to an empty string so a missing input becomes a field
/// error instead of a rejected request. `id` and `date` are not accepted here:
/// the id comes from the route and the date is stamped on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceFormInput {
    #[serde(default)]
    #[validate(length(min = 1, message = "Please select a customer."))]
    pub customer_id: String,

    #[serde(default)]
    #[validate(custom(function = "validate_amount"))]
    pub amount: String,

    #[serde(default)]
    #[validate(custom(function = "validate_status"))]
    pub status: String,
}

/// Form data that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedInvoice {
    pub customer_id: String,
    pub amount: Decimal,
    pub amount_cents: i64,
    pub status: InvoiceStatus,
}

impl InvoiceFormInput {
    pub fn new(
        customer_id: impl Into<String>,
        amount: impl Into<String>,
        status: impl Into<String>,
    ) -> Self {
        Self {
            customer_id: customer_id.into(),
            amount: amount.into(),
            status: status.into(),
        }
    }

    /// Validate the form once, yielding typed data or per-field messages.
    pub fn parse(&self) -> Result<ValidatedInvoice, FieldErrors> {
        self.validate().map_err(|e| FieldErrors::from(&e))?;

        let amount = amount_cents(&self.amount);
        let status = InvoiceStatus::parse(&self.status);

        match (amount, status) {
            (Ok((amount, amount_cents)), Some(status)) => Ok(ValidatedInvoice {
                customer_id: self.customer_id.clone(),
                amount,
                amount_cents,
                status,
            }),
            (amount, status) => {
                let mut errors = FieldErrors::default();
                if let Err(message) = amount {
                    errors.amount.push(message.to_string());
                }
                if status.is_none() {
                    errors.status.push(STATUS_INVALID_MESSAGE.to_string());
                }
                Err(errors)
            }
        }
    }
}

/// Coerce a form string to a number. Blank input is not a number.
fn parse_amount(raw: &str) -> Option<Decimal> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .ok()
}

/// Currency units to whole cents, rounding halves away from zero.
fn to_cents(amount: Decimal) -> Option<i64> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
}

/// The form amount and its positive cent value, or the message to show.
fn amount_cents(raw: &str) -> Result<(Decimal, i64), &'static str> {
    let amount = parse_amount(raw).ok_or(AMOUNT_INVALID_MESSAGE)?;
    if amount <= Decimal::ZERO {
        return Err(AMOUNT_INVALID_MESSAGE);
    }
    match to_cents(amount) {
        Some(cents) if cents > 0 => Ok((amount, cents)),
        Some(_) => Err(AMOUNT_INVALID_MESSAGE),
        None => Err(AMOUNT_TOO_LARGE_MESSAGE),
    }
}

fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

fn validate_amount(amount: &str) -> Result<(), ValidationError> {
    amount_cents(amount)
        .map(|_| ())
        .map_err(|message| field_error("amount", message))
}

fn validate_status(status: &str) -> Result<(), ValidationError> {
    match InvoiceStatus::parse(status) {
        Some(_) => Ok(()),
        None => Err(field_error("status", STATUS_INVALID_MESSAGE)),
    }
}

/// Human-readable messages per form field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FieldErrors {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub customer_id: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub amount: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub status: Vec<String>,
}

impl From<&ValidationErrors> for FieldErrors {
    fn from(errors: &ValidationErrors) -> Self {
        let mut fields = FieldErrors::default();
        for (field, errs) in errors.field_errors() {
            let messages = errs.iter().map(|e| {
                e.message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string())
            });
            match field.to_string().as_str() {
                "customer_id" | "customerId" => fields.customer_id.extend(messages),
                "amount" => fields.amount.extend(messages),
                "status" => fields.status.extend(messages),
                _ => {}
            }
        }
        fields
    }
}

/// What a form action reports back when it does not redirect.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ActionState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ActionState {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            errors: None,
            message: Some(message.into()),
        }
    }

    pub fn invalid(errors: FieldErrors) -> Self {
        Self {
            errors: Some(errors),
            message: Some(VALIDATION_FAILED_MESSAGE.to_string()),
        }
    }
}
