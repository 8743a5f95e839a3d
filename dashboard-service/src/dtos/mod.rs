mod invoice_form;

pub use invoice_form::{
    ActionState, FieldErrors, InvoiceFormInput, ValidatedInvoice, AMOUNT_INVALID_MESSAGE,
    AMOUNT_TOO_LARGE_MESSAGE, CUSTOMER_REQUIRED_MESSAGE, MISSING_ID_MESSAGE,
    STATUS_INVALID_MESSAGE, VALIDATION_FAILED_MESSAGE,
};
