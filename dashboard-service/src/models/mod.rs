//! Domain models for dashboard-service.

mod card;
mod customer;
mod invoice;
mod revenue;

pub use card::CardData;
pub use customer::{Customer, CustomerField};
pub use invoice::{
    search_term, total_pages, Invoice, InvoiceChanges, InvoiceFilter, InvoiceForm, InvoiceRow,
    InvoiceStatus, InvoicesTableRow, LatestInvoice, LatestInvoiceRaw, NewInvoice, StatusTotals,
    ITEMS_PER_PAGE,
};
pub use revenue::Revenue;
