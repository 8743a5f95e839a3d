pub mod actions;
pub mod data;
pub mod database;
pub mod memory;
pub mod metrics;
pub mod revalidate;
pub mod store;

pub use actions::{InvoiceActions, Outcome};
pub use data::DashboardData;
pub use database::Database;
pub use memory::MemoryStore;
pub use metrics::{get_metrics, init_metrics};
pub use revalidate::{RefreshSignal, Revalidator, INVOICES_PATH};
pub use store::InvoiceStore;
