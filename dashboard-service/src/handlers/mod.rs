//! HTTP handlers for dashboard-service.

pub mod dashboard;
pub mod health;
pub mod invoices;
