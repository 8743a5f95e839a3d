//! Invoice and customer dashboard service.
//!
//! Form actions validate and persist invoices; read endpoints serve the
//! dashboard overview and the filtered, paginated invoice listing.

pub mod config;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
pub mod utils;

pub use startup::{router, AppState, Application};
