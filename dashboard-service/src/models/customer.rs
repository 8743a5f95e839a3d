//! Customer model. Customers are read-only here.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub email: String,
    pub image_url: String,
}

/// Entry in the customer picker.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct CustomerField {
    pub id: String,
    pub name: String,
}
