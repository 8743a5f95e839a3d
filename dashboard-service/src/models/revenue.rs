//! Revenue report rows.

use serde::{Deserialize, Serialize};

/// One row of the revenue table, columns passed through as-is.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Revenue(pub serde_json::Value);
