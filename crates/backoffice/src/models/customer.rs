//! Customer records (`customers` table).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sneakershop_core::CustomerId;

use crate::remote::Record;

/// A registered store customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Unique customer ID.
    pub customer_id: CustomerId,
    /// Full name.
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub name: String,
    /// Phone number (free text, may be empty).
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub phone: String,
    /// Email address (free text, may be empty).
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub email: String,
    /// When the customer was created.
    pub created_at: DateTime<Utc>,
}

impl Record for Customer {
    const TABLE: &'static str = "customers";
    const KEY_COLUMN: &'static str = "customer_id";

    fn key(&self) -> String {
        self.customer_id.to_string()
    }
}
