//! Staff records (`staff` table).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sneakershop_core::StaffId;

use crate::remote::Record;

/// A store employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Staff {
    /// Unique staff ID.
    pub staff_id: StaffId,
    /// Full name.
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub name: String,
    /// Job title (e.g., "Cashier").
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub position: String,
    /// Phone number.
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub phone: String,
    /// Email address.
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub email: String,
    /// When the staff member was created.
    pub created_at: DateTime<Utc>,
}

impl Record for Staff {
    const TABLE: &'static str = "staff";
    const KEY_COLUMN: &'static str = "staff_id";

    fn key(&self) -> String {
        self.staff_id.to_string()
    }
}
