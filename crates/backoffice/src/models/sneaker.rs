//! Sneaker (inventory) records (`sneakers` table).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sneakershop_core::{BrandId, Money, SneakerId};

use crate::remote::Record;

/// A sneaker model held in inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sneaker {
    /// Unique sneaker ID.
    pub sneaker_id: SneakerId,
    /// Model name, shown on sale lines.
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub name: String,
    /// Brand this model belongs to.
    pub brand_id: Option<BrandId>,
    /// Size label (e.g., "10.5").
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub size: String,
    /// Colorway.
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub color: String,
    /// Retail price.
    pub price: Money,
    /// Units on hand.
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub stock_quantity: i32,
    /// When the sneaker was created.
    pub created_at: DateTime<Utc>,
}

impl Record for Sneaker {
    const TABLE: &'static str = "sneakers";
    const KEY_COLUMN: &'static str = "sneaker_id";

    fn key(&self) -> String {
        self.sneaker_id.to_string()
    }
}
