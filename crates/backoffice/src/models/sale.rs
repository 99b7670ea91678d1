//! Sale and sale line-item records (`sales`, `sale_details` tables).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use sneakershop_core::{CustomerId, Money, SaleDetailId, SaleId, SneakerId};

use crate::remote::Record;

/// A completed sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    /// Unique sale ID.
    pub sale_id: SaleId,
    /// Customer who bought.
    pub customer_id: CustomerId,
    /// When the sale happened.
    pub sale_date: DateTime<Utc>,
    /// Amount charged for the whole sale.
    pub total_amount: Money,
}

impl Record for Sale {
    const TABLE: &'static str = "sales";
    const KEY_COLUMN: &'static str = "sale_id";

    fn key(&self) -> String {
        self.sale_id.to_string()
    }
}

/// One line item of a sale.
///
/// Older rows may have no recorded unit price or subtotal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleDetail {
    /// Unique line-item ID.
    pub sale_detail_id: SaleDetailId,
    /// Parent sale.
    pub sale_id: SaleId,
    /// Product sold.
    pub sneaker_id: SneakerId,
    /// Units sold.
    pub quantity: i32,
    /// Recorded price per unit.
    #[serde(default)]
    pub unit_price: Option<Money>,
    /// Recorded line total.
    #[serde(default)]
    pub subtotal: Option<Money>,
}

impl SaleDetail {
    /// Recorded subtotal, zero when absent.
    #[must_use]
    pub fn subtotal_or_zero(&self) -> Money {
        self.subtotal.unwrap_or(Money::ZERO)
    }

    /// Unit price to display.
    ///
    /// Falls back to `subtotal / quantity` when the recorded price is zero or
    /// absent but both quantity and subtotal are positive.
    #[must_use]
    pub fn effective_unit_price(&self) -> Money {
        let recorded = self.unit_price.unwrap_or(Money::ZERO);
        let subtotal = self.subtotal_or_zero().amount();

        if recorded.is_zero() && self.quantity > 0 && subtotal > Decimal::ZERO {
            Money::new(subtotal / Decimal::from(self.quantity))
        } else {
            recorded
        }
    }
}

impl Record for SaleDetail {
    const TABLE: &'static str = "sale_details";
    const KEY_COLUMN: &'static str = "sale_detail_id";

    fn key(&self) -> String {
        self.sale_detail_id.to_string()
    }
}
