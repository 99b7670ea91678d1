//! Customer purchase history.
//!
//! Lists every line item a customer bought, resolved through one lookup per
//! sale and one per line item. Nothing is batched or joined remotely.

use chrono::{DateTime, Local, Utc};
use rust_decimal::RoundingStrategy;
use serde::Serialize;
use tracing::{debug, instrument};

use sneakershop_core::Money;

use crate::components::data_table::{GridRecord, GridView, TableColumn};
use crate::error::{AppError, AppResult};
use crate::models::{Customer, Sale, SaleDetail, Sneaker};
use crate::remote::{Filter, Record, RemoteError, RemoteStore};

/// Product name shown when the sneaker row is gone.
pub const UNKNOWN_PRODUCT: &str = "Unknown Product";

/// One purchased line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseHistoryItem {
    pub sale_date: DateTime<Utc>,
    pub product_name: String,
    pub quantity: i32,
    /// Recorded unit price, or `subtotal / quantity` when none was recorded.
    pub unit_price: Money,
    pub subtotal: Money,
    /// Total of the whole sale the item belongs to.
    pub sale_total: Money,
}

impl GridRecord for PurchaseHistoryItem {
    fn columns() -> Vec<TableColumn> {
        vec![
            TableColumn::new("sale_date", "Sale Date"),
            TableColumn::new("product_name", "Product"),
            TableColumn::new("quantity", "Qty"),
            TableColumn::new("unit_price", "Unit Price"),
            TableColumn::new("subtotal", "Subtotal"),
            TableColumn::new("sale_total", "Total Sale"),
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.sale_date.with_timezone(&Local).format("%Y-%m-%d").to_string(),
            self.product_name.clone(),
            self.quantity.to_string(),
            self.unit_price.display(),
            self.subtotal.display(),
            self.sale_total.display(),
        ]
    }
}

/// Totals across all line items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PurchaseSummary {
    /// Number of line items.
    pub purchase_count: usize,
    /// Sum of line-item subtotals.
    pub total_spent: Money,
}

impl PurchaseSummary {
    /// Summarize `items`.
    #[must_use]
    pub fn of(items: &[PurchaseHistoryItem]) -> Self {
        Self {
            purchase_count: items.len(),
            total_spent: items.iter().map(|item| item.subtotal).sum(),
        }
    }

    /// Summary line, e.g. `Total Purchases: 3 | Total Spent: $120.00`.
    #[must_use]
    pub fn line(&self) -> String {
        let spent = self
            .total_spent
            .amount()
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        format!(
            "Total Purchases: {} | Total Spent: ${spent:.2}",
            self.purchase_count
        )
    }
}

/// A customer's purchase history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseHistory {
    pub customer_name: String,
    pub items: Vec<PurchaseHistoryItem>,
    pub summary: PurchaseSummary,
}

impl PurchaseHistory {
    /// Whether the customer has bought nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Panel title, e.g. `PURCHASE HISTORY - Ari (2 purchases)`.
    #[must_use]
    pub fn title(&self) -> String {
        format!(
            "PURCHASE HISTORY - {} ({} purchases)",
            self.customer_name, self.summary.purchase_count
        )
    }

    /// Grid of the line items.
    #[must_use]
    pub fn grid(&self) -> GridView {
        GridView::project(&self.items)
    }
}

/// Load the purchase history of `customer`.
///
/// # Errors
///
/// Returns `AppError::Remote` if any of the lookups fails; partial results are
/// discarded.
#[instrument(skip(store, customer), fields(customer_id = %customer.customer_id))]
pub async fn load<S: RemoteStore>(store: &S, customer: &Customer) -> AppResult<PurchaseHistory> {
    let items = collect_items(store, customer)
        .await
        .map_err(|err| AppError::remote("Error loading purchase history", err))?;

    let summary = PurchaseSummary::of(&items);
    debug!(
        purchases = summary.purchase_count,
        total_spent = %summary.total_spent,
        "Loaded purchase history"
    );

    Ok(PurchaseHistory {
        customer_name: customer.name.clone(),
        items,
        summary,
    })
}

async fn collect_items<S: RemoteStore>(
    store: &S,
    customer: &Customer,
) -> Result<Vec<PurchaseHistoryItem>, RemoteError> {
    let sales: Vec<Sale> = store
        .select(&Filter::all().eq("customer_id", customer.customer_id))
        .await?;

    let mut items = Vec::new();
    for sale in &sales {
        let details: Vec<SaleDetail> = store
            .select(&Filter::all().eq("sale_id", sale.sale_id))
            .await?;

        for detail in details {
            let product_name = product_name(store, &detail).await?;
            items.push(line_item(sale, &detail, product_name));
        }
    }

    Ok(items)
}

async fn product_name<S: RemoteStore>(
    store: &S,
    detail: &SaleDetail,
) -> Result<String, RemoteError> {
    let sneakers: Vec<Sneaker> = store
        .select(&Filter::all().eq(Sneaker::KEY_COLUMN, detail.sneaker_id))
        .await?;

    Ok(sneakers
        .into_iter()
        .next()
        .map_or_else(|| UNKNOWN_PRODUCT.to_string(), |sneaker| sneaker.name))
}

/// Build the history line for one detail row.
#[must_use]
pub fn line_item(sale: &Sale, detail: &SaleDetail, product_name: String) -> PurchaseHistoryItem {
    PurchaseHistoryItem {
        sale_date: sale.sale_date,
        product_name,
        quantity: detail.quantity,
        unit_price: detail.effective_unit_price(),
        subtotal: detail.subtotal_or_zero(),
        sale_total: sale.total_amount,
    }
}
