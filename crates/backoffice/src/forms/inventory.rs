//! Inventory (sneaker) form.

use chrono::{DateTime, Utc};
use tracing::instrument;

use sneakershop_core::{BrandId, SneakerId};

use super::{
    FormController, FormEntity, GRID_TIMESTAMP, parse_count, parse_money, required_text,
};
use crate::components::data_table::{GridRecord, TableColumn};
use crate::error::{AppError, AppResult, ValidationError};
use crate::models::{Brand, Sneaker};
use crate::remote::{Direction, Filter, RemoteStore};

/// Inventory form controller.
pub type InventoryForm<S> = FormController<Sneaker, S>;

/// Sneaker input fields.
///
/// Price and stock are text boxes; they are parsed on save.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SneakerInput {
    pub name: String,
    /// Brand picked from the brand list.
    pub brand_id: Option<BrandId>,
    pub size: String,
    pub color: String,
    pub price: String,
    pub stock_quantity: String,
    /// Read-only created date field.
    pub created_at: Option<DateTime<Utc>>,
}

impl GridRecord for Sneaker {
    fn columns() -> Vec<TableColumn> {
        vec![
            TableColumn::hidden("sneaker_id", "Sneaker ID"),
            TableColumn::new("name", "Name"),
            TableColumn::hidden("brand_id", "Brand ID"),
            TableColumn::new("size", "Size"),
            TableColumn::new("color", "Color"),
            TableColumn::new("price", "Price"),
            TableColumn::new("stock_quantity", "Stock"),
            TableColumn::new("created_at", "Created Date"),
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.sneaker_id.to_string(),
            self.name.clone(),
            self.brand_id.map(|id| id.to_string()).unwrap_or_default(),
            self.size.clone(),
            self.color.clone(),
            self.price.display(),
            self.stock_quantity.to_string(),
            self.created_at.format(GRID_TIMESTAMP).to_string(),
        ]
    }
}

impl FormEntity for Sneaker {
    type Input = SneakerInput;

    const NOUN: &'static str = "sneaker";
    const TITLE: &'static str = "Sneaker";
    const PLURAL: &'static str = "sneakers";

    fn to_input(&self) -> SneakerInput {
        SneakerInput {
            name: self.name.clone(),
            brand_id: self.brand_id,
            size: self.size.clone(),
            color: self.color.clone(),
            price: self.price.amount().to_string(),
            stock_quantity: self.stock_quantity.to_string(),
            created_at: Some(self.created_at),
        }
    }

    fn search_fields(&self) -> Vec<String> {
        vec![self.name.clone(), self.color.clone()]
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }

    fn build(
        input: &SneakerInput,
        original: Option<&Self>,
        _cache: &[Self],
    ) -> Result<Self, ValidationError> {
        let name = required_text(&input.name, "name", "sneaker name")?;
        let brand_id = input
            .brand_id
            .ok_or_else(|| ValidationError::new("brand_id", "Please select a brand."))?;
        let price = parse_money(&input.price, "price", "price")?;
        let stock_quantity = parse_count(&input.stock_quantity, "stock_quantity", "stock quantity")?;

        Ok(Self {
            sneaker_id: original.map_or_else(SneakerId::generate, |o| o.sneaker_id),
            name,
            brand_id: Some(brand_id),
            size: input.size.trim().to_string(),
            color: input.color.trim().to_string(),
            price,
            stock_quantity,
            created_at: original.map_or_else(Utc::now, |o| o.created_at),
        })
    }
}

impl<S: RemoteStore> FormController<Sneaker, S> {
    /// Brands for the brand picker, by name.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Remote` or `AppError::Cancelled`.
    #[instrument(skip(self))]
    pub async fn brand_options(&self) -> AppResult<Vec<Brand>> {
        let filter = Filter::all().order_by("brand_name", Direction::Ascending);
        self.scope
            .run(self.store.select::<Brand>(&filter))
            .await?
            .map_err(|err| AppError::remote("Error loading brands", err))
    }
}
