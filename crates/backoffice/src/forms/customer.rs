//! Customer form, including the purchase history panel.

use chrono::{DateTime, Utc};
use tracing::instrument;

use sneakershop_core::CustomerId;

use super::{FormController, FormEntity, GRID_TIMESTAMP, required_text};
use crate::components::data_table::{GridRecord, TableColumn};
use crate::error::{AppError, AppResult, ValidationError};
use crate::models::Customer;
use crate::remote::RemoteStore;
use crate::services::purchase_history::{self, PurchaseHistory};

/// Customer form controller.
pub type CustomerForm<S> = FormController<Customer, S>;

/// Customer input fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerInput {
    /// ID field; filled as soon as the form enters create mode.
    pub customer_id: Option<CustomerId>,
    pub name: String,
    pub phone: String,
    pub email: String,
    /// Read-only created date field.
    pub created_at: Option<DateTime<Utc>>,
}

impl GridRecord for Customer {
    fn columns() -> Vec<TableColumn> {
        vec![
            TableColumn::hidden("customer_id", "Customer ID"),
            TableColumn::new("name", "Name"),
            TableColumn::new("phone", "Phone"),
            TableColumn::new("email", "Email"),
            TableColumn::new("created_at", "Created Date"),
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.customer_id.to_string(),
            self.name.clone(),
            self.phone.clone(),
            self.email.clone(),
            self.created_at.format(GRID_TIMESTAMP).to_string(),
        ]
    }
}

impl FormEntity for Customer {
    type Input = CustomerInput;

    const NOUN: &'static str = "customer";
    const TITLE: &'static str = "Customer";
    const PLURAL: &'static str = "customers";

    fn prepare_create(input: &mut CustomerInput) {
        input.customer_id = Some(CustomerId::generate());
    }

    fn to_input(&self) -> CustomerInput {
        CustomerInput {
            customer_id: Some(self.customer_id),
            name: self.name.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
            created_at: Some(self.created_at),
        }
    }

    fn search_fields(&self) -> Vec<String> {
        vec![self.name.clone(), self.phone.clone(), self.email.clone()]
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }

    fn build(
        input: &CustomerInput,
        original: Option<&Self>,
        _cache: &[Self],
    ) -> Result<Self, ValidationError> {
        let name = required_text(&input.name, "name", "name")?;

        let customer_id = match original {
            Some(original) => original.customer_id,
            None => input.customer_id.unwrap_or_else(CustomerId::generate),
        };

        Ok(Self {
            customer_id,
            name,
            phone: input.phone.trim().to_string(),
            email: input.email.trim().to_string(),
            created_at: original.map_or_else(Utc::now, |o| o.created_at),
        })
    }
}

impl<S: RemoteStore> FormController<Customer, S> {
    /// Load the purchase history of the selected customer, or of the customer
    /// being edited when no row is selected.
    ///
    /// # Errors
    ///
    /// Returns `AppError::NoSelection` when there is neither, otherwise
    /// `AppError::Remote` or `AppError::Cancelled` if any lookup fails.
    #[instrument(skip(self))]
    pub async fn purchase_history(&self) -> AppResult<PurchaseHistory> {
        let customer = self
            .current()
            .ok_or(AppError::NoSelection(Customer::NOUN))?;

        self.scope
            .run(purchase_history::load(&self.store, customer))
            .await?
    }
}
