//! Staff form.

use chrono::Utc;

use sneakershop_core::StaffId;

use super::{FormController, FormEntity, GRID_TIMESTAMP, required_text};
use crate::components::data_table::{GridRecord, TableColumn};
use crate::error::ValidationError;
use crate::models::Staff;

/// Staff form controller.
pub type StaffForm<S> = FormController<Staff, S>;

/// Staff input fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaffInput {
    pub name: String,
    pub position: String,
    pub phone: String,
    pub email: String,
}

impl GridRecord for Staff {
    fn columns() -> Vec<TableColumn> {
        vec![
            TableColumn::hidden("staff_id", "Staff ID"),
            TableColumn::new("name", "Name"),
            TableColumn::new("position", "Position"),
            TableColumn::new("phone", "Phone"),
            TableColumn::new("email", "Email"),
            TableColumn::new("created_at", "Created Date"),
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.staff_id.to_string(),
            self.name.clone(),
            self.position.clone(),
            self.phone.clone(),
            self.email.clone(),
            self.created_at.format(GRID_TIMESTAMP).to_string(),
        ]
    }
}

impl FormEntity for Staff {
    type Input = StaffInput;

    const NOUN: &'static str = "staff member";
    const TITLE: &'static str = "Staff member";
    const PLURAL: &'static str = "staff";

    fn to_input(&self) -> StaffInput {
        StaffInput {
            name: self.name.clone(),
            position: self.position.clone(),
            phone: self.phone.clone(),
            email: self.email.clone(),
        }
    }

    fn search_fields(&self) -> Vec<String> {
        vec![self.name.clone(), self.position.clone(), self.email.clone()]
    }

    fn display_name(&self) -> String {
        self.name.clone()
    }

    fn build(
        input: &StaffInput,
        original: Option<&Self>,
        _cache: &[Self],
    ) -> Result<Self, ValidationError> {
        let name = required_text(&input.name, "name", "name")?;

        Ok(Self {
            staff_id: original.map_or_else(StaffId::generate, |o| o.staff_id),
            name,
            position: input.position.trim().to_string(),
            phone: input.phone.trim().to_string(),
            email: input.email.trim().to_string(),
            created_at: original.map_or_else(Utc::now, |o| o.created_at),
        })
    }
}
