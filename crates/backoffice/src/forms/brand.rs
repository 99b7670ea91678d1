//! Brand form.

use chrono::{DateTime, Utc};

use sneakershop_core::BrandId;

use super::{FormController, FormEntity, GRID_TIMESTAMP, required_text};
use crate::components::data_table::{GridRecord, TableColumn};
use crate::error::ValidationError;
use crate::models::Brand;

/// Brand form controller.
pub type BrandForm<S> = FormController<Brand, S>;

/// Brand input fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrandInput {
    /// Read-only ID field (empty in create mode).
    pub brand_id: Option<BrandId>,
    /// Brand name text box.
    pub name: String,
    /// Read-only created date field.
    pub created_at: Option<DateTime<Utc>>,
}

impl GridRecord for Brand {
    fn columns() -> Vec<TableColumn> {
        vec![
            TableColumn::new("brand_name", "Brand Name"),
            TableColumn::new("created_at", "Created Date"),
            TableColumn::hidden("brand_id", "UUID"),
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.brand_name.clone(),
            self.created_at.format(GRID_TIMESTAMP).to_string(),
            self.brand_id.to_string(),
        ]
    }
}

impl FormEntity for Brand {
    type Input = BrandInput;

    const NOUN: &'static str = "brand";
    const TITLE: &'static str = "Brand";
    const PLURAL: &'static str = "brands";

    fn to_input(&self) -> BrandInput {
        BrandInput {
            brand_id: Some(self.brand_id),
            name: self.brand_name.clone(),
            created_at: Some(self.created_at),
        }
    }

    fn search_fields(&self) -> Vec<String> {
        vec![self.brand_name.clone()]
    }

    fn display_name(&self) -> String {
        self.brand_name.clone()
    }

    fn build(
        input: &BrandInput,
        original: Option<&Self>,
        cache: &[Self],
    ) -> Result<Self, ValidationError> {
        let name = required_text(&input.name, "name", "brand name")?;

        let duplicate = cache
            .iter()
            .filter(|brand| original.is_none_or(|o| o.brand_id != brand.brand_id))
            .any(|brand| brand.has_name(&name));
        if duplicate {
            return Err(ValidationError::new(
                "name",
                "Brand name already exists. Please choose a different name.",
            ));
        }

        Ok(match original {
            Some(original) => Self {
                brand_name: name,
                ..original.clone()
            },
            None => Self {
                brand_id: BrandId::generate(),
                brand_name: name,
                created_at: Utc::now(),
            },
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn brand(name: &str) -> Brand {
        Brand {
            brand_id: BrandId::generate(),
            brand_name: name.to_string(),
            created_at: Utc::now(),
        }
    }

    fn input(name: &str) -> BrandInput {
        BrandInput {
            name: name.to_string(),
            ..BrandInput::default()
        }
    }

    #[test]
    fn test_build_requires_name() {
        let err = Brand::build(&input("  "), None, &[]).unwrap_err();
        assert_eq!(err.field, "name");
        assert_eq!(err.message, "Please enter brand name.");
    }

    #[test]
    fn test_build_rejects_case_insensitive_duplicate() {
        let cache = vec![brand("Nike")];
        let err = Brand::build(&input("nIKE"), None, &cache).unwrap_err();
        assert_eq!(
            err.message,
            "Brand name already exists. Please choose a different name."
        );
    }

    #[test]
    fn test_build_allows_renaming_self_by_case() {
        let nike = brand("Nike");
        let cache = vec![nike.clone(), brand("Puma")];

        let updated = Brand::build(&input("NIKE"), Some(&nike), &cache).unwrap();
        assert_eq!(updated.brand_id, nike.brand_id);
        assert_eq!(updated.created_at, nike.created_at);
        assert_eq!(updated.brand_name, "NIKE");

        assert!(Brand::build(&input("puma"), Some(&nike), &cache).is_err());
    }

    #[test]
    fn test_build_generates_fresh_ids() {
        let a = Brand::build(&input("Asics"), None, &[]).unwrap();
        let b = Brand::build(&input("Reebok"), None, &[]).unwrap();
        assert_ne!(a.brand_id, b.brand_id);
        assert_eq!(a.brand_name, "Asics");
    }

    #[test]
    fn test_grid_cells_align_with_columns() {
        let b = brand("Vans");
        assert_eq!(b.cells().len(), Brand::columns().len());
        assert_eq!(b.cells()[0], "Vans");
    }

    #[test]
    fn test_created_date_cell_shows_seconds() {
        let mut b = brand("Vans");
        b.created_at = Utc.with_ymd_and_hms(2026, 10, 1, 9, 15, 42).unwrap();
        assert_eq!(b.cells()[1], "2026-10-01 09:15:42");
    }
}
