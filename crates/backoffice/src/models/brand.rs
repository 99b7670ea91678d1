//! Brand records (`brands` table).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sneakershop_core::BrandId;

use crate::remote::Record;

/// A sneaker brand.
///
/// Names are unique case-insensitively; the brand form enforces this against
/// its cache before saving.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    /// Unique brand ID.
    pub brand_id: BrandId,
    /// Display name.
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub brand_name: String,
    /// When the brand was created.
    pub created_at: DateTime<Utc>,
}

impl Brand {
    /// Whether `name` matches this brand's name, ignoring case.
    #[must_use]
    pub fn has_name(&self, name: &str) -> bool {
        self.brand_name.to_lowercase() == name.trim().to_lowercase()
    }
}

impl Record for Brand {
    const TABLE: &'static str = "brands";
    const KEY_COLUMN: &'static str = "brand_id";

    fn key(&self) -> String {
        self.brand_id.to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_has_name_ignores_case_and_padding() {
        let brand = Brand {
            brand_id: BrandId::generate(),
            brand_name: "Nike".to_string(),
            created_at: Utc::now(),
        };
        assert!(brand.has_name("NIKE"));
        assert!(brand.has_name("  nike "));
        assert!(!brand.has_name("Nikes"));
    }

    #[test]
    fn test_deserializes_table_row() {
        let row = r#"{
            "brand_id": "6f1c1c2e-4f5a-4c55-9a59-1d2f0d2a9b10",
            "brand_name": "Adidas",
            "created_at": "2026-10-01T09:15:00.123456+00:00"
        }"#;
        let brand: Brand = serde_json::from_str(row).unwrap();
        assert_eq!(brand.brand_name, "Adidas");
        assert_eq!(brand.key(), "6f1c1c2e-4f5a-4c55-9a59-1d2f0d2a9b10");
    }
}
