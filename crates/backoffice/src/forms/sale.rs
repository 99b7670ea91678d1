//! Sale form.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use tracing::instrument;

use sneakershop_core::{CustomerId, SaleId};

use super::{FormController, FormEntity, parse_money};
use crate::components::data_table::{GridRecord, TableColumn};
use crate::error::{AppError, AppResult, ValidationError};
use crate::models::{Customer, Sale};
use crate::remote::{Direction, Filter, RemoteStore};

/// Sale form controller.
pub type SaleForm<S> = FormController<Sale, S>;

/// Date format of the sale date field and search.
const SALE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Sale date as shown to the shop: its local calendar day.
fn shop_date(sale_date: DateTime<Utc>) -> String {
    sale_date
        .with_timezone(&Local)
        .format(SALE_DATE_FORMAT)
        .to_string()
}

/// Sale input fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaleInput {
    /// Customer picked from the customer list.
    pub customer_id: Option<CustomerId>,
    /// Sale date as `YYYY-MM-DD`; empty means now.
    pub sale_date: String,
    /// Total amount text box.
    pub total_amount: String,
}

impl GridRecord for Sale {
    fn columns() -> Vec<TableColumn> {
        vec![
            TableColumn::hidden("sale_id", "Sale ID"),
            TableColumn::new("customer_id", "Customer ID"),
            TableColumn::new("sale_date", "Sale Date"),
            TableColumn::new("total_amount", "Total Amount"),
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.sale_id.to_string(),
            self.customer_id.to_string(),
            shop_date(self.sale_date),
            self.total_amount.display(),
        ]
    }
}

impl FormEntity for Sale {
    type Input = SaleInput;

    const NOUN: &'static str = "sale";
    const TITLE: &'static str = "Sale";
    const PLURAL: &'static str = "sales";

    fn list_filter() -> Filter {
        Filter::all().order_by("sale_date", Direction::Descending)
    }

    fn prepare_create(input: &mut SaleInput) {
        input.sale_date = Local::now().format(SALE_DATE_FORMAT).to_string();
    }

    fn to_input(&self) -> SaleInput {
        SaleInput {
            customer_id: Some(self.customer_id),
            sale_date: shop_date(self.sale_date),
            total_amount: self.total_amount.amount().to_string(),
        }
    }

    fn search_fields(&self) -> Vec<String> {
        vec![
            self.customer_id.to_string(),
            shop_date(self.sale_date),
        ]
    }

    fn display_name(&self) -> String {
        format!(
            "the sale of {} on {}",
            self.total_amount.display(),
            shop_date(self.sale_date)
        )
    }

    fn build(
        input: &SaleInput,
        original: Option<&Self>,
        _cache: &[Self],
    ) -> Result<Self, ValidationError> {
        let customer_id = input
            .customer_id
            .ok_or_else(|| ValidationError::new("customer_id", "Please select a customer."))?;
        let sale_date = parse_sale_date(&input.sale_date, original, &Local)?;
        let total_amount = parse_money(&input.total_amount, "total_amount", "total amount")?;

        Ok(Self {
            sale_id: original.map_or_else(SaleId::generate, |o| o.sale_id),
            customer_id,
            sale_date,
            total_amount,
        })
    }
}

/// Resolve the sale date field, read as a calendar day in `tz`.
///
/// An unchanged date keeps the original time of day; a new date is taken at
/// midnight in `tz`; an empty field means now.
fn parse_sale_date<Tz: TimeZone>(
    text: &str,
    original: Option<&Sale>,
    tz: &Tz,
) -> Result<DateTime<Utc>, ValidationError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(original.map_or_else(Utc::now, |o| o.sale_date));
    }

    let date = NaiveDate::parse_from_str(text, SALE_DATE_FORMAT).map_err(|_| {
        ValidationError::new("sale_date", "Please enter the sale date as YYYY-MM-DD.")
    })?;

    if let Some(original) =
        original.filter(|o| o.sale_date.with_timezone(tz).date_naive() == date)
    {
        return Ok(original.sale_date);
    }

    let midnight = date.and_time(NaiveTime::MIN);
    Ok(tz
        .from_local_datetime(&midnight)
        .earliest()
        .map_or_else(|| midnight.and_utc(), |start| start.with_timezone(&Utc)))
}

impl<S: RemoteStore> FormController<Sale, S> {
    /// Customers for the customer picker, by name.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Remote` or `AppError::Cancelled`.
    #[instrument(skip(self))]
    pub async fn customer_options(&self) -> AppResult<Vec<Customer>> {
        let filter = Filter::all().order_by("name", Direction::Ascending);
        self.scope
            .run(self.store.select::<Customer>(&filter))
            .await?
            .map_err(|err| AppError::remote("Error loading customers", err))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use rust_decimal::Decimal;

    use sneakershop_core::Money;

    use super::*;

    fn input(date: &str) -> SaleInput {
        SaleInput {
            customer_id: Some(CustomerId::generate()),
            sale_date: date.to_string(),
            total_amount: "250.00".to_string(),
        }
    }

    #[test]
    fn test_build_parses_amount_and_date() {
        let sale = Sale::build(&input("2026-10-14"), None, &[]).unwrap();
        assert_eq!(shop_date(sale.sale_date), "2026-10-14");
        assert_eq!(sale.total_amount, Money::new(Decimal::new(25_000, 2)));
    }

    #[test]
    fn test_new_date_starts_at_shop_midnight() {
        let shop = chrono::FixedOffset::west_opt(5 * 3600).unwrap();
        let date = parse_sale_date("2026-10-14", None, &shop).unwrap();
        assert_eq!(date, Utc.with_ymd_and_hms(2026, 10, 14, 5, 0, 0).unwrap());

        let date = parse_sale_date("2026-10-14", None, &Utc).unwrap();
        assert_eq!(date, Utc.with_ymd_and_hms(2026, 10, 14, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_unchanged_date_compares_shop_day() {
        let shop = chrono::FixedOffset::west_opt(5 * 3600).unwrap();
        let mut original = Sale::build(&input("2026-10-14"), None, &[]).unwrap();
        // 20:30 on the 15th at UTC-5
        original.sale_date = Utc.with_ymd_and_hms(2026, 10, 16, 1, 30, 0).unwrap();

        let kept = parse_sale_date("2026-10-15", Some(&original), &shop).unwrap();
        assert_eq!(kept, original.sale_date);

        let moved = parse_sale_date("2026-10-16", Some(&original), &shop).unwrap();
        assert_eq!(moved, Utc.with_ymd_and_hms(2026, 10, 16, 5, 0, 0).unwrap());
    }

    #[test]
    fn test_build_keeps_time_when_date_unchanged() {
        let mut original = Sale::build(&input("2026-10-14"), None, &[]).unwrap();
        original.sale_date = Utc.with_ymd_and_hms(2026, 10, 14, 15, 42, 7).unwrap();

        let updated = Sale::build(&original.to_input(), Some(&original), &[]).unwrap();
        assert_eq!(updated.sale_date, original.sale_date);
        assert_eq!(updated.sale_id, original.sale_id);
    }

    #[test]
    fn test_build_rejects_bad_date() {
        let err = Sale::build(&input("14/10/2026"), None, &[]).unwrap_err();
        assert_eq!(err.field, "sale_date");
    }

    #[test]
    fn test_build_requires_customer() {
        let err = Sale::build(
            &SaleInput {
                customer_id: None,
                ..input("2026-10-14")
            },
            None,
            &[],
        )
        .unwrap_err();
        assert_eq!(err.message, "Please select a customer.");
    }

    #[test]
    fn test_search_fields_include_date() {
        let sale = Sale::build(&input("2026-10-14"), None, &[]).unwrap();
        assert!(sale.search_fields().contains(&"2026-10-14".to_string()));
    }

    #[test]
    fn test_prepare_create_defaults_to_today() {
        let mut input = SaleInput::default();
        Sale::prepare_create(&mut input);
        assert_eq!(input.sale_date, Local::now().format(SALE_DATE_FORMAT).to_string());
    }
}
