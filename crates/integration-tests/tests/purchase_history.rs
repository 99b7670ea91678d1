//! Integration tests for customer purchase history.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use serde_json::json;

use sneakershop_backoffice::AppError;
use sneakershop_backoffice::forms::CustomerForm;
use sneakershop_backoffice::models::{Customer, Sale, SaleDetail, Sneaker};
use sneakershop_backoffice::services::purchase_history::{self, UNKNOWN_PRODUCT};
use sneakershop_core::{CustomerId, Money, SaleDetailId, SaleId, SneakerId};
use sneakershop_integration_tests::{CallKind, MemoryStore};

fn money(amount: i64) -> Money {
    Money::new(Decimal::from(amount))
}

fn customer(name: &str) -> Customer {
    Customer {
        customer_id: CustomerId::generate(),
        name: name.to_string(),
        phone: String::new(),
        email: String::new(),
        created_at: Utc::now(),
    }
}

fn sneaker(name: &str) -> Sneaker {
    Sneaker {
        sneaker_id: SneakerId::generate(),
        name: name.to_string(),
        brand_id: None,
        size: "9".to_string(),
        color: "White".to_string(),
        price: money(100),
        stock_quantity: 4,
        created_at: Utc::now(),
    }
}

fn sale(customer: &Customer, day: u32, total: i64) -> Sale {
    Sale {
        sale_id: SaleId::generate(),
        customer_id: customer.customer_id,
        sale_date: Utc.with_ymd_and_hms(2026, 10, day, 14, 0, 0).unwrap(),
        total_amount: money(total),
    }
}

fn detail(
    sale: &Sale,
    sneaker_id: SneakerId,
    quantity: i32,
    unit_price: Option<i64>,
    subtotal: Option<i64>,
) -> SaleDetail {
    SaleDetail {
        sale_detail_id: SaleDetailId::generate(),
        sale_id: sale.sale_id,
        sneaker_id,
        quantity,
        unit_price: unit_price.map(money),
        subtotal: subtotal.map(money),
    }
}

/// Ari has two sales with three line items; Sam has one unrelated sale.
fn seeded_store() -> (MemoryStore, Customer) {
    let store = MemoryStore::new();
    let ari = customer("Ari");
    let sam = customer("Sam");
    let samba = sneaker("Samba");
    let gel = sneaker("Gel-Lyte III");

    let first = sale(&ari, 2, 130);
    let second = sale(&ari, 9, 90);
    let other = sale(&sam, 9, 500);

    store.seed(&[ari.clone(), sam]);
    store.seed(&[samba.clone(), gel.clone()]);
    store.seed(&[first.clone(), second.clone(), other.clone()]);
    store.seed(&[
        detail(&first, samba.sneaker_id, 1, Some(100), Some(100)),
        detail(&first, gel.sneaker_id, 3, Some(0), Some(30)),
        detail(&second, SneakerId::generate(), 1, None, Some(90)),
        detail(&other, samba.sneaker_id, 5, Some(100), Some(500)),
    ]);

    (store, ari)
}

#[tokio::test]
async fn test_history_totals_match_line_item_subtotals() {
    let (store, ari) = seeded_store();

    let history = purchase_history::load(&store, &ari).await.unwrap();

    assert_eq!(history.items.len(), 3);
    let expected: Money = history.items.iter().map(|i| i.subtotal).sum();
    assert_eq!(history.summary.total_spent, expected);
    assert_eq!(history.summary.total_spent, money(220));
    assert_eq!(
        history.summary.line(),
        "Total Purchases: 3 | Total Spent: $220.00"
    );
    assert_eq!(history.title(), "PURCHASE HISTORY - Ari (3 purchases)");
}

#[tokio::test]
async fn test_history_resolves_names_and_prices() {
    let (store, ari) = seeded_store();

    let history = purchase_history::load(&store, &ari).await.unwrap();

    let gel = history
        .items
        .iter()
        .find(|i| i.product_name == "Gel-Lyte III")
        .unwrap();
    assert_eq!(gel.quantity, 3);
    assert_eq!(gel.unit_price, money(10));
    assert_eq!(gel.sale_total, money(130));

    let missing = history
        .items
        .iter()
        .find(|i| i.product_name == UNKNOWN_PRODUCT)
        .unwrap();
    assert_eq!(missing.unit_price, money(90));

    let grid = history.grid();
    assert_eq!(grid.columns[0].label, "No.");
    assert_eq!(grid.len(), 3);
}

#[tokio::test]
async fn test_history_issues_one_lookup_per_sale_and_line_item() {
    let (store, ari) = seeded_store();

    purchase_history::load(&store, &ari).await.unwrap();

    // 1 sales query + 2 detail queries + 3 sneaker lookups
    assert_eq!(store.count_calls(CallKind::Select), 6);
}

#[tokio::test]
async fn test_empty_history() {
    let store = MemoryStore::new();
    let nobody = customer("Nobody");
    store.seed(&[nobody.clone()]);

    let history = purchase_history::load(&store, &nobody).await.unwrap();

    assert!(history.is_empty());
    assert_eq!(history.summary.purchase_count, 0);
    assert!(history.summary.total_spent.is_zero());
}

#[tokio::test]
async fn test_history_failure_is_reported() {
    let (store, ari) = seeded_store();
    store.set_failing(true);

    let err = purchase_history::load(&store, &ari).await.unwrap_err();
    assert!(err.dialog().1.starts_with("Error loading purchase history: "));
}

#[tokio::test]
async fn test_customer_form_loads_history_of_selection() {
    let (store, _ari) = seeded_store();
    let mut form = CustomerForm::new(store);
    form.load().await.unwrap();

    assert!(matches!(
        form.purchase_history().await,
        Err(AppError::NoSelection("customer"))
    ));

    form.search("ari");
    form.select_row(0).unwrap();
    let history = form.purchase_history().await.unwrap();
    assert_eq!(history.customer_name, "Ari");
    assert_eq!(history.summary.purchase_count, 3);
}

#[tokio::test]
async fn test_history_reads_sneakers_with_null_columns() {
    let store = MemoryStore::new();
    let ari = customer("Ari");
    let sneaker_id = SneakerId::generate();
    let first = sale(&ari, 4, 75);
    store.seed(&[ari.clone()]);
    store.seed(&[first.clone()]);
    store.seed(&[detail(&first, sneaker_id, 1, Some(75), Some(75))]);
    store.seed_json(
        "sneakers",
        [json!({
            "sneaker_id": sneaker_id.to_string(),
            "name": "Old Skool",
            "brand_id": null,
            "size": null,
            "color": null,
            "price": "75.00",
            "stock_quantity": null,
            "created_at": "2026-10-01T09:15:00+00:00"
        })],
    );

    let history = purchase_history::load(&store, &ari).await.unwrap();

    assert_eq!(history.items.len(), 1);
    assert_eq!(history.items[0].product_name, "Old Skool");
    assert_eq!(history.summary.total_spent, money(75));
}

#[tokio::test]
async fn test_history_follows_edited_customer_after_search() {
    let (store, _ari) = seeded_store();
    let mut form = CustomerForm::new(store);
    form.load().await.unwrap();

    form.search("ari");
    form.select_row(0).unwrap();
    form.edit().unwrap();
    form.search("sam");
    assert!(form.selected_record().is_none());

    let history = form.purchase_history().await.unwrap();
    assert_eq!(history.customer_name, "Ari");
    assert_eq!(history.summary.purchase_count, 3);
}
