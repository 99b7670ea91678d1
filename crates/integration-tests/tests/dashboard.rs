//! Integration tests for the dashboard aggregator.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::time::Duration;

use chrono::{Local, TimeDelta, Utc};
use rust_decimal::Decimal;

use sneakershop_backoffice::AppError;
use sneakershop_backoffice::models::{Brand, Customer, Sale, Sneaker};
use sneakershop_backoffice::services::dashboard::{
    self, ChartArea, Dashboard, DashboardSnapshot, Destination,
};
use sneakershop_core::{BrandId, CustomerId, Money, SaleId, SneakerId};
use sneakershop_integration_tests::MemoryStore;

fn money(amount: i64) -> Money {
    Money::new(Decimal::from(amount))
}

fn sale_days_ago(days: i64, total: i64) -> Sale {
    Sale {
        sale_id: SaleId::generate(),
        customer_id: CustomerId::generate(),
        sale_date: Utc::now() - TimeDelta::days(days),
        total_amount: money(total),
    }
}

fn seeded_store() -> MemoryStore {
    let store = MemoryStore::new();
    store.seed(&[
        Brand {
            brand_id: BrandId::generate(),
            brand_name: "Nike".to_string(),
            created_at: Utc::now(),
        },
        Brand {
            brand_id: BrandId::generate(),
            brand_name: "Vans".to_string(),
            created_at: Utc::now(),
        },
    ]);
    store.seed(&[Customer {
        customer_id: CustomerId::generate(),
        name: "Ari".to_string(),
        phone: String::new(),
        email: String::new(),
        created_at: Utc::now(),
    }]);
    store.seed(
        &(0..3)
            .map(|i| Sneaker {
                sneaker_id: SneakerId::generate(),
                name: format!("Model {i}"),
                brand_id: None,
                size: "10".to_string(),
                color: "Black".to_string(),
                price: money(80),
                stock_quantity: 2,
                created_at: Utc::now(),
            })
            .collect::<Vec<_>>(),
    );
    store.seed(&[
        sale_days_ago(1, 1000),
        sale_days_ago(3, 234),
        sale_days_ago(30, 2000),
    ]);
    store
}

#[tokio::test]
async fn test_stats_sum_all_sales_and_count_tables() {
    let store = seeded_store();

    let stats = dashboard::fetch_stats(&store).await.unwrap();

    assert_eq!(stats.total_sales, money(3234));
    assert_eq!(stats.product_count, 3);
    assert_eq!(stats.customer_count, 1);
    assert_eq!(stats.brand_count, 2);

    let values: Vec<String> = stats.cards().into_iter().map(|c| c.value).collect();
    assert_eq!(
        values,
        vec!["$3,234.00", "3 items", "1 registered", "2 brands"]
    );
}

#[tokio::test]
async fn test_recent_sales_window_is_seven_days_newest_first() {
    let store = seeded_store();

    let recent = dashboard::fetch_recent_sales(&store, Utc::now()).await.unwrap();

    assert_eq!(recent.len(), 2);
    assert!(recent[0].sale_date > recent[1].sale_date);
}

#[tokio::test]
async fn test_load_builds_week_with_five_empty_days() {
    let store = seeded_store();
    let mut view = Dashboard::new(store);

    view.load().await.unwrap();
    let snapshot = view.snapshot();

    assert_eq!(snapshot.weekly_sales.len(), 7);
    assert_eq!(snapshot.weekly_sales[6].date, Local::now().date_naive());
    assert_eq!(
        snapshot
            .weekly_sales
            .iter()
            .filter(|d| d.total.is_zero())
            .count(),
        5
    );
    assert_eq!(snapshot.weekly_sales[5].total, money(1000));
    assert_eq!(snapshot.weekly_sales[3].total, money(234));

    let points = snapshot.chart(ChartArea {
        x: 40.0,
        y: 20.0,
        width: 640.0,
        height: 200.0,
    });
    assert_eq!(points.len(), 7);
    assert_eq!(points[5].value_label, "$1000");
    assert!((points[5].y - 20.0).abs() < 1e-3);
}

#[tokio::test]
async fn test_failed_load_keeps_placeholder() {
    let store = seeded_store();
    store.set_failing(true);
    let mut view = Dashboard::new(store);

    let err = view.load().await.unwrap_err();

    assert!(matches!(err, AppError::Remote { .. }));
    assert_eq!(
        *view.snapshot(),
        DashboardSnapshot::placeholder(Local::now().date_naive())
    );
    assert_eq!(view.snapshot().stats.cards()[0].value, "$0.00");
}

#[tokio::test]
async fn test_failed_reload_keeps_previous_snapshot() {
    let store = seeded_store();
    let mut view = Dashboard::new(store.clone());
    view.load().await.unwrap();
    let before = view.snapshot().clone();

    store.set_failing(true);
    assert!(view.load().await.is_err());
    assert_eq!(*view.snapshot(), before);
}

#[tokio::test]
async fn test_close_cancels_dashboard_load() {
    let store = seeded_store();
    store.set_latency(Duration::from_secs(3600));
    let mut view = Dashboard::new(store);

    let scope = view.scope().clone();
    let close = async {
        tokio::task::yield_now().await;
        scope.close();
    };
    let (result, ()) = tokio::join!(view.load(), close);

    assert!(matches!(result, Err(AppError::Cancelled)));
    assert!(view.snapshot().stats.total_sales.is_zero());
}

#[test]
fn test_stat_cards_navigate() {
    let stats = dashboard::DashboardStats::default();
    let destinations: Vec<Destination> = stats.cards().iter().map(|c| c.destination).collect();
    assert_eq!(
        destinations,
        vec![
            Destination::Sales,
            Destination::Inventory,
            Destination::Customers,
            Destination::Brands,
        ]
    );
}
