//! Dashboard aggregation.
//!
//! Read-only summary of the shop: stat cards (total sales, product, customer
//! and brand counts), the last seven days of sales grouped by calendar day,
//! and the model of the line chart drawn over them.

use chrono::{DateTime, Days, Local, NaiveDate, TimeDelta, TimeZone, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use tracing::{debug, instrument};

use sneakershop_core::Money;

use crate::error::{AppError, AppResult};
use crate::models::{Brand, Customer, Sale, Sneaker};
use crate::remote::{Direction, Filter, RemoteError, RemoteStore};
use crate::scope::ViewScope;

/// Number of days shown in the weekly chart.
pub const WEEK_DAYS: u64 = 7;

/// Form a dashboard card opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Destination {
    Brands,
    Inventory,
    Sales,
    Customers,
    Staff,
}

/// Headline numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DashboardStats {
    /// Sum of all sale totals.
    pub total_sales: Money,
    pub product_count: u64,
    pub customer_count: u64,
    pub brand_count: u64,
}

/// A clickable stat card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatCard {
    pub title: &'static str,
    pub value: String,
    pub destination: Destination,
}

impl DashboardStats {
    /// Stat cards in display order.
    #[must_use]
    pub fn cards(&self) -> Vec<StatCard> {
        vec![
            StatCard {
                title: "TOTAL SALES",
                value: self.total_sales.display(),
                destination: Destination::Sales,
            },
            StatCard {
                title: "PRODUCTS",
                value: format!("{} items", self.product_count),
                destination: Destination::Inventory,
            },
            StatCard {
                title: "CUSTOMERS",
                value: format!("{} registered", self.customer_count),
                destination: Destination::Customers,
            },
            StatCard {
                title: "BRANDS",
                value: format!("{} brands", self.brand_count),
                destination: Destination::Brands,
            },
        ]
    }
}

/// A static navigation card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavCard {
    pub title: &'static str,
    pub description: &'static str,
    pub destination: Destination,
}

/// Navigation cards in display order.
#[must_use]
pub const fn navigation_cards() -> [NavCard; 5] {
    [
        NavCard {
            title: "Brands",
            description: "Manage sneaker brands",
            destination: Destination::Brands,
        },
        NavCard {
            title: "Inventory",
            description: "Track stock and prices",
            destination: Destination::Inventory,
        },
        NavCard {
            title: "Sales",
            description: "Record and review sales",
            destination: Destination::Sales,
        },
        NavCard {
            title: "Customers",
            description: "Customer records and history",
            destination: Destination::Customers,
        },
        NavCard {
            title: "Staff",
            description: "Manage store staff",
            destination: Destination::Staff,
        },
    ]
}

/// Quick action buttons: label and the form they open.
pub const QUICK_ACTIONS: [(&str, Destination); 3] = [
    ("Add Product", Destination::Inventory),
    ("New Sale", Destination::Sales),
    ("Add Customer", Destination::Customers),
];

/// Sales total for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailySales {
    pub date: NaiveDate,
    pub total: Money,
}

/// Group `sales` by calendar day in `tz` over the seven days ending `today`.
///
/// Returns exactly seven entries, oldest first. Days without sales are zero;
/// sales outside the window are ignored.
#[must_use]
pub fn group_by_day<Tz: TimeZone>(sales: &[Sale], today: NaiveDate, tz: &Tz) -> Vec<DailySales> {
    let mut days: Vec<DailySales> = (0..WEEK_DAYS)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .map(|date| DailySales {
            date,
            total: Money::ZERO,
        })
        .collect();

    for sale in sales {
        let date = sale.sale_date.with_timezone(tz).date_naive();
        if let Some(day) = days.iter_mut().find(|day| day.date == date) {
            day.total += sale.total_amount;
        }
    }

    days
}

/// Everything the dashboard shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSnapshot {
    pub stats: DashboardStats,
    /// Seven days, oldest first.
    pub weekly_sales: Vec<DailySales>,
}

impl DashboardSnapshot {
    /// All-zero snapshot shown before the first load or after a failure.
    #[must_use]
    pub fn placeholder(today: NaiveDate) -> Self {
        Self {
            stats: DashboardStats::default(),
            weekly_sales: group_by_day(&[], today, &Local),
        }
    }

    /// Chart model of the weekly sales inside `area`.
    #[must_use]
    pub fn chart(&self, area: ChartArea) -> Vec<ChartPoint> {
        chart_points(&self.weekly_sales, area)
    }
}

/// Plot area of the chart, in UI units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartArea {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// One plotted day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    pub x: f32,
    pub y: f32,
    /// Abbreviated weekday, e.g. "Mon".
    pub day_label: String,
    /// Whole-dollar value, e.g. "$2231".
    pub value_label: String,
}

/// Lay out daily totals as chart points.
///
/// Points are spaced `width / 8` apart starting one step in from the left.
/// Heights are scaled against the largest total; an all-zero week is drawn
/// flat on the baseline.
#[must_use]
pub fn chart_points(days: &[DailySales], area: ChartArea) -> Vec<ChartPoint> {
    let max = days
        .iter()
        .map(|day| day.total.amount())
        .max()
        .filter(|max| !max.is_zero())
        .unwrap_or(Decimal::ONE);

    let spacing = area.width / 8.0;
    let baseline = area.y + area.height;

    let mut x = area.x;
    days.iter()
        .map(|day| {
            x += spacing;
            let ratio = (day.total.amount() / max).to_f32().unwrap_or(0.0);
            ChartPoint {
                x,
                y: ratio.mul_add(-area.height, baseline),
                day_label: day.date.format("%a").to_string(),
                value_label: day.total.display_whole(),
            }
        })
        .collect()
}

/// Dashboard view model.
pub struct Dashboard<S: RemoteStore> {
    store: S,
    scope: ViewScope,
    snapshot: DashboardSnapshot,
}

impl<S: RemoteStore> std::fmt::Debug for Dashboard<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("snapshot", &self.snapshot)
            .finish_non_exhaustive()
    }
}

impl<S: RemoteStore> Drop for Dashboard<S> {
    fn drop(&mut self) {
        self.scope.close();
    }
}

impl<S: RemoteStore> Dashboard<S> {
    /// Create a dashboard showing the placeholder snapshot.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            scope: ViewScope::new(),
            snapshot: DashboardSnapshot::placeholder(Local::now().date_naive()),
        }
    }

    /// Fetch stats and weekly sales and replace the snapshot.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Remote` or `AppError::Cancelled`; the previous
    /// snapshot stays in place.
    #[instrument(skip(self))]
    pub async fn load(&mut self) -> AppResult<()> {
        let now = Local::now();
        let fetched = self
            .scope
            .run(fetch_snapshot(&self.store, now))
            .await?
            .map_err(|err| AppError::remote("Failed to load dashboard data", err))?;

        debug!(
            total_sales = %fetched.stats.total_sales,
            products = fetched.stats.product_count,
            "Loaded dashboard"
        );
        self.snapshot = fetched;
        Ok(())
    }

    /// Current snapshot.
    #[must_use]
    pub const fn snapshot(&self) -> &DashboardSnapshot {
        &self.snapshot
    }

    /// Close the dashboard, cancelling any load in flight.
    pub fn close(&self) {
        self.scope.close();
    }

    /// Lifetime of this view.
    #[must_use]
    pub const fn scope(&self) -> &ViewScope {
        &self.scope
    }
}

/// Fetch the headline numbers.
///
/// # Errors
///
/// Returns the first `RemoteError` of the five queries.
pub async fn fetch_stats<S: RemoteStore>(store: &S) -> Result<DashboardStats, RemoteError> {
    let all = Filter::all();
    let (sales, products, customers, brands) = tokio::join!(
        store.select::<Sale>(&all),
        store.count::<Sneaker>(&all),
        store.count::<Customer>(&all),
        store.count::<Brand>(&all),
    );

    Ok(DashboardStats {
        total_sales: sales?.iter().map(|sale| sale.total_amount).sum(),
        product_count: products?,
        customer_count: customers?,
        brand_count: brands?,
    })
}

/// Fetch sales from the last seven days, newest first.
///
/// # Errors
///
/// Returns `RemoteError` if the query fails.
pub async fn fetch_recent_sales<S: RemoteStore>(
    store: &S,
    now: DateTime<Utc>,
) -> Result<Vec<Sale>, RemoteError> {
    let since = now - TimeDelta::days(7);
    let filter = Filter::all()
        .since("sale_date", since)
        .order_by("sale_date", Direction::Descending);
    store.select(&filter).await
}

/// Days are the shop's local calendar days.
async fn fetch_snapshot<S: RemoteStore>(
    store: &S,
    now: DateTime<Local>,
) -> Result<DashboardSnapshot, RemoteError> {
    let (stats, recent) = tokio::join!(
        fetch_stats(store),
        fetch_recent_sales(store, now.with_timezone(&Utc))
    );

    Ok(DashboardSnapshot {
        stats: stats?,
        weekly_sales: group_by_day(&recent?, now.date_naive(), &Local),
    })
}
