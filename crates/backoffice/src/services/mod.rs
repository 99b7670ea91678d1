//! Read-only aggregations over several tables.

pub mod dashboard;
pub mod purchase_history;

pub use dashboard::{Dashboard, DashboardSnapshot, DashboardStats, Destination};
pub use purchase_history::{PurchaseHistory, PurchaseHistoryItem, PurchaseSummary};
