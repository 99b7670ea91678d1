//! Integration tests for the SneakerShop back office.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p sneakershop-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `forms` - Form controllers end to end against [`MemoryStore`]
//! - `purchase_history` - Purchase history fan-out
//! - `dashboard` - Dashboard aggregation
//! - `postgrest` - HTTP client against a mock `PostgREST` server
//!
//! [`MemoryStore`] keeps every table as JSON rows and evaluates filters the
//! way the table API does, so controllers run unchanged against it.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::cmp::Ordering as CmpOrdering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value;

use sneakershop_backoffice::remote::{
    Condition, Direction, Filter, Op, Record, RemoteError, RemoteStore,
};

/// Kind of table call, as recorded by [`MemoryStore::calls`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Select,
    Insert,
    Update,
    Delete,
    Count,
}

/// One recorded table call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub kind: CallKind,
    pub table: &'static str,
}

#[derive(Debug, Default)]
struct State {
    tables: HashMap<&'static str, Vec<Value>>,
    calls: Vec<Call>,
    failing: bool,
    latency: Option<Duration>,
}

/// In-memory [`RemoteStore`].
///
/// Cheap to clone; clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    /// An empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Put `rows` into their table without recording a call.
    ///
    /// # Panics
    ///
    /// Panics if a row cannot be serialized.
    #[allow(clippy::expect_used)]
    pub fn seed<E: Record>(&self, rows: &[E]) {
        let values: Vec<Value> = rows
            .iter()
            .map(|row| serde_json::to_value(row).expect("row serializes"))
            .collect();
        self.lock().tables.entry(E::TABLE).or_default().extend(values);
    }

    /// Put raw JSON rows into `table` without recording a call.
    ///
    /// Lets tests store rows the typed records would never produce, such as
    /// explicit `null` columns.
    pub fn seed_json(&self, table: &'static str, rows: impl IntoIterator<Item = Value>) {
        self.lock().tables.entry(table).or_default().extend(rows);
    }

    /// Every row of `E`'s table, in insertion order.
    ///
    /// # Panics
    ///
    /// Panics if a stored row does not deserialize as `E`.
    #[allow(clippy::expect_used)]
    #[must_use]
    pub fn rows<E: Record>(&self) -> Vec<E> {
        self.lock()
            .tables
            .get(E::TABLE)
            .map(|rows| {
                rows.iter()
                    .map(|row| serde_json::from_value(row.clone()).expect("row deserializes"))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Make every following call fail with `RemoteError::Unavailable`.
    pub fn set_failing(&self, failing: bool) {
        self.lock().failing = failing;
    }

    /// Delay every following call by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.lock().latency = Some(latency);
    }

    /// Calls made so far.
    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Number of calls of `kind` made so far.
    #[must_use]
    pub fn count_calls(&self, kind: CallKind) -> usize {
        self.lock().calls.iter().filter(|c| c.kind == kind).count()
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// Record the call, wait out the latency and check for injected failure.
    async fn enter(&self, kind: CallKind, table: &'static str) -> Result<(), RemoteError> {
        let latency = {
            let mut state = self.lock();
            state.calls.push(Call { kind, table });
            state.latency
        };

        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        if self.lock().failing {
            return Err(RemoteError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }
}

impl RemoteStore for MemoryStore {
    async fn select<E: Record>(&self, filter: &Filter) -> Result<Vec<E>, RemoteError> {
        self.enter(CallKind::Select, E::TABLE).await?;

        let mut rows: Vec<Value> = self
            .lock()
            .tables
            .get(E::TABLE)
            .map(|rows| rows.iter().filter(|row| row_matches(row, filter)).cloned().collect())
            .unwrap_or_default();

        if let Some(order) = filter.ordering() {
            rows.sort_by(|a, b| {
                let ord = compare_cells(a.get(&order.column), b.get(&order.column));
                match order.direction {
                    Direction::Ascending => ord,
                    Direction::Descending => ord.reverse(),
                }
            });
        }

        rows.into_iter()
            .map(|row| serde_json::from_value(row).map_err(RemoteError::from))
            .collect()
    }

    async fn insert<E: Record>(&self, record: &E) -> Result<(), RemoteError> {
        self.enter(CallKind::Insert, E::TABLE).await?;

        let value = serde_json::to_value(record)?;
        let mut state = self.lock();
        let table = state.tables.entry(E::TABLE).or_default();

        let key = value.get(E::KEY_COLUMN).cloned();
        if table.iter().any(|row| row.get(E::KEY_COLUMN).cloned() == key) {
            return Err(RemoteError::Api {
                status: 409,
                message: format!("duplicate key value violates unique constraint \"{}_pkey\"", E::TABLE),
            });
        }

        table.push(value);
        Ok(())
    }

    async fn update<E: Record>(&self, record: &E, filter: &Filter) -> Result<(), RemoteError> {
        self.enter(CallKind::Update, E::TABLE).await?;

        let Value::Object(columns) = serde_json::to_value(record)? else {
            return Err(RemoteError::InvalidResponse("record is not an object".to_string()));
        };

        let mut state = self.lock();
        if let Some(rows) = state.tables.get_mut(E::TABLE) {
            for row in rows.iter_mut().filter(|row| row_matches(row, filter)) {
                if let Value::Object(existing) = row {
                    existing.extend(columns.clone());
                }
            }
        }
        Ok(())
    }

    async fn delete<E: Record>(&self, filter: &Filter) -> Result<(), RemoteError> {
        self.enter(CallKind::Delete, E::TABLE).await?;

        let mut state = self.lock();
        if let Some(rows) = state.tables.get_mut(E::TABLE) {
            rows.retain(|row| !row_matches(row, filter));
        }
        Ok(())
    }

    async fn count<E: Record>(&self, filter: &Filter) -> Result<u64, RemoteError> {
        self.enter(CallKind::Count, E::TABLE).await?;

        let count = self
            .lock()
            .tables
            .get(E::TABLE)
            .map_or(0, |rows| rows.iter().filter(|row| row_matches(row, filter)).count());
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }
}

/// Whether `row` satisfies every condition of `filter`.
fn row_matches(row: &Value, filter: &Filter) -> bool {
    filter
        .conditions()
        .iter()
        .all(|condition| satisfies(row.get(&condition.column), condition))
}

fn satisfies(cell: Option<&Value>, condition: &Condition) -> bool {
    let Some(cell) = cell.and_then(cell_text) else {
        return false;
    };
    let ord = compare_text(&cell, &condition.value);
    match condition.op {
        Op::Eq => ord == CmpOrdering::Equal,
        Op::Gte => ord != CmpOrdering::Less,
        Op::Lte => ord != CmpOrdering::Greater,
    }
}

/// Text of a scalar cell; `null` and nested values have none.
fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn compare_cells(a: Option<&Value>, b: Option<&Value>) -> CmpOrdering {
    match (a.and_then(cell_text), b.and_then(cell_text)) {
        (Some(a), Some(b)) => compare_text(&a, &b),
        (None, Some(_)) => CmpOrdering::Less,
        (Some(_), None) => CmpOrdering::Greater,
        (None, None) => CmpOrdering::Equal,
    }
}

/// Compare as timestamps, then as decimals, then as text.
fn compare_text(a: &str, b: &str) -> CmpOrdering {
    if let (Ok(a), Ok(b)) = (
        DateTime::parse_from_rfc3339(a),
        DateTime::parse_from_rfc3339(b),
    ) {
        return a.with_timezone(&Utc).cmp(&b.with_timezone(&Utc));
    }
    if let (Ok(a), Ok(b)) = (a.parse::<Decimal>(), b.parse::<Decimal>()) {
        return a.cmp(&b);
    }
    a.cmp(b)
}
