//! Row predicates for remote table requests.
//!
//! A [`Filter`] is a conjunction of `column op value` conditions plus an
//! optional ordering. It renders to `PostgREST` query parameters
//! (`brand_id=eq.<uuid>`, `order=sale_date.desc`) and is evaluated directly
//! by in-process stores.

use std::fmt::Display;

use chrono::{DateTime, SecondsFormat, Utc};

/// Comparison operator for a single condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// Column equals value.
    Eq,
    /// Column is greater than or equal to value.
    Gte,
    /// Column is less than or equal to value.
    Lte,
}

impl Op {
    /// `PostgREST` operator keyword.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Gte => "gte",
            Self::Lte => "lte",
        }
    }
}

/// A single `column op value` predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    /// Column name.
    pub column: String,
    /// Comparison operator.
    pub op: Op,
    /// Right-hand side, already rendered as text.
    pub value: String,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Ordering applied to a select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ordering {
    /// Column to sort by.
    pub column: String,
    /// Sort direction.
    pub direction: Direction,
}

/// A conjunction of conditions with optional ordering.
///
/// An empty filter matches every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    conditions: Vec<Condition>,
    order: Option<Ordering>,
}

impl Filter {
    /// A filter that matches every row.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Add an equality condition.
    #[must_use]
    pub fn eq(self, column: &str, value: impl Display) -> Self {
        self.push(column, Op::Eq, value.to_string())
    }

    /// Add a `>=` condition.
    #[must_use]
    pub fn gte(self, column: &str, value: impl Display) -> Self {
        self.push(column, Op::Gte, value.to_string())
    }

    /// Add a `<=` condition.
    #[must_use]
    pub fn lte(self, column: &str, value: impl Display) -> Self {
        self.push(column, Op::Lte, value.to_string())
    }

    /// Add a `>=` condition on a timestamp column.
    #[must_use]
    pub fn since(self, column: &str, at: DateTime<Utc>) -> Self {
        self.push(column, Op::Gte, render_timestamp(at))
    }

    /// Sort results by `column`.
    #[must_use]
    pub fn order_by(mut self, column: &str, direction: Direction) -> Self {
        self.order = Some(Ordering {
            column: column.to_string(),
            direction,
        });
        self
    }

    fn push(mut self, column: &str, op: Op, value: String) -> Self {
        self.conditions.push(Condition {
            column: column.to_string(),
            op,
            value,
        });
        self
    }

    /// The conditions, in insertion order.
    #[must_use]
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// The requested ordering, if any.
    #[must_use]
    pub const fn ordering(&self) -> Option<&Ordering> {
        self.order.as_ref()
    }

    /// Render as `PostgREST` query parameters (excluding `select`).
    #[must_use]
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs: Vec<(String, String)> = self
            .conditions
            .iter()
            .map(|c| (c.column.clone(), format!("{}.{}", c.op.keyword(), c.value)))
            .collect();

        if let Some(order) = &self.order {
            let dir = match order.direction {
                Direction::Ascending => "asc",
                Direction::Descending => "desc",
            };
            pairs.push(("order".to_string(), format!("{}.{dir}", order.column)));
        }

        pairs
    }
}

/// Render a timestamp the way the table API stores it.
#[must_use]
pub fn render_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}
