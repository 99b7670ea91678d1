//! Data table (grid) projection types.
//!
//! Forms never bind records to the grid dynamically. Each entity projects
//! itself into a typed row of display cells (see [`GridRecord`]), and the
//! controller assembles a [`GridView`] with a leading 1-based "No." column.

use serde::{Deserialize, Serialize};

/// Key of the row-number column every grid starts with.
pub const ROW_NUMBER_KEY: &str = "number";

/// Column definition for a data table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableColumn {
    /// Unique key for the column.
    pub key: String,
    /// Display label for the column header.
    pub label: String,
    /// Whether the column is shown (ID columns are kept but hidden).
    pub visible: bool,
}

impl TableColumn {
    /// Create a new visible column.
    #[must_use]
    pub fn new(key: &str, label: &str) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            visible: true,
        }
    }

    /// Create a hidden column (e.g., the UUID key).
    #[must_use]
    pub fn hidden(key: &str, label: &str) -> Self {
        Self {
            visible: false,
            ..Self::new(key, label)
        }
    }
}

/// A record that can be shown as a grid row.
pub trait GridRecord {
    /// Columns in display order, excluding the row number.
    fn columns() -> Vec<TableColumn>;

    /// Cell text for each of [`GridRecord::columns`], in the same order.
    fn cells(&self) -> Vec<String>;
}

/// One rendered row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridRow {
    /// 1-based position in the bound list.
    pub number: usize,
    /// Cell text, aligned with the view's columns after the row number.
    pub cells: Vec<String>,
}

/// A complete grid: headers plus rows of the currently bound records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridView {
    /// Column headers, starting with "No.".
    pub columns: Vec<TableColumn>,
    /// Rows in bound order.
    pub rows: Vec<GridRow>,
}

impl GridView {
    /// Project `records` into a grid.
    #[must_use]
    pub fn project<'a, T>(records: impl IntoIterator<Item = &'a T>) -> Self
    where
        T: GridRecord + 'a,
    {
        let mut columns = vec![TableColumn::new(ROW_NUMBER_KEY, "No.")];
        columns.extend(T::columns());

        let rows = records
            .into_iter()
            .enumerate()
            .map(|(i, record)| GridRow {
                number: i + 1,
                cells: record.cells(),
            })
            .collect();

        Self { columns, rows }
    }

    /// Whether there are no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Text of the cell at `row` under the column `key`.
    #[must_use]
    pub fn cell(&self, row: usize, key: &str) -> Option<&str> {
        let position = self.columns.iter().position(|c| c.key == key)?;
        let row = self.rows.get(row)?;
        if position == 0 {
            return None;
        }
        row.cells.get(position - 1).map(String::as_str)
    }
}
