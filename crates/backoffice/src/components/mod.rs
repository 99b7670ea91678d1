//! Headless view components shared by the forms.

pub mod data_table;

pub use data_table::{GridRecord, GridRow, GridView, TableColumn};
