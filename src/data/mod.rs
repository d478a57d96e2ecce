//! Data handling: tabular training input and single-record inference input.
//!
//! [`DataTable`] is the training-time container: named, typed columns with
//! one categorical label column. [`Record`] is the inference-time input:
//! a feature-name → scalar mapping for one patient.

mod record;
mod schema;
mod table;

pub use record::{Record, Value};
pub use schema::ColumnType;
pub use table::{Column, ColumnData, DataTable, DataTableBuilder, TableError};

/// Name of the mandatory label column.
pub const LABEL_COLUMN: &str = "diagnosis";
