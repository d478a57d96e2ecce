//! Tabular dataset container and builder.
//!
//! This module provides [`DataTable`] and [`DataTableBuilder`].

use super::schema::ColumnType;

/// Errors that can occur while building a [`DataTable`].
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("table must contain at least one column")]
    EmptyTable,

    #[error("column '{column}' has {got} rows, expected {expected}")]
    RowCountMismatch {
        column: String,
        expected: usize,
        got: usize,
    },

    #[error("duplicate column name: '{0}'")]
    DuplicateColumn(String),
}

/// Values of a single column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    /// Numeric values; `f64::NAN` marks a missing entry.
    Numeric(Vec<f64>),
    /// Categorical values; `None` marks a missing entry.
    Categorical(Vec<Option<String>>),
}

impl ColumnData {
    /// Number of rows in the column.
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Numeric(v) => v.len(),
            ColumnData::Categorical(v) => v.len(),
        }
    }

    /// Returns true if the column has no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The logical type of this column.
    pub fn column_type(&self) -> ColumnType {
        match self {
            ColumnData::Numeric(_) => ColumnType::Numeric,
            ColumnData::Categorical(_) => ColumnType::Categorical,
        }
    }
}

/// A named, typed column.
#[derive(Debug, Clone)]
pub struct Column {
    name: String,
    data: ColumnData,
}

impl Column {
    /// Column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column values.
    pub fn data(&self) -> &ColumnData {
        &self.data
    }

    /// The logical type of this column.
    pub fn column_type(&self) -> ColumnType {
        self.data.column_type()
    }
}

/// The tabular dataset used for training.
///
/// Rows are patients; columns are named features plus one categorical
/// label column (conventionally `diagnosis`). Column insertion order is
/// preserved and becomes the canonical feature order after preprocessing
/// drops the label column.
///
/// # Example
///
/// ```
/// use prognos::data::DataTable;
///
/// let table = DataTable::builder()
///     .numeric("age", vec![45.0, 32.0, 67.0])
///     .categorical("gender", vec![Some("M".into()), Some("F".into()), Some("M".into())])
///     .categorical(
///         "diagnosis",
///         vec![Some("flu".into()), Some("migraine".into()), Some("flu".into())],
///     )
///     .build()
///     .unwrap();
///
/// assert_eq!(table.n_rows(), 3);
/// assert_eq!(table.n_columns(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct DataTable {
    columns: Vec<Column>,
}

impl DataTable {
    /// Create a builder for table construction.
    pub fn builder() -> DataTableBuilder {
        DataTableBuilder::new()
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.columns.first().map(|c| c.data.len()).unwrap_or(0)
    }

    /// Number of columns (including the label column).
    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns true if a column with the given name exists.
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Iterate over columns in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter()
    }

    /// Column names in insertion order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

/// Builder for [`DataTable`] construction.
///
/// Columns are appended in call order; [`build`](Self::build) validates
/// that every column has the same row count and that names are unique.
#[derive(Debug, Default)]
pub struct DataTableBuilder {
    columns: Vec<Column>,
}

impl DataTableBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a numeric column. `f64::NAN` marks missing entries.
    pub fn numeric(mut self, name: &str, values: Vec<f64>) -> Self {
        self.columns.push(Column {
            name: name.to_string(),
            data: ColumnData::Numeric(values),
        });
        self
    }

    /// Add a categorical column. `None` marks missing entries.
    pub fn categorical(mut self, name: &str, values: Vec<Option<String>>) -> Self {
        self.columns.push(Column {
            name: name.to_string(),
            data: ColumnData::Categorical(values),
        });
        self
    }

    /// Build the table.
    ///
    /// # Errors
    ///
    /// Returns [`TableError`] if no columns were added, row counts differ,
    /// or a column name repeats.
    pub fn build(self) -> Result<DataTable, TableError> {
        if self.columns.is_empty() {
            return Err(TableError::EmptyTable);
        }

        let n_rows = self.columns[0].data.len();
        for col in &self.columns {
            if col.data.len() != n_rows {
                return Err(TableError::RowCountMismatch {
                    column: col.name.clone(),
                    expected: n_rows,
                    got: col.data.len(),
                });
            }
        }

        for (i, col) in self.columns.iter().enumerate() {
            if self.columns[..i].iter().any(|c| c.name == col.name) {
                return Err(TableError::DuplicateColumn(col.name.clone()));
            }
        }

        Ok(DataTable {
            columns: self.columns,
        })
    }
}
