//! Rows and row sets
//!
//! Source rows arrive positionally. [`RowSet::new`] zips them against the
//! column list once, rejecting any row whose length differs from the column
//! count, so nothing downstream indexes by position.

use super::errors::TablemaskError;
use super::result::Result;
use super::value::CellValue;
use serde::Serialize;
use std::collections::HashSet;

/// Positional row as produced by a row source
pub type Row = Vec<CellValue>;

/// Checks that column names are unique and every row has one value per column
///
/// # Errors
///
/// Returns `SchemaMismatch` naming the first offending column or row.
pub fn validate_shape(columns: &[String], rows: &[Row]) -> Result<()> {
    let mut seen = HashSet::with_capacity(columns.len());
    for column in columns {
        if !seen.insert(column.as_str()) {
            return Err(TablemaskError::SchemaMismatch(format!(
                "duplicate column name '{column}'"
            )));
        }
    }

    if let Some((index, row)) = rows
        .iter()
        .enumerate()
        .find(|(_, row)| row.len() != columns.len())
    {
        return Err(TablemaskError::SchemaMismatch(format!(
            "row {index} has {} values but {} columns were declared",
            row.len(),
            columns.len()
        )));
    }

    Ok(())
}

/// Column names plus rows, validated against each other
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    columns: Vec<String>,
    rows: Vec<Row>,
}

impl RowSet {
    /// Creates a row set
    ///
    /// # Errors
    ///
    /// Returns `SchemaMismatch` if a column name repeats or any row's length
    /// differs from the number of columns.
    pub fn new(columns: Vec<String>, rows: Vec<Row>) -> Result<Self> {
        validate_shape(&columns, &rows)?;
        Ok(Self { columns, rows })
    }

    /// An empty row set with known columns
    pub fn empty(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Output of masking one row, keyed by column name
///
/// Entries keep the source column order so sinks can bind them positionally.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MaskedRow {
    values: Vec<(String, CellValue)>,
}

impl MaskedRow {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
        }
    }

    /// Appends a column value
    pub fn push(&mut self, column: impl Into<String>, value: CellValue) {
        self.values.push((column.into(), value));
    }

    /// Looks up a value by column name
    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.values
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Column names in order
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }
}
