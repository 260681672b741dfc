//! Row source and sink factory
//!
//! PostgreSQL is the only backend; the factory keeps the pipeline and the CLI
//! independent of the concrete types.

use crate::adapters::database::traits::{RowSink, RowSource};
use crate::adapters::postgresql::{ConnectionParams, PostgresRowSink, PostgresRowSource};
use crate::config::WriteConfig;
use crate::domain::{Result, TableRef, TablemaskError};
use std::sync::Arc;

fn parse_table(raw: &str) -> Result<TableRef> {
    TableRef::new(raw)
        .map_err(|e| TablemaskError::Configuration(format!("Invalid table name '{raw}': {e}")))
}

/// Create a row source for `table`
///
/// # Errors
///
/// Returns `Configuration` if the table name is not `table` or `schema.table`.
pub fn create_row_source(params: ConnectionParams, table: &str) -> Result<Arc<dyn RowSource>> {
    let table = parse_table(table)?;
    tracing::debug!(location = %params.describe(), table = %table, "Creating PostgreSQL row source");
    Ok(Arc::new(PostgresRowSource::new(params, table)))
}

/// Create a row sink for `table`
///
/// # Errors
///
/// Returns `Configuration` if the table name is not `table` or `schema.table`.
pub fn create_row_sink(
    params: ConnectionParams,
    table: &str,
    write: WriteConfig,
) -> Result<Arc<dyn RowSink>> {
    let table = parse_table(table)?;
    tracing::debug!(location = %params.describe(), table = %table, "Creating PostgreSQL row sink");
    Ok(Arc::new(PostgresRowSink::new(params, table, write)))
}
