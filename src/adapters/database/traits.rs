//! Row source and row sink traits
//!
//! The pipeline only talks to stores through these two traits, so tests can
//! drive it with in-memory implementations.

use crate::domain::{MaskedRow, Result, RowSet};
use async_trait::async_trait;

/// Reads every row of one table
#[async_trait]
pub trait RowSource: Send + Sync {
    /// Fetch all rows with their column names
    ///
    /// An empty row set means there is nothing to copy.
    ///
    /// # Errors
    ///
    /// Returns `SourceConnection` if the store cannot be reached and
    /// `SourceQuery` if the read fails. No partial result is returned.
    async fn fetch(&self) -> Result<RowSet>;

    /// Human-readable location, e.g. `db.example.com/app public.users`
    fn describe(&self) -> String;
}

/// Writes masked rows into one table
#[async_trait]
pub trait RowSink: Send + Sync {
    /// Insert `rows`, binding values in `columns` order
    ///
    /// Returns the number of rows written.
    ///
    /// # Errors
    ///
    /// Returns `TargetConnection` if the store cannot be reached and
    /// `TargetWrite` if an insert fails. `TargetWrite::rows_written` counts
    /// rows already committed, which is only ever non-zero when the sink
    /// commits per batch.
    async fn write(&self, rows: &[MaskedRow], columns: &[String]) -> Result<u64>;

    /// Human-readable location
    fn describe(&self) -> String;
}
