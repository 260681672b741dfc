//! PostgreSQL row sink

use super::client::{describe_pg_error, ConnectionParams, PostgreSQLClient, StoreRole};
use super::models::{bind_rows, build_insert, chunk_size, ColumnBinding};
use crate::adapters::database::RowSink;
use crate::config::WriteConfig;
use crate::domain::{MaskedRow, Result, TableRef, TablemaskError};
use async_trait::async_trait;
use std::time::Instant;
use tokio_postgres::types::ToSql;

/// Inserts masked rows into an existing table
pub struct PostgresRowSink {
    params: ConnectionParams,
    table: TableRef,
    write: WriteConfig,
}

impl PostgresRowSink {
    pub fn new(params: ConnectionParams, table: TableRef, write: WriteConfig) -> Self {
        Self {
            params,
            table,
            write,
        }
    }

    fn write_error(&self, message: String, rows_written: u64) -> TablemaskError {
        tracing::debug!(table = %self.table, rows_written, "Write failed");
        TablemaskError::TargetWrite {
            message,
            rows_written,
        }
    }

    /// Inserts one chunk inside `tx`
    async fn insert_chunk(
        &self,
        tx: &tokio_postgres::Transaction<'_>,
        rows: &[MaskedRow],
        columns: &[String],
        bindings: &[ColumnBinding],
    ) -> std::result::Result<u64, String> {
        let params = bind_rows(rows, columns, bindings)
            .map_err(|(column, e)| format!("column '{column}': {e}"))?;
        let refs: Vec<&(dyn ToSql + Sync)> = params
            .iter()
            .map(|p| p.as_ref() as &(dyn ToSql + Sync))
            .collect();

        let sql = build_insert(&self.table, columns, Some(bindings), rows.len());
        tx.execute(sql.as_str(), &refs)
            .await
            .map_err(|e| describe_pg_error(&e))
    }
}

#[async_trait]
impl RowSink for PostgresRowSink {
    async fn write(&self, rows: &[MaskedRow], columns: &[String]) -> Result<u64> {
        if rows.is_empty() {
            return Ok(0);
        }

        let start = Instant::now();
        let client = PostgreSQLClient::new(&self.params, StoreRole::Target)?;
        let mut conn = client.get_connection().await?;

        // Prepare a one-row insert to learn the target column types
        let prepare_sql = build_insert(&self.table, columns, None, 1);
        let statement = conn.prepare(&prepare_sql).await.map_err(|e| {
            self.write_error(
                format!("failed to prepare insert: {}", describe_pg_error(&e)),
                0,
            )
        })?;
        let bindings: Vec<ColumnBinding> = statement
            .params()
            .iter()
            .map(ColumnBinding::for_type)
            .collect();

        let chunk = chunk_size(self.write.batch_size, columns.len());
        let batches = rows.len().div_ceil(chunk);
        tracing::debug!(
            table = %self.table,
            rows = rows.len(),
            batches,
            chunk_size = chunk,
            transactional = self.write.transactional,
            "Writing masked rows"
        );

        let mut committed: u64 = 0;

        if self.write.transactional {
            let tx = conn.transaction().await.map_err(|e| {
                self.write_error(format!("failed to begin: {}", describe_pg_error(&e)), 0)
            })?;

            let mut written: u64 = 0;
            for (index, batch) in rows.chunks(chunk).enumerate() {
                // Dropping the transaction on error rolls it back
                written += self
                    .insert_chunk(&tx, batch, columns, &bindings)
                    .await
                    .map_err(|e| self.write_error(format!("batch {}: {e}", index + 1), 0))?;
            }

            tx.commit().await.map_err(|e| {
                self.write_error(format!("failed to commit: {}", describe_pg_error(&e)), 0)
            })?;
            committed = written;
        } else {
            for (index, batch) in rows.chunks(chunk).enumerate() {
                let tx = conn.transaction().await.map_err(|e| {
                    self.write_error(
                        format!("failed to begin: {}", describe_pg_error(&e)),
                        committed,
                    )
                })?;
                let written = self
                    .insert_chunk(&tx, batch, columns, &bindings)
                    .await
                    .map_err(|e| self.write_error(format!("batch {}: {e}", index + 1), committed))?;
                tx.commit().await.map_err(|e| {
                    self.write_error(
                        format!("failed to commit batch {}: {}", index + 1, describe_pg_error(&e)),
                        committed,
                    )
                })?;
                committed += written;

                tracing::debug!(table = %self.table, batch = index + 1, committed, "Batch committed");
            }
        }

        tracing::info!(
            table = %self.table,
            host = %client.location(),
            rows_written = committed,
            duration_ms = start.elapsed().as_millis() as u64,
            "Masked rows written"
        );

        Ok(committed)
    }

    fn describe(&self) -> String {
        format!("{} {}", self.params.describe(), self.table)
    }
}
