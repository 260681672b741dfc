//! PostgreSQL row source

use super::client::{describe_pg_error, ConnectionParams, PostgreSQLClient, StoreRole};
use super::models::{build_select, read_cell};
use crate::adapters::database::RowSource;
use crate::domain::{Result, RowSet, TableRef, TablemaskError};
use async_trait::async_trait;
use std::time::Instant;
use tokio_postgres::types::Type;

/// Reads a whole table
pub struct PostgresRowSource {
    params: ConnectionParams,
    table: TableRef,
}

impl PostgresRowSource {
    pub fn new(params: ConnectionParams, table: TableRef) -> Self {
        Self { params, table }
    }
}

#[async_trait]
impl RowSource for PostgresRowSource {
    async fn fetch(&self) -> Result<RowSet> {
        let start = Instant::now();
        let client = PostgreSQLClient::new(&self.params, StoreRole::Source)?;
        let conn = client.get_connection().await?;

        let query_error = |stage: &str, e: tokio_postgres::Error| {
            TablemaskError::SourceQuery(format!("{stage}: {}", describe_pg_error(&e)))
        };

        // Describe the table first so that non-native columns can be cast
        let describe_sql = format!("SELECT * FROM {}", self.table.quoted());
        let described = conn
            .prepare(&describe_sql)
            .await
            .map_err(|e| query_error("failed to describe table", e))?;
        let columns: Vec<(String, Type)> = described
            .columns()
            .iter()
            .map(|c| (c.name().to_string(), c.type_().clone()))
            .collect();

        let select_sql = build_select(&self.table, &columns);
        tracing::debug!(table = %self.table, sql = %select_sql, "Fetching source rows");

        let pg_rows = conn
            .query(&select_sql, &[])
            .await
            .map_err(|e| query_error("failed to read rows", e))?;

        let mut rows = Vec::with_capacity(pg_rows.len());
        for pg_row in &pg_rows {
            let row = (0..columns.len())
                .map(|idx| read_cell(pg_row, idx))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| query_error("failed to decode row", e))?;
            rows.push(row);
        }

        let names = columns.into_iter().map(|(name, _)| name).collect();
        let row_set = RowSet::new(names, rows)?;

        tracing::info!(
            table = %self.table,
            host = %client.location(),
            rows = row_set.len(),
            columns = row_set.columns().len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Source rows fetched"
        );

        Ok(row_set)
    }

    fn describe(&self) -> String {
        format!("{} {}", self.params.describe(), self.table)
    }
}
