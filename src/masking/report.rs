//! Per-column masking statistics
//!
//! The report never holds row values, only counts, so it can be logged,
//! printed and written to the audit trail.

use serde::Serialize;
use std::collections::BTreeMap;

/// Statistics for one masked column
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnReport {
    /// `maskingType` from the policy
    pub rule: String,

    /// Strategy the rule compiled to
    pub strategy: String,

    /// Values rewritten by the strategy
    pub values_masked: usize,

    /// NULLs left as NULL
    pub nulls_kept: usize,
}

/// Statistics for one masking pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MaskingReport {
    /// Rows that went through the engine
    pub rows_masked: usize,

    /// Masked columns keyed by name
    pub columns: BTreeMap<String, ColumnReport>,

    /// Columns with an unrecognized masking type, copied unchanged
    pub passthrough_columns: Vec<String>,

    /// Columns dropped because their rule was invalid
    pub skipped_columns: Vec<String>,

    /// Policy entries naming columns the source does not have
    pub unmatched_rules: Vec<String>,
}

impl MaskingReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a masked column before any rows are counted
    pub fn track_column(&mut self, column: &str, rule: &str, strategy: &str) {
        self.columns
            .entry(column.to_string())
            .or_insert_with(|| ColumnReport {
                rule: rule.to_string(),
                strategy: strategy.to_string(),
                ..ColumnReport::default()
            });
    }

    pub(crate) fn record_masked(&mut self, column: &str) {
        if let Some(stats) = self.columns.get_mut(column) {
            stats.values_masked += 1;
        }
    }

    pub(crate) fn record_null(&mut self, column: &str) {
        if let Some(stats) = self.columns.get_mut(column) {
            stats.nulls_kept += 1;
        }
    }

    /// Total values rewritten across all columns
    pub fn total_values_masked(&self) -> usize {
        self.columns.values().map(|c| c.values_masked).sum()
    }

    /// Log the report
    pub fn log_summary(&self) {
        tracing::info!(
            rows_masked = self.rows_masked,
            masked_columns = self.columns.len(),
            values_masked = self.total_values_masked(),
            "Masking pass completed"
        );

        for (column, stats) in &self.columns {
            tracing::debug!(
                column = %column,
                rule = %stats.rule,
                strategy = %stats.strategy,
                values_masked = stats.values_masked,
                nulls_kept = stats.nulls_kept,
                "Column masked"
            );
        }

        if !self.passthrough_columns.is_empty() {
            tracing::warn!(
                columns = ?self.passthrough_columns,
                "Columns with unrecognized masking types were copied unchanged"
            );
        }

        if !self.skipped_columns.is_empty() {
            tracing::warn!(
                columns = ?self.skipped_columns,
                "Columns with invalid rules were left out of the output"
            );
        }

        if !self.unmatched_rules.is_empty() {
            tracing::info!(
                columns = ?self.unmatched_rules,
                "Policy rules did not match any source column"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let mut report = MaskingReport::new();
        report.track_column("ssn", "last_4", "last_4");
        report.record_masked("ssn");
        report.record_masked("ssn");
        report.record_null("ssn");
        // Untracked columns are ignored
        report.record_masked("id");

        let ssn = &report.columns["ssn"];
        assert_eq!(ssn.values_masked, 2);
        assert_eq!(ssn.nulls_kept, 1);
        assert_eq!(report.total_values_masked(), 2);
        assert!(!report.columns.contains_key("id"));
    }

    #[test]
    fn test_serializes_without_values() {
        let mut report = MaskingReport::new();
        report.track_column("email", "partial", "partial_email");
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["columns"]["email"]["strategy"], "partial_email");
    }
}
