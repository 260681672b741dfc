//! Masking rule engine
//!
//! This module provides [`MaskingEngine`], which compiles a [`MaskingPolicy`]
//! once per run and then masks rows against it.
//!
//! # Behavior
//!
//! For every row and every column:
//! - columns without a rule are copied unchanged
//! - columns whose rule has an unrecognized masking type are copied unchanged
//! - every other column is rewritten by the strategy its rule compiled to
//!
//! Rows and columns are independent of each other and each value is
//! transformed at most once. Output rows keep the input order.
//!
//! # Examples
//!
//! ```
//! use tablemask::domain::CellValue;
//! use tablemask::masking::{InvalidRulePolicy, MaskingEngine, MaskingPolicy};
//! use serde_json::json;
//!
//! let policy = MaskingPolicy::parse(&json!({
//!     "fields": { "ssn": { "maskingType": "last_4", "replacement": "XXX-XX-" } }
//! }))?;
//! let engine = MaskingEngine::new(&policy, InvalidRulePolicy::Abort)?;
//!
//! let outcome = engine.mask(
//!     &[vec![CellValue::from("123-45-6789")]],
//!     &["ssn".to_string()],
//! )?;
//! assert_eq!(outcome.rows[0].get("ssn"), Some(&CellValue::from("XXX-XX-6789")));
//! # Ok::<(), tablemask::domain::TablemaskError>(())
//! ```

use crate::domain::{validate_shape, CellValue, MaskedRow, Result, Row, RowSet, TablemaskError};
use crate::masking::config::InvalidRulePolicy;
use crate::masking::policy::{
    MaskingKind, MaskingPolicy, MaskingRule, Replacement, DEFAULT_PARTIAL_REPLACEMENT,
};
use crate::masking::report::MaskingReport;
use crate::masking::strategy::{
    LastFourStrategy, MaskStrategy, PartialStrategy, RedactionStrategy,
};
use std::collections::{HashMap, HashSet};
use std::time::Instant;

/// A policy rule after validation
enum CompiledRule {
    Mask {
        kind: MaskingKind,
        strategy: Box<dyn MaskStrategy>,
    },
    /// Unrecognized masking type; the value is copied unchanged
    Passthrough(String),
    /// Invalid rule under [`InvalidRulePolicy::SkipColumn`]
    Skip,
}

/// Masked rows plus statistics for one masking pass
#[derive(Debug, Clone, Default)]
pub struct MaskOutcome {
    /// Masked rows in input order
    pub rows: Vec<MaskedRow>,

    /// Columns present in every masked row, in source order
    pub columns: Vec<String>,

    /// Per-column statistics
    pub report: MaskingReport,
}

/// Main masking engine
///
/// The engine holds no mutable state, so one instance can mask any number of
/// row sets, including from several tasks at once.
pub struct MaskingEngine {
    rules: HashMap<String, CompiledRule>,
    skipped: Vec<String>,
}

impl MaskingEngine {
    /// Compiles a policy
    ///
    /// # Errors
    ///
    /// Returns `InvalidRule` for the first malformed rule (in column-name
    /// order) when `on_invalid_rule` is [`InvalidRulePolicy::Abort`]. With
    /// [`InvalidRulePolicy::SkipColumn`] malformed rules are logged and their
    /// columns are dropped from the output instead.
    pub fn new(policy: &MaskingPolicy, on_invalid_rule: InvalidRulePolicy) -> Result<Self> {
        let mut rules = HashMap::with_capacity(policy.len());
        let mut skipped = Vec::new();

        for (column, rule) in policy.rules() {
            let compiled = match compile_rule(column, rule) {
                Ok(compiled) => compiled,
                Err(e) => match on_invalid_rule {
                    InvalidRulePolicy::Abort => {
                        tracing::error!(column = %column, error = %e, "Invalid masking rule");
                        return Err(e);
                    }
                    InvalidRulePolicy::SkipColumn => {
                        tracing::warn!(
                            column = %column,
                            error = %e,
                            "Invalid masking rule, column will be left out of the output"
                        );
                        skipped.push(column.to_string());
                        CompiledRule::Skip
                    }
                },
            };

            match &compiled {
                CompiledRule::Mask { kind, strategy } => tracing::debug!(
                    column = %column,
                    rule = %kind,
                    strategy = strategy.label(),
                    "Masking rule compiled"
                ),
                CompiledRule::Passthrough(name) => tracing::warn!(
                    column = %column,
                    masking_type = %name,
                    "Unrecognized masking type, values will be copied unchanged"
                ),
                CompiledRule::Skip => {}
            }

            rules.insert(column.to_string(), compiled);
        }

        Ok(Self { rules, skipped })
    }

    /// Columns dropped because their rule was invalid
    pub fn skipped_columns(&self) -> &[String] {
        &self.skipped
    }

    /// Source columns that survive into the masked output
    pub fn output_columns(&self, columns: &[String]) -> Vec<String> {
        columns
            .iter()
            .filter(|column| !matches!(self.rules.get(column.as_str()), Some(CompiledRule::Skip)))
            .cloned()
            .collect()
    }

    /// Masks positional rows against a column list
    ///
    /// # Errors
    ///
    /// Returns `SchemaMismatch` if the column names repeat or any row's length
    /// differs from the column count. No row is masked in that case.
    pub fn mask(&self, rows: &[Row], columns: &[String]) -> Result<MaskOutcome> {
        validate_shape(columns, rows)?;
        Ok(self.mask_validated(rows, columns))
    }

    /// Masks a row set whose shape was validated on ingress
    pub fn mask_row_set(&self, row_set: &RowSet) -> MaskOutcome {
        self.mask_validated(row_set.rows(), row_set.columns())
    }

    fn mask_validated(&self, rows: &[Row], columns: &[String]) -> MaskOutcome {
        let start = Instant::now();
        let report = self.new_report(columns);
        let mut outcome = MaskOutcome {
            rows: Vec::with_capacity(rows.len()),
            columns: self.output_columns(columns),
            report,
        };

        for row in rows {
            let masked = self.mask_row(columns, row, &mut outcome.report);
            outcome.rows.push(masked);
        }
        outcome.report.rows_masked = outcome.rows.len();

        tracing::debug!(
            rows = outcome.rows.len(),
            columns = columns.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Rows masked"
        );

        outcome
    }

    /// Masks a single row; `row` must have one value per column
    fn mask_row(&self, columns: &[String], row: &[CellValue], report: &mut MaskingReport) -> MaskedRow {
        let mut masked = MaskedRow::with_capacity(columns.len());

        for (column, value) in columns.iter().zip(row) {
            match self.rules.get(column.as_str()) {
                None | Some(CompiledRule::Passthrough(_)) => {
                    masked.push(column.as_str(), value.clone());
                }
                Some(CompiledRule::Skip) => {}
                Some(CompiledRule::Mask { strategy, .. }) => {
                    let output = match value.render() {
                        Some(text) => Some(strategy.mask(&text)),
                        None => strategy.mask_null(),
                    };
                    match output {
                        Some(text) => {
                            report.record_masked(column);
                            masked.push(column.as_str(), CellValue::Text(text));
                        }
                        None => {
                            report.record_null(column);
                            masked.push(column.as_str(), CellValue::Null);
                        }
                    }
                }
            }
        }

        masked
    }

    fn new_report(&self, columns: &[String]) -> MaskingReport {
        let mut report = MaskingReport::new();
        let present: HashSet<&str> = columns.iter().map(String::as_str).collect();

        for column in columns {
            match self.rules.get(column.as_str()) {
                Some(CompiledRule::Mask { kind, strategy }) => {
                    report.track_column(column, kind.type_name(), strategy.label());
                }
                Some(CompiledRule::Passthrough(_)) => {
                    report.passthrough_columns.push(column.clone());
                }
                Some(CompiledRule::Skip) => report.skipped_columns.push(column.clone()),
                None => {}
            }
        }

        let mut unmatched: Vec<String> = self
            .rules
            .keys()
            .filter(|column| !present.contains(column.as_str()))
            .cloned()
            .collect();
        unmatched.sort();
        report.unmatched_rules = unmatched;

        report
    }
}

/// Masks rows with a policy, aborting on the first invalid rule
///
/// Convenience wrapper around [`MaskingEngine`] for one-off use.
pub fn mask(rows: &[Row], columns: &[String], policy: &MaskingPolicy) -> Result<Vec<MaskedRow>> {
    let engine = MaskingEngine::new(policy, InvalidRulePolicy::Abort)?;
    Ok(engine.mask(rows, columns)?.rows)
}

/// Checks a single rule and names the strategy it compiles to
///
/// Unrecognized masking types report `"passthrough"`.
///
/// # Errors
///
/// Returns `InvalidRule` when the rule is malformed for its masking type.
pub fn rule_strategy(column: &str, rule: &MaskingRule) -> Result<&'static str> {
    Ok(match compile_rule(column, rule)? {
        CompiledRule::Mask { strategy, .. } => strategy.label(),
        CompiledRule::Passthrough(_) | CompiledRule::Skip => "passthrough",
    })
}

fn compile_rule(column: &str, rule: &MaskingRule) -> Result<CompiledRule> {
    if let Replacement::Malformed(found) = rule.replacement {
        return Err(TablemaskError::InvalidRule {
            column: column.to_string(),
            reason: format!("'replacement' must be a string, got {found}"),
        });
    }

    let strategy: Box<dyn MaskStrategy> = match &rule.kind {
        MaskingKind::Redact => Box::new(RedactionStrategy::new(required_replacement(column, rule)?)),
        MaskingKind::LastFour => Box::new(LastFourStrategy::new(required_replacement(column, rule)?)),
        MaskingKind::Partial => Box::new(PartialStrategy::for_column(
            column,
            rule.replacement_text().unwrap_or(DEFAULT_PARTIAL_REPLACEMENT),
        )),
        MaskingKind::Unrecognized(name) => return Ok(CompiledRule::Passthrough(name.clone())),
    };

    Ok(CompiledRule::Mask {
        kind: rule.kind.clone(),
        strategy,
    })
}

fn required_replacement<'a>(column: &str, rule: &'a MaskingRule) -> Result<&'a str> {
    rule.replacement_text()
        .ok_or_else(|| TablemaskError::InvalidRule {
            column: column.to_string(),
            reason: format!("'{}' rules require a 'replacement'", rule.kind),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn policy(doc: serde_json::Value) -> MaskingPolicy {
        MaskingPolicy::parse(&doc).unwrap()
    }

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_engine_creation() {
        let p = policy(json!({ "fields": { "email": { "maskingType": "partial" } } }));
        assert!(MaskingEngine::new(&p, InvalidRulePolicy::Abort).is_ok());
    }

    #[test]
    fn test_identity_without_rule() {
        let p = policy(json!({ "fields": {} }));
        let engine = MaskingEngine::new(&p, InvalidRulePolicy::Abort).unwrap();
        let rows = vec![vec![CellValue::Int(1), CellValue::from("Alice"), CellValue::Null]];
        let outcome = engine.mask(&rows, &cols(&["id", "name", "note"])).unwrap();

        assert_eq!(outcome.rows[0].get("id"), Some(&CellValue::Int(1)));
        assert_eq!(outcome.rows[0].get("name"), Some(&CellValue::from("Alice")));
        assert_eq!(outcome.rows[0].get("note"), Some(&CellValue::Null));
    }

    #[test]
    fn test_redact_missing_replacement_aborts() {
        let p = policy(json!({ "fields": { "name": { "maskingType": "redact" } } }));
        let err = MaskingEngine::new(&p, InvalidRulePolicy::Abort).err().unwrap();
        assert_eq!(err.column(), Some("name"));
    }

    #[test]
    fn test_last_four_missing_replacement_aborts() {
        let p = policy(json!({ "fields": { "card": { "maskingType": "last_4" } } }));
        assert!(matches!(
            MaskingEngine::new(&p, InvalidRulePolicy::Abort),
            Err(TablemaskError::InvalidRule { .. })
        ));
    }

    #[test]
    fn test_malformed_replacement_aborts_even_for_partial() {
        let p = policy(json!({ "fields": { "note": { "maskingType": "partial", "replacement": ["x"] } } }));
        assert!(MaskingEngine::new(&p, InvalidRulePolicy::Abort).is_err());
    }

    #[test]
    fn test_skip_column_drops_invalid_column() {
        let p = policy(json!({
            "fields": {
                "name": { "maskingType": "redact" },
                "ssn": { "maskingType": "last_4", "replacement": "XXX-XX-" }
            }
        }));
        let engine = MaskingEngine::new(&p, InvalidRulePolicy::SkipColumn).unwrap();
        assert_eq!(engine.skipped_columns(), &["name".to_string()]);

        let columns = cols(&["id", "name", "ssn"]);
        let rows = vec![vec![
            CellValue::Int(7),
            CellValue::from("Alice"),
            CellValue::from("123-45-6789"),
        ]];
        let outcome = engine.mask(&rows, &columns).unwrap();

        assert_eq!(outcome.columns, cols(&["id", "ssn"]));
        assert_eq!(outcome.rows[0].len(), 2);
        assert_eq!(outcome.rows[0].get("name"), None);
        assert_eq!(outcome.rows[0].get("ssn"), Some(&CellValue::from("XXX-XX-6789")));
        assert_eq!(outcome.report.skipped_columns, cols(&["name"]));
    }

    #[test]
    fn test_non_text_values_are_masked_as_text() {
        let p = policy(json!({ "fields": { "account": { "maskingType": "last_4", "replacement": "****" } } }));
        let engine = MaskingEngine::new(&p, InvalidRulePolicy::Abort).unwrap();
        let outcome = engine
            .mask(&[vec![CellValue::Int(9876543210)]], &cols(&["account"]))
            .unwrap();
        assert_eq!(outcome.rows[0].get("account"), Some(&CellValue::from("****3210")));
    }

    #[test]
    fn test_null_handling() {
        let p = policy(json!({
            "fields": {
                "name": { "maskingType": "redact", "replacement": "[REDACTED]" },
                "ssn": { "maskingType": "last_4", "replacement": "XXX-XX-" },
                "email": { "maskingType": "partial" }
            }
        }));
        let engine = MaskingEngine::new(&p, InvalidRulePolicy::Abort).unwrap();
        let outcome = engine
            .mask(
                &[vec![CellValue::Null, CellValue::Null, CellValue::Null]],
                &cols(&["name", "ssn", "email"]),
            )
            .unwrap();

        let row = &outcome.rows[0];
        assert_eq!(row.get("name"), Some(&CellValue::from("[REDACTED]")));
        assert_eq!(row.get("ssn"), Some(&CellValue::Null));
        assert_eq!(row.get("email"), Some(&CellValue::Null));
        assert_eq!(outcome.report.columns["ssn"].nulls_kept, 1);
        assert_eq!(outcome.report.columns["name"].values_masked, 1);
    }

    #[test]
    fn test_schema_mismatch_rejected() {
        let p = policy(json!({ "fields": {} }));
        let engine = MaskingEngine::new(&p, InvalidRulePolicy::Abort).unwrap();
        let err = engine
            .mask(&[vec![CellValue::Int(1)]], &cols(&["id", "name"]))
            .unwrap_err();
        assert!(matches!(err, TablemaskError::SchemaMismatch(_)));
    }

    #[test]
    fn test_report_tracks_unmatched_and_passthrough() {
        let p = policy(json!({
            "fields": {
                "phone": { "maskingType": "tokenize" },
                "salary": { "maskingType": "redact", "replacement": "0" }
            }
        }));
        let engine = MaskingEngine::new(&p, InvalidRulePolicy::Abort).unwrap();
        let outcome = engine
            .mask(&[vec![CellValue::from("555-1234")]], &cols(&["phone"]))
            .unwrap();

        assert_eq!(outcome.rows[0].get("phone"), Some(&CellValue::from("555-1234")));
        assert_eq!(outcome.report.passthrough_columns, cols(&["phone"]));
        assert_eq!(outcome.report.unmatched_rules, cols(&["salary"]));
    }

    #[test]
    fn test_free_function() {
        let p = policy(json!({ "fields": { "ssn": { "maskingType": "last_4", "replacement": "XXX-XX-" } } }));
        let rows = mask(&[vec![CellValue::from("123-45-6789")]], &cols(&["ssn"]), &p).unwrap();
        assert_eq!(rows[0].get("ssn"), Some(&CellValue::from("XXX-XX-6789")));
    }

    #[test]
    fn test_rule_strategy() {
        let email = MaskingRule::new(MaskingKind::Partial, None);
        assert_eq!(rule_strategy("email", &email).unwrap(), "partial_email");

        let unknown = MaskingRule::new(MaskingKind::from_type_name("hash"), None);
        assert_eq!(rule_strategy("name", &unknown).unwrap(), "passthrough");

        let redact = MaskingRule::new(MaskingKind::Redact, None);
        assert!(rule_strategy("name", &redact).is_err());
    }
}
