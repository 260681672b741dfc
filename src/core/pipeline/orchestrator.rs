//! Pipeline orchestrator - runs one masked copy from a row source to a row sink
//!
//! The run is strictly sequential: the policy is compiled before any store is
//! touched, the fetch completes before masking starts, and masking completes
//! before the write starts.

use super::state::{PipelineState, StateTracker};
use super::summary::{RunFailure, RunResult};
use crate::adapters::database::{RowSink, RowSource};
use crate::domain::{Result, ResultExt, TablemaskError};
use crate::masking::{AuditLogger, AuditRecord, InvalidRulePolicy, MaskingEngine, MaskingPolicy};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

/// Run options
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    /// Fetch and mask, but skip the write
    pub dry_run: bool,

    /// Handling of malformed rules
    pub on_invalid_rule: InvalidRulePolicy,
}

/// Masked table copy
pub struct Pipeline {
    source: Arc<dyn RowSource>,
    sink: Arc<dyn RowSink>,
    options: PipelineOptions,
    audit: Option<AuditLogger>,
}

impl Pipeline {
    pub fn new(source: Arc<dyn RowSource>, sink: Arc<dyn RowSink>, options: PipelineOptions) -> Self {
        Self {
            source,
            sink,
            options,
            audit: None,
        }
    }

    /// Record every run in an audit log
    pub fn with_audit(mut self, audit: AuditLogger) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Execute one run
    ///
    /// Never fails: every error is recorded on the returned [`RunResult`] and
    /// moves the run to `FAILED`. All log events of the run carry its id.
    pub async fn run(&self, policy_document: &Value) -> RunResult {
        let run_id = Uuid::new_v4().to_string();
        let span = tracing::info_span!(
            "run",
            run_id = %run_id,
            source = %self.source.describe(),
            target = %self.sink.describe(),
        );

        let result = self
            .execute(run_id, policy_document)
            .instrument(span.clone())
            .await;

        span.in_scope(|| {
            result.log_summary();
            self.write_audit(&result);
        });

        result
    }

    async fn execute(&self, run_id: String, policy_document: &Value) -> RunResult {
        let start = Instant::now();
        let mut result = RunResult::new(run_id, self.options.dry_run);
        let mut tracker = StateTracker::new();

        tracing::info!(dry_run = self.options.dry_run, "Starting run");

        if let Err(e) = self.stages(policy_document, &mut tracker, &mut result).await {
            tracing::error!(
                state = %tracker.current(),
                code = e.kind().code(),
                column = e.column().unwrap_or(""),
                error = %e,
                "Stage failed"
            );
            if let TablemaskError::TargetWrite { rows_written, .. } = &e {
                result.rows_written = *rows_written;
            }
            result.failures.push(RunFailure::from(&e));
            tracker.transition(PipelineState::Failed);
        }

        result.state = tracker.current();
        result.history = tracker.history().to_vec();
        result.duration = start.elapsed();
        result
    }

    async fn stages(
        &self,
        policy_document: &Value,
        tracker: &mut StateTracker,
        result: &mut RunResult,
    ) -> Result<()> {
        // INIT -> POLICY_LOADED
        let policy = MaskingPolicy::parse(policy_document)?;
        result.policy_fingerprint = Some(policy.fingerprint().to_string());
        let engine = MaskingEngine::new(&policy, self.options.on_invalid_rule)?;
        tracing::info!(
            rules = policy.len(),
            fingerprint = %policy.fingerprint(),
            skipped_columns = engine.skipped_columns().len(),
            "Policy compiled"
        );
        tracker.transition(PipelineState::PolicyLoaded);

        // POLICY_LOADED -> ROWS_FETCHED
        let row_set = self
            .source
            .fetch()
            .await
            .with_context(|| format!("reading {}", self.source.describe()))?;
        result.rows_read = row_set.len() as u64;
        tracker.transition(PipelineState::RowsFetched);

        if row_set.is_empty() {
            tracing::info!("Source returned no rows, nothing to mask");
            tracker.transition(PipelineState::Done);
            return Ok(());
        }

        // ROWS_FETCHED -> MASKED
        let outcome = engine.mask_row_set(&row_set);
        drop(row_set);
        outcome.report.log_summary();
        result.rows_masked = outcome.rows.len() as u64;
        result.report = Some(outcome.report);
        tracker.transition(PipelineState::Masked);

        if self.options.dry_run {
            tracing::info!(rows = outcome.rows.len(), "Dry run, skipping write");
            tracker.transition(PipelineState::Done);
            return Ok(());
        }

        if outcome.columns.is_empty() {
            return Err(TablemaskError::SchemaMismatch(
                "no columns left to write after skipping invalid rules".to_string(),
            ));
        }

        // MASKED -> WRITTEN -> DONE
        let written = self
            .sink
            .write(&outcome.rows, &outcome.columns)
            .await
            .with_context(|| format!("writing {}", self.sink.describe()))?;
        result.rows_written = written;
        tracker.transition(PipelineState::Written);
        tracker.transition(PipelineState::Done);

        Ok(())
    }

    fn write_audit(&self, result: &RunResult) {
        let Some(audit) = &self.audit else {
            return;
        };

        let source = self.source.describe();
        let target = self.sink.describe();
        let record = AuditRecord {
            run_id: &result.run_id,
            source_table: &source,
            target_table: &target,
            state: result.state.as_str(),
            dry_run: result.dry_run,
            rows_read: result.rows_read,
            rows_written: result.rows_written,
            policy_fingerprint: result.policy_fingerprint.as_deref(),
            failures: result.failures.iter().map(|f| f.kind.code()).collect(),
            report: result.report.as_ref(),
        };

        // The run outcome stands even if the audit trail cannot be written
        if let Err(e) = audit.log_run(&record) {
            tracing::warn!(
                error = %e,
                path = %audit.log_path().display(),
                "Failed to write audit entry"
            );
        }
    }
}
