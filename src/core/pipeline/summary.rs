//! Run result and reporting
//!
//! A [`RunResult`] is the only output of a pipeline run. Failures are recorded
//! on it instead of being returned as errors.

use super::state::PipelineState;
use crate::domain::{FailureKind, TablemaskError};
use crate::masking::MaskingReport;
use std::time::Duration;
use uuid::Uuid;

/// A failure recorded during a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFailure {
    pub kind: FailureKind,

    /// Human-readable cause
    pub message: String,

    /// Column the failure is attributable to, if any
    pub column: Option<String>,
}

impl From<&TablemaskError> for RunFailure {
    fn from(error: &TablemaskError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
            column: error.column().map(str::to_string),
        }
    }
}

/// Outcome of one pipeline run
#[derive(Debug, Clone)]
pub struct RunResult {
    /// Unique id of this run, also recorded on every log line of the run
    pub run_id: String,

    /// Final state, either `DONE` or `FAILED`
    pub state: PipelineState,

    /// Every state visited, in order
    pub history: Vec<PipelineState>,

    /// Whether the write was skipped
    pub dry_run: bool,

    /// Rows read from the source
    pub rows_read: u64,

    /// Rows that went through the masking engine
    pub rows_masked: u64,

    /// Rows committed to the target
    pub rows_written: u64,

    /// Failures in the order they occurred
    pub failures: Vec<RunFailure>,

    /// Per-column masking statistics, once masking has run
    pub report: Option<MaskingReport>,

    /// SHA-256 fingerprint of the policy document, once it has parsed
    pub policy_fingerprint: Option<String>,

    /// Wall time of the run
    pub duration: Duration,
}

impl RunResult {
    /// Create an empty result in `INIT`
    pub fn new(run_id: impl Into<String>, dry_run: bool) -> Self {
        Self {
            run_id: run_id.into(),
            state: PipelineState::Init,
            history: vec![PipelineState::Init],
            dry_run,
            rows_read: 0,
            rows_masked: 0,
            rows_written: 0,
            failures: Vec::new(),
            report: None,
            policy_fingerprint: None,
            duration: Duration::ZERO,
        }
    }

    /// A run rejected before the pipeline started, e.g. for an unreadable
    /// policy file or invalid configuration
    pub fn rejected(error: &TablemaskError, dry_run: bool) -> Self {
        let mut result = Self::new(Uuid::new_v4().to_string(), dry_run);
        result.state = PipelineState::Failed;
        result.history.push(PipelineState::Failed);
        result.failures.push(RunFailure::from(error));
        result
    }

    /// Check if the run finished without failures
    pub fn is_successful(&self) -> bool {
        self.state == PipelineState::Done && self.failures.is_empty()
    }

    /// First recorded failure
    pub fn failure(&self) -> Option<&RunFailure> {
        self.failures.first()
    }

    /// Process exit code
    ///
    /// - `0` done
    /// - `1` failed after some rows were committed
    /// - `2` policy, rule or configuration error
    /// - `4` connection error
    /// - `5` any other failure
    pub fn exit_code(&self) -> i32 {
        if self.is_successful() {
            return 0;
        }
        if self.rows_written > 0 {
            return 1;
        }
        self.failure().map(|f| f.kind.exit_code()).unwrap_or(5)
    }

    /// One-line status, e.g. `DONE: 3 read, 3 masked, 3 written`
    pub fn status_line(&self) -> String {
        let mut line = format!(
            "{}: {} read, {} masked, {} written",
            self.state, self.rows_read, self.rows_masked, self.rows_written
        );
        if self.dry_run {
            line.push_str(" (dry run)");
        }
        if let Some(failure) = self.failure() {
            line.push_str(&format!(" [{}] {}", failure.kind, failure.message));
        }
        line
    }

    /// Log the result
    pub fn log_summary(&self) {
        if self.is_successful() {
            tracing::info!(
                run_id = %self.run_id,
                state = %self.state,
                rows_read = self.rows_read,
                rows_masked = self.rows_masked,
                rows_written = self.rows_written,
                dry_run = self.dry_run,
                duration_ms = self.duration.as_millis() as u64,
                "Run completed"
            );
            return;
        }

        tracing::error!(
            run_id = %self.run_id,
            state = %self.state,
            rows_read = self.rows_read,
            rows_written = self.rows_written,
            failure_count = self.failures.len(),
            duration_ms = self.duration.as_millis() as u64,
            "Run failed"
        );
        for failure in &self.failures {
            tracing::error!(
                code = failure.kind.code(),
                column = failure.column.as_deref().unwrap_or(""),
                message = %failure.message,
                "Run failure"
            );
        }
    }
}
