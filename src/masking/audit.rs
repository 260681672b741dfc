//! Audit logger for masking runs
//!
//! One JSON line is appended per run. Entries hold counts, column names and
//! the policy fingerprint. Row values, masked or not, are never written.

use crate::masking::report::MaskingReport;
use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// What a finished run contributes to the audit trail
#[derive(Debug, Clone, Serialize)]
pub struct AuditRecord<'a> {
    pub run_id: &'a str,
    pub source_table: &'a str,
    pub target_table: &'a str,
    pub state: &'a str,
    pub dry_run: bool,
    pub rows_read: u64,
    pub rows_written: u64,
    pub policy_fingerprint: Option<&'a str>,
    /// Failure codes, in the order they occurred
    pub failures: Vec<&'a str>,
    pub report: Option<&'a MaskingReport>,
}

#[derive(Debug, Serialize)]
struct AuditLogEntry<'a> {
    timestamp: String,
    #[serde(flatten)]
    record: &'a AuditRecord<'a>,
}

/// Audit logger for masking runs
#[derive(Debug, Clone)]
pub struct AuditLogger {
    log_path: PathBuf,
    enabled: bool,
}

impl AuditLogger {
    /// Create a new audit logger, creating the log directory when enabled
    pub fn new(log_path: PathBuf, enabled: bool) -> Result<Self> {
        if enabled {
            if let Some(parent) = log_path.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create audit log directory: {}", parent.display())
                })?;
            }
        }

        Ok(Self { log_path, enabled })
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Append one run to the audit log
    pub fn log_run(&self, record: &AuditRecord<'_>) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let entry = AuditLogEntry {
            timestamp: Utc::now().to_rfc3339(),
            record,
        };

        let json_line = serde_json::to_string(&entry).context("Failed to serialize audit entry")?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .with_context(|| format!("Failed to open audit log: {}", self.log_path.display()))?;
        writeln!(file, "{json_line}").context("Failed to write audit entry")?;

        Ok(())
    }
}
