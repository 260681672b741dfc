//! Run command implementation
//!
//! This module implements the `run` command: one masked copy of a source
//! table into a target table.

use crate::adapters::database::{create_row_sink, create_row_source, RowSink, RowSource};
use crate::adapters::postgresql::ConnectionParams;
use crate::config::{secret_string, SecretString, TablemaskConfig};
use crate::core::pipeline::{Pipeline, PipelineOptions, RunResult};
use crate::domain::{Result, TablemaskError};
use crate::masking::{load_policy_document, AuditLogger, InvalidRulePolicy};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

fn parse_secret(value: &str) -> std::result::Result<SecretString, String> {
    Ok(secret_string(value.to_string()))
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Source database host
    pub source_host: String,

    /// Source database name
    pub source_db: String,

    /// Source database user
    pub source_user: String,

    /// Source database password
    #[arg(value_parser = parse_secret)]
    pub source_password: SecretString,

    /// Source table (`table` or `schema.table`)
    pub source_table: String,

    /// Target database host
    pub target_host: String,

    /// Target database name
    pub target_db: String,

    /// Target database user
    pub target_user: String,

    /// Target database password
    #[arg(value_parser = parse_secret)]
    pub target_password: SecretString,

    /// Target table (`table` or `schema.table`), must already exist
    pub target_table: String,

    /// Masking policy file (JSON)
    pub policy_file: PathBuf,

    /// Fetch and mask, but do not write to the target
    #[arg(long)]
    pub dry_run: bool,

    /// Drop columns with invalid rules instead of failing the run
    #[arg(long)]
    pub skip_invalid_rules: bool,

    /// Override write.batch_size
    #[arg(long, value_name = "N")]
    pub batch_size: Option<usize>,
}

impl RunArgs {
    /// Execute the run command
    pub async fn execute(&self, mut config: TablemaskConfig) -> anyhow::Result<i32> {
        tracing::info!("Starting run command");

        self.apply_overrides(&mut config);
        let dry_run = config.application.dry_run;

        if let Err(e) = config.validate() {
            return Ok(reject(TablemaskError::Configuration(e), dry_run));
        }

        let (source, sink) = match self.endpoints(&config) {
            Ok(endpoints) => endpoints,
            Err(e) => return Ok(reject(e, dry_run)),
        };

        let policy_document = match load_policy_document(&self.policy_file) {
            Ok(document) => document,
            Err(e) => return Ok(reject(e, dry_run)),
        };

        let options = PipelineOptions {
            dry_run,
            on_invalid_rule: config.masking.on_invalid_rule,
        };
        let mut pipeline = Pipeline::new(source, sink, options);

        if config.masking.audit.enabled {
            match AuditLogger::new(config.masking.audit.log_path.clone(), true) {
                Ok(audit) => pipeline = pipeline.with_audit(audit),
                Err(e) => return Ok(reject(TablemaskError::Io(format!("{e:#}")), dry_run)),
            }
        }

        if dry_run {
            println!("🔍 DRY RUN MODE - No data will be written to the target");
            println!();
        }

        let result = pipeline.run(&policy_document).await;
        print_result(&result);
        Ok(result.exit_code())
    }

    fn apply_overrides(&self, config: &mut TablemaskConfig) {
        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }

        if self.skip_invalid_rules {
            tracing::info!("Skipping columns with invalid rules (from CLI)");
            config.masking.on_invalid_rule = InvalidRulePolicy::SkipColumn;
        }

        if let Some(batch_size) = self.batch_size {
            tracing::info!(batch_size, "Overriding batch size from CLI");
            config.write.batch_size = batch_size;
        }
    }

    fn endpoints(
        &self,
        config: &TablemaskConfig,
    ) -> Result<(Arc<dyn RowSource>, Arc<dyn RowSink>)> {
        let source_params = ConnectionParams {
            host: self.source_host.clone(),
            database: self.source_db.clone(),
            user: self.source_user.clone(),
            password: self.source_password.clone(),
            settings: config.source.clone(),
        };
        let target_params = ConnectionParams {
            host: self.target_host.clone(),
            database: self.target_db.clone(),
            user: self.target_user.clone(),
            password: self.target_password.clone(),
            settings: config.target.clone(),
        };

        let source = create_row_source(source_params, &self.source_table)?;
        let sink = create_row_sink(target_params, &self.target_table, config.write.clone())?;
        Ok((source, sink))
    }
}

/// Reports a run that never reached the pipeline
///
/// Prints the failed status line and returns the exit code.
pub fn reject(error: TablemaskError, dry_run: bool) -> i32 {
    tracing::error!(code = error.kind().code(), error = %error, "Run rejected");
    let result = RunResult::rejected(&error, dry_run);
    print_result(&result);
    result.exit_code()
}

fn print_result(result: &RunResult) {
    if let Some(report) = &result.report {
        println!("📊 Masking Report:");
        println!("  Rows masked: {}", report.rows_masked);
        for (column, stats) in &report.columns {
            println!(
                "  {column}: {} ({}), {} masked, {} nulls kept",
                stats.rule, stats.strategy, stats.values_masked, stats.nulls_kept
            );
        }
        if !report.passthrough_columns.is_empty() {
            println!("  Copied unchanged (unknown masking type): {}", report.passthrough_columns.join(", "));
        }
        if !report.skipped_columns.is_empty() {
            println!("  Skipped (invalid rule): {}", report.skipped_columns.join(", "));
        }
        if !report.unmatched_rules.is_empty() {
            println!("  Rules matching no column: {}", report.unmatched_rules.join(", "));
        }
        println!();
    }

    if result.failures.len() > 1 {
        println!("⚠️  Failures:");
        for failure in &result.failures {
            println!("  - [{}] {}", failure.kind, failure.message);
        }
        println!();
    }

    println!("Run {} finished in {:.2}s", result.run_id, result.duration.as_secs_f64());
    println!("{}", result.status_line());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use secrecy::ExposeSecret;

    fn run_args(extra: &[&str]) -> RunArgs {
        let args = [
            "tablemask",
            "run",
            "src-host",
            "src_db",
            "reader",
            "src-pass",
            "public.users",
            "dst-host",
            "dst_db",
            "writer",
            "dst-pass",
            "users_masked",
            "policy.json",
        ]
        .into_iter()
        .chain(extra.iter().copied());

        match Cli::parse_from(args).command {
            Commands::Run(args) => args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_passwords_are_redacted() {
        let args = run_args(&[]);
        assert_eq!(args.source_password.expose_secret().as_ref(), "src-pass");
        let debug = format!("{args:?}");
        assert!(!debug.contains("src-pass"));
        assert!(!debug.contains("dst-pass"));
    }

    #[test]
    fn test_cli_overrides() {
        let args = run_args(&["--dry-run", "--skip-invalid-rules", "--batch-size", "50"]);
        let mut config = TablemaskConfig::default();
        args.apply_overrides(&mut config);

        assert!(config.application.dry_run);
        assert_eq!(config.masking.on_invalid_rule, InvalidRulePolicy::SkipColumn);
        assert_eq!(config.write.batch_size, 50);
    }

    #[test]
    fn test_endpoints_reject_bad_table() {
        let mut args = run_args(&[]);
        args.target_table = "public.".to_string();
        let result = args.endpoints(&TablemaskConfig::default());
        assert!(matches!(result, Err(TablemaskError::Configuration(_))));
    }

    #[test]
    fn test_reject_exit_codes() {
        assert_eq!(reject(TablemaskError::Configuration("bad".to_string()), false), 2);
        assert_eq!(reject(TablemaskError::Io("disk full".to_string()), true), 5);
    }

    #[tokio::test]
    async fn test_invalid_batch_size_exits_with_config_code() {
        let args = run_args(&["--batch-size", "0"]);
        let code = args.execute(TablemaskConfig::default()).await.unwrap();
        assert_eq!(code, 2);
    }

    #[tokio::test]
    async fn test_missing_policy_file_exits_with_policy_code() {
        let mut args = run_args(&[]);
        args.policy_file = PathBuf::from("/nonexistent/policy.json");
        let code = args.execute(TablemaskConfig::default()).await.unwrap();
        assert_eq!(code, 2);
    }
}
