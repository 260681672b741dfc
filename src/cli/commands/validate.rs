//! Validate policy command implementation
//!
//! This module implements the `validate-policy` command: parse a policy
//! file, compile every rule and print the result without touching any
//! database.

use crate::masking::{load_policy, rule_strategy, MaskingPolicy};
use clap::Args;
use std::path::PathBuf;

/// Arguments for the validate-policy command
#[derive(Args, Debug)]
pub struct ValidatePolicyArgs {
    /// Masking policy file (JSON)
    pub policy_file: PathBuf,
}

impl ValidatePolicyArgs {
    /// Execute the validate-policy command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(policy_file = %self.policy_file.display(), "Validating policy");

        println!("🔍 Validating policy file: {}", self.policy_file.display());
        println!();

        let policy = match load_policy(&self.policy_file) {
            Ok(policy) => {
                println!("✅ Policy document parsed successfully");
                policy
            }
            Err(e) => {
                println!("❌ Failed to parse policy document");
                println!("   Error: {e}");
                return Ok(e.kind().exit_code());
            }
        };

        let invalid = print_rules(&policy);
        println!();

        if invalid == 0 {
            println!("✅ Policy is valid ({} rules)", policy.len());
            println!("   Fingerprint: {}", policy.fingerprint());
            Ok(0)
        } else {
            println!("❌ {invalid} of {} rules are invalid", policy.len());
            println!("   Runs abort on invalid rules unless --skip-invalid-rules is given");
            Ok(2)
        }
    }
}

/// Prints one line per rule and returns how many are invalid
fn print_rules(policy: &MaskingPolicy) -> usize {
    let mut invalid = 0;

    println!("Rules:");
    for (column, rule) in policy.rules() {
        let replacement = rule
            .replacement_text()
            .map(|r| format!("\"{r}\""))
            .unwrap_or_else(|| "-".to_string());

        match rule_strategy(column, rule) {
            Ok(strategy) => println!(
                "  {column}: {} -> {strategy} (replacement: {replacement})",
                rule.kind
            ),
            Err(e) => {
                invalid += 1;
                println!("  {column}: {} -> INVALID ({e})", rule.kind);
            }
        }
    }

    invalid
}
