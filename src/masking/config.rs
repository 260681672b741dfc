//! Masking configuration

use crate::domain::{Result, TablemaskError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// What to do when a rule is malformed for its masking type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InvalidRulePolicy {
    /// Fail the whole run
    #[default]
    Abort,
    /// Drop the column from every masked row and from the write
    SkipColumn,
}

impl std::str::FromStr for InvalidRulePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "abort" => Ok(InvalidRulePolicy::Abort),
            "skip_column" | "skip-column" => Ok(InvalidRulePolicy::SkipColumn),
            _ => Err(format!(
                "Invalid on_invalid_rule '{s}'. Must be one of: abort, skip_column"
            )),
        }
    }
}

/// Masking engine configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MaskingConfig {
    /// Handling of malformed rules
    #[serde(default)]
    pub on_invalid_rule: InvalidRulePolicy,

    /// Audit logging configuration
    #[serde(default)]
    pub audit: AuditConfig,
}

impl MaskingConfig {
    /// Validate the configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        self.audit.validate()
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("TABLEMASK_MASKING_ON_INVALID_RULE") {
            self.on_invalid_rule = val.parse().map_err(TablemaskError::Configuration)?;
        }

        self.audit.apply_env_overrides()
    }
}

/// Audit logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Enable audit logging
    #[serde(default)]
    pub enabled: bool,

    /// Audit log file path (JSON lines)
    #[serde(default = "default_audit_log_path")]
    pub log_path: PathBuf,
}

fn default_audit_log_path() -> PathBuf {
    PathBuf::from("./audit/tablemask.log")
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_path: default_audit_log_path(),
        }
    }
}

impl AuditConfig {
    /// Validate audit configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.enabled && self.log_path.as_os_str().is_empty() {
            return Err("masking.audit.log_path cannot be empty when audit is enabled".to_string());
        }
        Ok(())
    }

    /// Apply environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("TABLEMASK_MASKING_AUDIT_ENABLED") {
            self.enabled = val.parse().map_err(|_| {
                TablemaskError::Configuration(format!(
                    "Invalid TABLEMASK_MASKING_AUDIT_ENABLED value: {val}"
                ))
            })?;
        }

        if let Ok(val) = std::env::var("TABLEMASK_MASKING_AUDIT_LOG_PATH") {
            self.log_path = PathBuf::from(val);
        }

        Ok(())
    }
}
