//! Domain error types
//!
//! This module defines the error hierarchy for Tablemask.
//! Errors are domain-specific and never expose driver or pool types; failures
//! from third-party crates are converted to strings with enough context to
//! diagnose them (table, host, column).

use thiserror::Error;

/// Main Tablemask error type
///
/// This is the primary error type used throughout the library. The pipeline
/// converts every variant into a [`FailureKind`] on the run result, so no
/// error ever escapes an orchestration run.
#[derive(Debug, Error)]
pub enum TablemaskError {
    /// The policy document is missing required structure
    #[error("Invalid policy: {0}")]
    InvalidPolicy(String),

    /// A single rule is malformed for its masking type
    #[error("Invalid rule for column '{column}': {reason}")]
    InvalidRule { column: String, reason: String },

    /// Could not connect to the source store
    #[error("Source connection error: {0}")]
    SourceConnection(String),

    /// The source query failed
    #[error("Source query error: {0}")]
    SourceQuery(String),

    /// Could not connect to the target store
    #[error("Target connection error: {0}")]
    TargetConnection(String),

    /// Writing to the target failed
    ///
    /// `rows_written` counts rows that were committed before the failure.
    /// It is always zero for transactional writes.
    #[error("Target write error: {message} ({rows_written} rows committed before failure)")]
    TargetWrite { message: String, rows_written: u64 },

    /// A row does not line up with the column list
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),
}

/// Coarse classification of a failure, recorded on the run result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    InvalidPolicy,
    InvalidRule,
    SourceConnection,
    SourceQuery,
    TargetConnection,
    TargetWrite,
    SchemaMismatch,
    Configuration,
    Io,
    Serialization,
}

impl FailureKind {
    /// Stable upper-case code used in logs and the audit trail
    pub fn code(&self) -> &'static str {
        match self {
            FailureKind::InvalidPolicy => "INVALID_POLICY",
            FailureKind::InvalidRule => "INVALID_RULE",
            FailureKind::SourceConnection => "SOURCE_CONNECTION_ERROR",
            FailureKind::SourceQuery => "SOURCE_QUERY_ERROR",
            FailureKind::TargetConnection => "TARGET_CONNECTION_ERROR",
            FailureKind::TargetWrite => "TARGET_WRITE_ERROR",
            FailureKind::SchemaMismatch => "SCHEMA_MISMATCH",
            FailureKind::Configuration => "CONFIGURATION_ERROR",
            FailureKind::Io => "IO_ERROR",
            FailureKind::Serialization => "SERIALIZATION_ERROR",
        }
    }

    /// Process exit code for a run that failed with this kind
    pub fn exit_code(&self) -> i32 {
        match self {
            FailureKind::InvalidPolicy | FailureKind::InvalidRule | FailureKind::Configuration => 2,
            FailureKind::SourceConnection | FailureKind::TargetConnection => 4,
            _ => 5,
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl TablemaskError {
    /// Classifies this error
    pub fn kind(&self) -> FailureKind {
        match self {
            TablemaskError::InvalidPolicy(_) => FailureKind::InvalidPolicy,
            TablemaskError::InvalidRule { .. } => FailureKind::InvalidRule,
            TablemaskError::SourceConnection(_) => FailureKind::SourceConnection,
            TablemaskError::SourceQuery(_) => FailureKind::SourceQuery,
            TablemaskError::TargetConnection(_) => FailureKind::TargetConnection,
            TablemaskError::TargetWrite { .. } => FailureKind::TargetWrite,
            TablemaskError::SchemaMismatch(_) => FailureKind::SchemaMismatch,
            TablemaskError::Configuration(_) => FailureKind::Configuration,
            TablemaskError::Serialization(_) => FailureKind::Serialization,
            TablemaskError::Io(_) => FailureKind::Io,
        }
    }

    /// Column the error is attributable to, if any
    pub fn column(&self) -> Option<&str> {
        match self {
            TablemaskError::InvalidRule { column, .. } => Some(column),
            _ => None,
        }
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for TablemaskError {
    fn from(err: std::io::Error) -> Self {
        TablemaskError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for TablemaskError {
    fn from(err: serde_json::Error) -> Self {
        TablemaskError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for TablemaskError {
    fn from(err: toml::de::Error) -> Self {
        TablemaskError::Configuration(format!("TOML parse error: {err}"))
    }
}
