//! Configuration management for Tablemask.
//!
//! Connection endpoints and credentials are command-line arguments. Everything
//! that tunes how a run behaves lives in an optional TOML file.
//!
//! # Overview
//!
//! Tablemask configuration supports:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `TABLEMASK_<SECTION>_<KEY>` overrides
//! - Default values for every setting
//! - Validation on load
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level and dry run
//! - [`ConnectionSettings`] - Port, TLS and timeouts for `[source]` and `[target]`
//! - [`WriteConfig`] - Batch size and transaction mode
//! - [`MaskingConfig`](crate::masking::MaskingConfig) - Invalid-rule handling and audit log
//! - [`LoggingConfig`] - Rolling file logs
//!
//! # Example Configuration
//!
//! ```toml
//! [application]
//! log_level = "info"
//!
//! [source]
//! port = 5432
//! ssl_mode = "require"
//! statement_timeout_seconds = 120
//!
//! [target]
//! ssl_mode = "verify-full"
//!
//! [write]
//! batch_size = 1000
//! transactional = true
//!
//! [masking]
//! on_invalid_rule = "abort"
//!
//! [masking.audit]
//! enabled = true
//! log_path = "${TABLEMASK_AUDIT_DIR}/tablemask.log"
//! ```
//!
//! # Loading
//!
//! ```rust,no_run
//! use tablemask::config::load_config_or_default;
//!
//! // Falls back to ./tablemask.toml, then to defaults
//! let config = load_config_or_default(None)?;
//! println!("Batch size: {}", config.write.batch_size);
//! # Ok::<(), tablemask::domain::TablemaskError>(())
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, load_config_or_default};
pub use schema::{
    ApplicationConfig, ConnectionSettings, LoggingConfig, SslMode, TablemaskConfig, WriteConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
