//! Logging and observability
//!
//! Structured logging through `tracing`:
//! - human-readable console output on stderr
//! - optional JSON lines in a rolling local file (daily or hourly)
//! - level from `--log-level`, `TABLEMASK_LOG_LEVEL` or `application.log_level`,
//!   overridden by `RUST_LOG`
//!
//! Every log event emitted during a pipeline run is recorded inside a `run`
//! span carrying the run id and both table descriptions.
//!
//! # Example
//!
//! ```no_run
//! use tablemask::logging::init_logging;
//! use tablemask::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!(table = "public.users", "Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard, LOG_FILE_PREFIX};
