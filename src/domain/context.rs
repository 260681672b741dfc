//! Error context extension trait
//!
//! [`ResultExt`] adds `.context()` and `.with_context()` to
//! `Result<T, TablemaskError>`. Unlike `anyhow::Context`, the variant of the
//! error is kept, so the failure kind (and with it the exit code) of a run
//! does not change when context is added.
//!
//! # Examples
//!
//! ```rust
//! use tablemask::domain::{FailureKind, Result, TablemaskError};
//! use tablemask::domain::context::ResultExt;
//!
//! fn connect(host: &str) -> Result<()> {
//!     Err(TablemaskError::SourceConnection("timed out".to_string()))
//!         .with_context(|| format!("host {host}"))
//! }
//!
//! let err = connect("db1").unwrap_err();
//! assert_eq!(err.kind(), FailureKind::SourceConnection);
//! assert!(err.to_string().contains("host db1: timed out"));
//! ```

use crate::domain::errors::TablemaskError;
use crate::domain::result::Result;
use std::fmt::Display;

/// Extension trait for adding context to `Result` types
pub trait ResultExt<T> {
    /// Prefix the error message with `context`
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display;

    /// Like [`ResultExt::context`], but only builds the context on error
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display,
        F: FnOnce() -> C;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<TablemaskError>,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display,
    {
        self.map_err(|e| prefix(e.into(), &context))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display,
        F: FnOnce() -> C,
    {
        self.map_err(|e| prefix(e.into(), &f()))
    }
}

fn prefix(error: TablemaskError, context: &dyn Display) -> TablemaskError {
    let wrap = |message: String| format!("{context}: {message}");
    match error {
        TablemaskError::InvalidPolicy(m) => TablemaskError::InvalidPolicy(wrap(m)),
        TablemaskError::InvalidRule { column, reason } => TablemaskError::InvalidRule {
            column,
            reason: wrap(reason),
        },
        TablemaskError::SourceConnection(m) => TablemaskError::SourceConnection(wrap(m)),
        TablemaskError::SourceQuery(m) => TablemaskError::SourceQuery(wrap(m)),
        TablemaskError::TargetConnection(m) => TablemaskError::TargetConnection(wrap(m)),
        TablemaskError::TargetWrite {
            message,
            rows_written,
        } => TablemaskError::TargetWrite {
            message: wrap(message),
            rows_written,
        },
        TablemaskError::SchemaMismatch(m) => TablemaskError::SchemaMismatch(wrap(m)),
        TablemaskError::Configuration(m) => TablemaskError::Configuration(wrap(m)),
        TablemaskError::Serialization(m) => TablemaskError::Serialization(wrap(m)),
        TablemaskError::Io(m) => TablemaskError::Io(wrap(m)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FailureKind;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_context_keeps_variant() {
        let result: Result<()> = Err(TablemaskError::Configuration("bad port".to_string()));
        let err = result.context("[source]").unwrap_err();

        assert_eq!(err.kind(), FailureKind::Configuration);
        assert_eq!(err.to_string(), "Configuration error: [source]: bad port");
    }

    #[test]
    fn test_with_context_lazy_evaluation() {
        let called = Arc::new(AtomicBool::new(false));
        let called_clone = called.clone();

        let result: Result<i32> = Ok(42);
        let with_context = result.with_context(|| {
            called_clone.store(true, Ordering::SeqCst);
            "expensive"
        });

        assert_eq!(with_context.unwrap(), 42);
        assert!(!called.load(Ordering::SeqCst));
    }

    #[test]
    fn test_target_write_keeps_row_count() {
        let result: Result<()> = Err(TablemaskError::TargetWrite {
            message: "duplicate key".to_string(),
            rows_written: 500,
        });
        match result.context("table public.users").unwrap_err() {
            TablemaskError::TargetWrite {
                message,
                rows_written,
            } => {
                assert_eq!(rows_written, 500);
                assert_eq!(message, "table public.users: duplicate key");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_context_chaining() {
        let result: Result<()> = Err(TablemaskError::SourceQuery("relation missing".to_string()));
        let err = result
            .context("prepare")
            .context("table users")
            .unwrap_err();
        assert!(err.to_string().contains("table users: prepare: relation missing"));
    }

    #[test]
    fn test_io_error_with_context() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let result: std::result::Result<(), std::io::Error> = Err(io_error);
        let err = result.context("tablemask.toml").unwrap_err();

        assert_eq!(err.kind(), FailureKind::Io);
        assert!(err.to_string().contains("tablemask.toml: File not found"));
    }
}
