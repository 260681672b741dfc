//! Domain models and types for Tablemask.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Cell values and rows** ([`CellValue`], [`RowSet`], [`MaskedRow`])
//! - **Table identifiers** ([`TableRef`]) that are always quoted in SQL
//! - **Error types** ([`TablemaskError`], [`FailureKind`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, TablemaskError>`]:
//!
//! ```rust
//! use tablemask::domain::{CellValue, Result, RowSet};
//!
//! fn example() -> Result<RowSet> {
//!     // A row with the wrong number of values is rejected on ingress
//!     RowSet::new(
//!         vec!["id".to_string(), "email".to_string()],
//!         vec![vec![CellValue::Int(1), CellValue::from("a@example.com")]],
//!     )
//! }
//! # example().unwrap();
//! ```

pub mod context;
pub mod errors;
pub mod result;
pub mod row;
pub mod table;
pub mod value;

// Re-export commonly used types for convenience
pub use context::ResultExt;
pub use errors::{FailureKind, TablemaskError};
pub use result::Result;
pub use row::{validate_shape, MaskedRow, Row, RowSet};
pub use table::{quote_ident, TableRef};
pub use value::CellValue;
