//! Store abstraction layer
//!
//! This module provides the trait-based seam between the pipeline and the
//! stores it reads from and writes to.

pub mod factory;
pub mod traits;

pub use factory::{create_row_sink, create_row_source};
pub use traits::{RowSink, RowSource};
