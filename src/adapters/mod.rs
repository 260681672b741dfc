//! External system integrations for Tablemask.
//!
//! - [`database`] - `RowSource` / `RowSink` traits and their factory
//! - [`postgresql`] - PostgreSQL implementation
//!
//! # Design Pattern
//!
//! Adapters isolate the database driver from the pipeline, which only sees
//! the traits. Tests drive the pipeline with in-memory implementations.
//!
//! ```rust,no_run
//! use tablemask::adapters::database::{create_row_source, RowSource};
//! use tablemask::adapters::postgresql::ConnectionParams;
//! use tablemask::config::{secret_string, ConnectionSettings};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let params = ConnectionParams {
//!     host: "localhost".to_string(),
//!     database: "app".to_string(),
//!     user: "reader".to_string(),
//!     password: secret_string("secret".to_string()),
//!     settings: ConnectionSettings::default(),
//! };
//!
//! let source = create_row_source(params, "public.users")?;
//! let rows = source.fetch().await?;
//! println!("{} rows", rows.len());
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod postgresql;
