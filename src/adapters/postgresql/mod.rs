//! PostgreSQL row source and row sink
//!
//! Both sides build their own connection pool per operation and release it
//! when the fetch or write returns.

pub mod client;
pub mod models;
pub mod sink;
pub mod source;

pub use client::{ConnectionParams, PostgreSQLClient, StoreRole};
pub use sink::PostgresRowSink;
pub use source::PostgresRowSource;
