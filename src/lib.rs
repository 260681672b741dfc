// Tablemask - masked PostgreSQL table copies
// Copyright (c) 2025 Tablemask Contributors
// Licensed under the MIT License

//! # Tablemask - masked PostgreSQL table copies
//!
//! Tablemask copies a table from a source PostgreSQL database to an existing
//! table in a target database, rewriting sensitive columns on the way
//! according to a declarative JSON masking policy.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Parsing** masking policies (`redact`, `partial`, `last_4`)
//! - **Masking** rows column by column with deterministic strategies
//! - **Orchestrating** a run through an explicit state machine
//! - **Reading** and **writing** PostgreSQL tables in batched transactions
//! - **Auditing** every run to a JSON-lines file without row values
//!
//! ## Architecture
//!
//! Tablemask follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Pipeline orchestration and run results
//! - [`masking`] - Policy model, strategies, engine, report and audit log
//! - [`adapters`] - Row source and sink traits and their PostgreSQL implementation
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust
//! use tablemask::domain::CellValue;
//! use tablemask::masking::{mask, MaskingPolicy};
//! use serde_json::json;
//!
//! let policy = MaskingPolicy::parse(&json!({
//!     "fields": {
//!         "email": { "maskingType": "partial" },
//!         "ssn": { "maskingType": "last_4", "replacement": "XXX-XX-" }
//!     }
//! }))?;
//!
//! let columns = vec!["email".to_string(), "ssn".to_string()];
//! let rows = vec![vec![
//!     CellValue::from("john.doe@example.com"),
//!     CellValue::from("123-45-6789"),
//! ]];
//!
//! let masked = mask(&rows, &columns, &policy)?;
//! assert_eq!(masked[0].get("email"), Some(&CellValue::from("john.doe****@example.com")));
//! assert_eq!(masked[0].get("ssn"), Some(&CellValue::from("XXX-XX-6789")));
//! # Ok::<(), tablemask::domain::TablemaskError>(())
//! ```
//!
//! ## Error Handling
//!
//! Tablemask uses [`domain::TablemaskError`] for all library errors. A pipeline
//! run never returns an error: failures are recorded on the
//! [`core::pipeline::RunResult`], which also maps them to a process exit code.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
pub mod masking;
