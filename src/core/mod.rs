//! Core business logic for Tablemask.
//!
//! # Modules
//!
//! - [`pipeline`] - Orchestration of a masked table copy
//!
//! # Run Workflow
//!
//! 1. **Compile policy**: parse the policy document and build the masking engine
//! 2. **Fetch**: read every row of the source table
//! 3. **Mask**: apply the engine to every row
//! 4. **Write**: insert the masked rows into the target table
//! 5. **Report**: log the run result and append it to the audit trail
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tablemask::adapters::database::{create_row_sink, create_row_source};
//! use tablemask::adapters::postgresql::ConnectionParams;
//! use tablemask::config::{secret_string, ConnectionSettings, WriteConfig};
//! use tablemask::core::pipeline::{Pipeline, PipelineOptions};
//! use tablemask::masking::load_policy_document;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let params = |host: &str| ConnectionParams {
//!     host: host.to_string(),
//!     database: "app".to_string(),
//!     user: "etl".to_string(),
//!     password: secret_string("secret".to_string()),
//!     settings: ConnectionSettings::default(),
//! };
//!
//! let source = create_row_source(params("prod-db"), "public.users")?;
//! let sink = create_row_sink(params("staging-db"), "public.users", WriteConfig::default())?;
//! let pipeline = Pipeline::new(source, sink, PipelineOptions::default());
//!
//! let policy = load_policy_document("policy.json")?;
//! let result = pipeline.run(&policy).await;
//! println!("{}", result.status_line());
//! std::process::exit(result.exit_code());
//! # }
//! ```

pub mod pipeline;
