//! Column masking for Tablemask
//!
//! This module turns a JSON masking policy into per-column strategies and
//! applies them to rows.
//!
//! # Architecture
//!
//! - **Policy**: parsing and structural validation of the policy document
//! - **Strategies**: `redact`, `partial` and `last_4` implementations
//! - **Engine**: compiles a policy once and masks row sets against it
//! - **Report**: per-column counts for logs and the audit trail
//! - **Audit**: JSON-lines record of every run
//!
//! # Usage
//!
//! ```rust
//! use tablemask::domain::CellValue;
//! use tablemask::masking::{InvalidRulePolicy, MaskingEngine, MaskingPolicy};
//!
//! let policy = MaskingPolicy::from_json_str(
//!     r#"{"fields": {"email": {"maskingType": "partial"}}}"#,
//! )?;
//! let engine = MaskingEngine::new(&policy, InvalidRulePolicy::Abort)?;
//! let outcome = engine.mask(
//!     &[vec![CellValue::from("john.doe@example.com")]],
//!     &["email".to_string()],
//! )?;
//! assert_eq!(outcome.rows[0].get("email"), Some(&CellValue::from("john.doe****@example.com")));
//! # Ok::<(), tablemask::domain::TablemaskError>(())
//! ```

pub mod audit;
pub mod config;
pub mod engine;
pub mod policy;
pub mod report;
pub mod strategy;

// Re-export main types
pub use audit::{AuditLogger, AuditRecord};
pub use config::{AuditConfig, InvalidRulePolicy, MaskingConfig};
pub use engine::{mask, rule_strategy, MaskOutcome, MaskingEngine};
pub use policy::{load_policy, load_policy_document, MaskingKind, MaskingPolicy, MaskingRule};
pub use report::{ColumnReport, MaskingReport};
