//! Partial masking strategy
//!
//! Partial masking is the one column-aware rule: `email` and `ssn` columns get
//! dedicated treatment, every other column keeps its first half.

use super::{first_half, last_chars, MaskStrategy};

/// Marker inserted into e-mail addresses
pub const EMAIL_MARKER: &str = "****";

/// Partial reveal, chosen by column name at compile time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartialStrategy {
    /// `local****@domain`, or just the marker when there is no `@`
    Email,
    /// Replacement followed by the last four characters
    Ssn { replacement: String },
    /// First half of the value followed by the replacement
    Prefix { replacement: String },
}

impl PartialStrategy {
    pub fn for_column(column: &str, replacement: impl Into<String>) -> Self {
        match column {
            "email" => PartialStrategy::Email,
            "ssn" => PartialStrategy::Ssn {
                replacement: replacement.into(),
            },
            _ => PartialStrategy::Prefix {
                replacement: replacement.into(),
            },
        }
    }
}

impl MaskStrategy for PartialStrategy {
    fn mask(&self, value: &str) -> String {
        match self {
            PartialStrategy::Email => match value.find('@') {
                Some(at) => format!("{}{EMAIL_MARKER}{}", &value[..at], &value[at..]),
                // The address is discarded entirely when it has no '@'
                None => EMAIL_MARKER.to_string(),
            },
            PartialStrategy::Ssn { replacement } => {
                format!("{replacement}{}", last_chars(value, 4))
            }
            PartialStrategy::Prefix { replacement } => {
                format!("{}{replacement}", first_half(value))
            }
        }
    }

    fn label(&self) -> &'static str {
        match self {
            PartialStrategy::Email => "partial_email",
            PartialStrategy::Ssn { .. } => "partial_ssn",
            PartialStrategy::Prefix { .. } => "partial",
        }
    }
}
