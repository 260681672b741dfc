//! Redaction strategy

use super::MaskStrategy;

/// Replaces the whole value with a fixed replacement
pub struct RedactionStrategy {
    replacement: String,
}

impl RedactionStrategy {
    pub fn new(replacement: impl Into<String>) -> Self {
        Self {
            replacement: replacement.into(),
        }
    }
}

impl MaskStrategy for RedactionStrategy {
    fn mask(&self, _value: &str) -> String {
        self.replacement.clone()
    }

    fn mask_null(&self) -> Option<String> {
        Some(self.replacement.clone())
    }

    fn label(&self) -> &'static str {
        "redact"
    }
}
