//! Masking policy model
//!
//! A policy document is JSON of the form
//!
//! ```json
//! {
//!   "fields": {
//!     "email": { "maskingType": "partial" },
//!     "ssn":   { "maskingType": "last_4", "replacement": "XXX-XX-" }
//!   }
//! }
//! ```
//!
//! [`MaskingPolicy::parse`] checks the document structure only. Whether a rule
//! carries the keys its masking type needs is checked later, when the engine
//! compiles the policy, so that the error can be attributed to the column and
//! handled according to the configured invalid-rule policy.

use crate::domain::{Result, TablemaskError};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Replacement used by partial rules that omit one
pub const DEFAULT_PARTIAL_REPLACEMENT: &str = "*";

/// Masking type declared by a rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaskingKind {
    /// Replace the whole value
    Redact,
    /// Column-aware partial reveal
    Partial,
    /// Replacement followed by the last four characters
    LastFour,
    /// Unknown `maskingType`; the value passes through untouched
    Unrecognized(String),
}

impl MaskingKind {
    /// Maps a `maskingType` string. Matching is exact.
    pub fn from_type_name(name: &str) -> Self {
        match name {
            "redact" => MaskingKind::Redact,
            "partial" => MaskingKind::Partial,
            "last_4" => MaskingKind::LastFour,
            other => MaskingKind::Unrecognized(other.to_string()),
        }
    }

    /// Name as written in policy documents
    pub fn type_name(&self) -> &str {
        match self {
            MaskingKind::Redact => "redact",
            MaskingKind::Partial => "partial",
            MaskingKind::LastFour => "last_4",
            MaskingKind::Unrecognized(name) => name,
        }
    }
}

impl fmt::Display for MaskingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

/// The `replacement` field of a rule as found in the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Replacement {
    Missing,
    Text(String),
    /// Present but not a string; holds the JSON type name
    Malformed(&'static str),
}

/// One column's masking directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskingRule {
    pub kind: MaskingKind,
    pub replacement: Replacement,
}

impl MaskingRule {
    pub fn new(kind: MaskingKind, replacement: Option<&str>) -> Self {
        Self {
            kind,
            replacement: replacement
                .map(|r| Replacement::Text(r.to_string()))
                .unwrap_or(Replacement::Missing),
        }
    }

    /// Replacement text, if the rule carries a well-formed one
    pub fn replacement_text(&self) -> Option<&str> {
        match &self.replacement {
            Replacement::Text(text) => Some(text),
            _ => None,
        }
    }
}

/// Parsed masking policy: column name to rule
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MaskingPolicy {
    rules: BTreeMap<String, MaskingRule>,
    fingerprint: String,
}

impl MaskingPolicy {
    /// Parses a policy document
    ///
    /// # Errors
    ///
    /// Returns `InvalidPolicy` if the document is not an object, has no
    /// `fields` mapping, or any rule is not an object with a string
    /// `maskingType`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tablemask::masking::policy::{MaskingKind, MaskingPolicy};
    /// use serde_json::json;
    ///
    /// let policy = MaskingPolicy::parse(&json!({
    ///     "fields": { "ssn": { "maskingType": "last_4", "replacement": "XXX-XX-" } }
    /// })).unwrap();
    /// assert_eq!(policy.rule("ssn").unwrap().kind, MaskingKind::LastFour);
    /// ```
    pub fn parse(document: &Value) -> Result<Self> {
        let root = document.as_object().ok_or_else(|| {
            TablemaskError::InvalidPolicy(format!(
                "policy document must be an object, got {}",
                json_type(document)
            ))
        })?;

        let fields = root
            .get("fields")
            .ok_or_else(|| TablemaskError::InvalidPolicy("missing top-level 'fields'".to_string()))?
            .as_object()
            .ok_or_else(|| {
                TablemaskError::InvalidPolicy("'fields' must be a mapping of column rules".to_string())
            })?;

        let mut rules = BTreeMap::new();
        for (column, raw_rule) in fields {
            let rule = raw_rule.as_object().ok_or_else(|| {
                TablemaskError::InvalidPolicy(format!(
                    "rule for column '{column}' must be an object, got {}",
                    json_type(raw_rule)
                ))
            })?;

            let kind = match rule.get("maskingType") {
                Some(Value::String(name)) => MaskingKind::from_type_name(name),
                Some(other) => {
                    return Err(TablemaskError::InvalidPolicy(format!(
                        "'maskingType' for column '{column}' must be a string, got {}",
                        json_type(other)
                    )))
                }
                None => {
                    return Err(TablemaskError::InvalidPolicy(format!(
                        "rule for column '{column}' has no 'maskingType'"
                    )))
                }
            };

            let replacement = match rule.get("replacement") {
                None => Replacement::Missing,
                Some(Value::String(text)) => Replacement::Text(text.clone()),
                Some(other) => Replacement::Malformed(json_type(other)),
            };

            rules.insert(column.clone(), MaskingRule { kind, replacement });
        }

        Ok(Self {
            rules,
            fingerprint: fingerprint(document),
        })
    }

    /// Parses a policy from JSON text
    pub fn from_json_str(text: &str) -> Result<Self> {
        let document: Value = serde_json::from_str(text)
            .map_err(|e| TablemaskError::InvalidPolicy(format!("policy is not valid JSON: {e}")))?;
        Self::parse(&document)
    }

    /// Rule for a column, if the policy has one
    pub fn rule(&self, column: &str) -> Option<&MaskingRule> {
        self.rules.get(column)
    }

    /// Iterates rules in column-name order
    pub fn rules(&self) -> impl Iterator<Item = (&str, &MaskingRule)> {
        self.rules.iter().map(|(column, rule)| (column.as_str(), rule))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// SHA-256 of the canonical JSON form of the source document
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }
}

/// Reads and parses a policy file
///
/// A missing or unreadable file is reported as `InvalidPolicy`, the same as a
/// malformed document.
pub fn load_policy(path: impl AsRef<Path>) -> Result<MaskingPolicy> {
    let path = path.as_ref();
    let document = load_policy_document(path)?;
    let policy = MaskingPolicy::parse(&document)?;

    tracing::info!(
        path = %path.display(),
        rules = policy.len(),
        fingerprint = %policy.fingerprint(),
        "Masking policy loaded"
    );
    Ok(policy)
}

/// Reads a policy file as raw JSON without interpreting it
pub fn load_policy_document(path: impl AsRef<Path>) -> Result<Value> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(TablemaskError::InvalidPolicy(format!(
            "policy file '{}' does not exist",
            path.display()
        )));
    }

    let contents = std::fs::read_to_string(path).map_err(|e| {
        TablemaskError::InvalidPolicy(format!(
            "failed to read policy file '{}': {e}",
            path.display()
        ))
    })?;

    serde_json::from_str(&contents).map_err(|e| {
        TablemaskError::InvalidPolicy(format!(
            "policy file '{}' is not valid JSON: {e}",
            path.display()
        ))
    })
}

fn fingerprint(document: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(document.to_string().as_bytes());
    let result = hasher.finalize();
    format!("{result:x}")
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_known_kinds() {
        let policy = MaskingPolicy::parse(&json!({
            "fields": {
                "name": { "maskingType": "redact", "replacement": "REDACTED" },
                "email": { "maskingType": "partial" },
                "ssn": { "maskingType": "last_4", "replacement": "XXX-XX-" }
            }
        }))
        .unwrap();

        assert_eq!(policy.len(), 3);
        assert_eq!(policy.rule("name").unwrap().kind, MaskingKind::Redact);
        assert_eq!(
            policy.rule("name").unwrap().replacement_text(),
            Some("REDACTED")
        );
        assert_eq!(policy.rule("email").unwrap().kind, MaskingKind::Partial);
        assert_eq!(
            policy.rule("email").unwrap().replacement,
            Replacement::Missing
        );
        assert_eq!(policy.rule("ssn").unwrap().kind, MaskingKind::LastFour);
        assert!(policy.rule("id").is_none());
    }

    #[test]
    fn test_unknown_type_is_accepted() {
        let policy = MaskingPolicy::parse(&json!({
            "fields": { "phone": { "maskingType": "hash" } }
        }))
        .unwrap();
        assert_eq!(
            policy.rule("phone").unwrap().kind,
            MaskingKind::Unrecognized("hash".to_string())
        );
    }

    #[test]
    fn test_type_names_are_case_sensitive() {
        assert_eq!(
            MaskingKind::from_type_name("REDACT"),
            MaskingKind::Unrecognized("REDACT".to_string())
        );
        assert_eq!(MaskingKind::from_type_name("last_4"), MaskingKind::LastFour);
    }

    #[test]
    fn test_missing_fields() {
        let err = MaskingPolicy::parse(&json!({ "rules": {} })).unwrap_err();
        assert!(matches!(err, TablemaskError::InvalidPolicy(_)));
    }

    #[test]
    fn test_fields_not_a_mapping() {
        let err = MaskingPolicy::parse(&json!({ "fields": ["email"] })).unwrap_err();
        assert!(matches!(err, TablemaskError::InvalidPolicy(_)));
    }

    #[test]
    fn test_document_not_an_object() {
        let err = MaskingPolicy::parse(&json!("fields")).unwrap_err();
        assert!(matches!(err, TablemaskError::InvalidPolicy(_)));
    }

    #[test]
    fn test_rule_without_masking_type() {
        let err = MaskingPolicy::parse(&json!({
            "fields": { "email": { "replacement": "*" } }
        }))
        .unwrap_err();
        assert!(err.to_string().contains("'email'"));
    }

    #[test]
    fn test_non_string_replacement_is_kept_as_malformed() {
        let policy = MaskingPolicy::parse(&json!({
            "fields": { "ssn": { "maskingType": "last_4", "replacement": 42 } }
        }))
        .unwrap();
        assert_eq!(
            policy.rule("ssn").unwrap().replacement,
            Replacement::Malformed("number")
        );
    }

    #[test]
    fn test_empty_fields_is_valid() {
        let policy = MaskingPolicy::parse(&json!({ "fields": {} })).unwrap();
        assert!(policy.is_empty());
    }

    #[test]
    fn test_fingerprint_is_stable() {
        let doc = json!({ "fields": { "a": { "maskingType": "redact", "replacement": "x" } } });
        let first = MaskingPolicy::parse(&doc).unwrap();
        let second = MaskingPolicy::parse(&doc).unwrap();
        assert_eq!(first.fingerprint(), second.fingerprint());
        assert_eq!(first.fingerprint().len(), 64);
    }

    #[test]
    fn test_load_policy_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(br#"{"fields": {"ssn": {"maskingType": "last_4", "replacement": "XXX-XX-"}}}"#)
            .unwrap();
        file.flush().unwrap();

        let policy = load_policy(file.path()).unwrap();
        assert_eq!(policy.len(), 1);
    }

    #[test]
    fn test_load_policy_missing_file() {
        let err = load_policy("does-not-exist.json").unwrap_err();
        assert!(matches!(err, TablemaskError::InvalidPolicy(_)));
    }

    #[test]
    fn test_load_policy_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"{ not json").unwrap();
        file.flush().unwrap();

        let err = load_policy(file.path()).unwrap_err();
        assert!(matches!(err, TablemaskError::InvalidPolicy(_)));
    }
}
