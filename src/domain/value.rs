//! Scalar cell values
//!
//! A [`CellValue`] is one column value of one row, independent of the store it
//! came from. Adapters convert driver values into cells on ingress and back
//! into bind parameters on egress.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// A single scalar column value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// SQL NULL
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    /// JSON/JSONB documents
    Json(serde_json::Value),
}

impl CellValue {
    /// Canonical text rendering used when a non-text value is masked
    ///
    /// Returns `None` for NULL.
    pub fn render(&self) -> Option<Cow<'_, str>> {
        match self {
            CellValue::Null => None,
            CellValue::Text(s) => Some(Cow::Borrowed(s)),
            CellValue::Bool(b) => Some(Cow::Owned(b.to_string())),
            CellValue::Int(i) => Some(Cow::Owned(i.to_string())),
            CellValue::Float(f) => Some(Cow::Owned(f.to_string())),
            CellValue::Json(v) => Some(Cow::Owned(v.to_string())),
        }
    }

    /// Short type label for logs and error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Null => "null",
            CellValue::Bool(_) => "bool",
            CellValue::Int(_) => "int",
            CellValue::Float(_) => "float",
            CellValue::Text(_) => "text",
            CellValue::Json(_) => "json",
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.render() {
            Some(text) => f.write_str(&text),
            None => f.write_str("NULL"),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Float(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render() {
        assert_eq!(CellValue::Null.render(), None);
        assert_eq!(CellValue::Int(123456789).render().unwrap(), "123456789");
        assert_eq!(CellValue::Bool(true).render().unwrap(), "true");
        assert_eq!(CellValue::Float(1.5).render().unwrap(), "1.5");
        assert_eq!(
            CellValue::Json(json!({"a": 1})).render().unwrap(),
            r#"{"a":1}"#
        );
    }

    #[test]
    fn test_from_option() {
        assert_eq!(CellValue::from(None::<String>), CellValue::Null);
        assert_eq!(
            CellValue::from(Some("x")),
            CellValue::Text("x".to_string())
        );
    }

    #[test]
    fn test_display_null() {
        assert_eq!(CellValue::Null.to_string(), "NULL");
        assert_eq!(CellValue::from("abc").to_string(), "abc");
    }

    #[test]
    fn test_serialize_untagged() {
        let values = vec![
            CellValue::Null,
            CellValue::Int(7),
            CellValue::from("seven"),
        ];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"[null,7,"seven"]"#);
    }
}
