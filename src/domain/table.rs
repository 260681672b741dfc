//! Table identifiers with validation and quoting
//!
//! Table names come straight from the command line, so they are never spliced
//! into SQL as-is. [`TableRef`] validates each part and renders it as a quoted
//! identifier.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Quotes an SQL identifier, doubling embedded double quotes
///
/// # Examples
///
/// ```
/// use tablemask::domain::table::quote_ident;
///
/// assert_eq!(quote_ident("users"), "\"users\"");
/// assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
/// ```
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// A possibly schema-qualified table name
///
/// Accepts `table` or `schema.table`. Parts may contain any character except
/// NUL; they are always quoted when rendered.
///
/// # Examples
///
/// ```
/// use tablemask::domain::table::TableRef;
/// use std::str::FromStr;
///
/// let table = TableRef::from_str("staging.customers").unwrap();
/// assert_eq!(table.schema(), Some("staging"));
/// assert_eq!(table.quoted(), "\"staging\".\"customers\"");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableRef {
    schema: Option<String>,
    name: String,
}

impl TableRef {
    /// Creates a table reference from a `table` or `schema.table` string
    ///
    /// # Returns
    ///
    /// Returns `Ok(TableRef)` if every part is valid, `Err` otherwise
    pub fn new(raw: impl Into<String>) -> Result<Self, String> {
        let raw = raw.into();
        let raw = raw.trim();
        if raw.is_empty() {
            return Err("Table name cannot be empty".to_string());
        }

        let (schema, name) = match raw.split_once('.') {
            Some((schema, name)) => (Some(schema), name),
            None => (None, raw),
        };

        if let Some(schema) = schema {
            validate_part(schema, "schema")?;
        }
        validate_part(name, "table")?;

        Ok(Self {
            schema: schema.map(str::to_string),
            name: name.to_string(),
        })
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Quoted form safe to embed in SQL
    pub fn quoted(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", quote_ident(schema), quote_ident(&self.name)),
            None => quote_ident(&self.name),
        }
    }
}

fn validate_part(part: &str, what: &str) -> Result<(), String> {
    if part.is_empty() {
        return Err(format!("{what} name cannot be empty"));
    }
    if part.contains('\0') {
        return Err(format!("{what} name cannot contain NUL characters"));
    }
    if part.contains('.') {
        return Err(format!(
            "{what} name '{part}' has too many parts; expected table or schema.table"
        ));
    }
    Ok(())
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", schema, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

impl FromStr for TableRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
