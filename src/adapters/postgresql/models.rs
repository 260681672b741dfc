//! PostgreSQL value mapping and SQL builders
//!
//! Only a handful of column types are read and written natively. Every other
//! type travels as text: the source selects it with `::text`, and the sink
//! binds text and casts it back to the target column's type in SQL.

use crate::domain::{quote_ident, CellValue, MaskedRow, TableRef};
use tokio_postgres::types::{ToSql, Type};
use tokio_postgres::Row;

/// Largest number of bind parameters in one statement
pub const MAX_BIND_PARAMETERS: usize = 65535;

/// Boxed parameter that can be held across an await
pub type BoxedParam = Box<dyn ToSql + Sync + Send>;

/// Whether values of `ty` are read natively rather than as text
pub fn is_native(ty: &Type) -> bool {
    matches!(
        *ty,
        Type::BOOL
            | Type::INT2
            | Type::INT4
            | Type::INT8
            | Type::FLOAT4
            | Type::FLOAT8
            | Type::TEXT
            | Type::VARCHAR
            | Type::BPCHAR
            | Type::NAME
            | Type::JSON
            | Type::JSONB
    )
}

/// `SELECT` list that reads every column either natively or as text
pub fn build_select(table: &TableRef, columns: &[(String, Type)]) -> String {
    let list = columns
        .iter()
        .map(|(name, ty)| {
            let ident = quote_ident(name);
            if is_native(ty) {
                ident
            } else {
                format!("{ident}::text AS {ident}")
            }
        })
        .collect::<Vec<_>>()
        .join(", ");

    format!("SELECT {list} FROM {}", table.quoted())
}

/// Reads one cell of a result row
///
/// `idx` must be a valid column index of `row`.
pub fn read_cell(row: &Row, idx: usize) -> Result<CellValue, tokio_postgres::Error> {
    let value: CellValue = match *row.columns()[idx].type_() {
        Type::BOOL => row.try_get::<_, Option<bool>>(idx)?.into(),
        Type::INT2 => row.try_get::<_, Option<i16>>(idx)?.map(i64::from).into(),
        Type::INT4 => row.try_get::<_, Option<i32>>(idx)?.map(i64::from).into(),
        Type::INT8 => row.try_get::<_, Option<i64>>(idx)?.into(),
        Type::FLOAT4 => row.try_get::<_, Option<f32>>(idx)?.map(f64::from).into(),
        Type::FLOAT8 => row.try_get::<_, Option<f64>>(idx)?.into(),
        Type::JSON | Type::JSONB => row
            .try_get::<_, Option<serde_json::Value>>(idx)?
            .map(CellValue::Json)
            .unwrap_or(CellValue::Null),
        _ => row.try_get::<_, Option<String>>(idx)?.into(),
    };
    Ok(value)
}

/// How one target column is bound
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnBinding {
    Bool,
    Int2,
    Int4,
    Int8,
    Float4,
    Float8,
    Text,
    Json,
    /// Bound as text and cast to this (quoted, schema-qualified) type
    Cast(String),
}

impl ColumnBinding {
    /// Binding for a target parameter type learned from a prepared insert
    pub fn for_type(ty: &Type) -> Self {
        match *ty {
            Type::BOOL => ColumnBinding::Bool,
            Type::INT2 => ColumnBinding::Int2,
            Type::INT4 => ColumnBinding::Int4,
            Type::INT8 => ColumnBinding::Int8,
            Type::FLOAT4 => ColumnBinding::Float4,
            Type::FLOAT8 => ColumnBinding::Float8,
            Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => ColumnBinding::Text,
            Type::JSON | Type::JSONB => ColumnBinding::Json,
            _ => ColumnBinding::Cast(format!(
                "{}.{}",
                quote_ident(ty.schema()),
                quote_ident(ty.name())
            )),
        }
    }

    /// Placeholder text for parameter `$n`
    pub fn placeholder(&self, n: usize) -> String {
        match self {
            ColumnBinding::Cast(ty) => format!("${n}::text::{ty}"),
            _ => format!("${n}"),
        }
    }

    /// Converts a cell into a parameter for this binding
    ///
    /// # Errors
    ///
    /// Returns a message when the value cannot be represented in the target
    /// type, e.g. a masked string bound into an integer column.
    pub fn bind(&self, value: &CellValue) -> Result<BoxedParam, String> {
        let param: BoxedParam = match self {
            ColumnBinding::Bool => Box::new(to_bool(value)?),
            ColumnBinding::Int2 => Box::new(match to_i64(value)? {
                Some(v) => Some(i16::try_from(v).map_err(|_| format!("{v} is out of range for smallint"))?),
                None => None,
            }),
            ColumnBinding::Int4 => Box::new(match to_i64(value)? {
                Some(v) => Some(i32::try_from(v).map_err(|_| format!("{v} is out of range for integer"))?),
                None => None,
            }),
            ColumnBinding::Int8 => Box::new(to_i64(value)?),
            ColumnBinding::Float4 => Box::new(to_f64(value)?.map(|v| v as f32)),
            ColumnBinding::Float8 => Box::new(to_f64(value)?),
            ColumnBinding::Json => Box::new(to_json(value)?),
            ColumnBinding::Text | ColumnBinding::Cast(_) => {
                Box::new(value.render().map(|text| text.into_owned()))
            }
        };
        Ok(param)
    }
}

fn to_bool(value: &CellValue) -> Result<Option<bool>, String> {
    match value {
        CellValue::Null => Ok(None),
        CellValue::Bool(b) => Ok(Some(*b)),
        CellValue::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
            "t" | "true" | "yes" | "on" | "1" => Ok(Some(true)),
            "f" | "false" | "no" | "off" | "0" => Ok(Some(false)),
            _ => Err(format!("'{text}' is not a boolean")),
        },
        other => Err(format!("{} value is not a boolean", other.type_name())),
    }
}

fn to_i64(value: &CellValue) -> Result<Option<i64>, String> {
    match value {
        CellValue::Null => Ok(None),
        CellValue::Int(i) => Ok(Some(*i)),
        CellValue::Text(text) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| format!("'{text}' is not an integer")),
        other => Err(format!("{} value is not an integer", other.type_name())),
    }
}

fn to_f64(value: &CellValue) -> Result<Option<f64>, String> {
    match value {
        CellValue::Null => Ok(None),
        CellValue::Float(f) => Ok(Some(*f)),
        CellValue::Int(i) => Ok(Some(*i as f64)),
        CellValue::Text(text) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| format!("'{text}' is not a number")),
        other => Err(format!("{} value is not a number", other.type_name())),
    }
}

fn to_json(value: &CellValue) -> Result<Option<serde_json::Value>, String> {
    match value {
        CellValue::Null => Ok(None),
        CellValue::Json(json) => Ok(Some(json.clone())),
        CellValue::Text(text) => serde_json::from_str(text)
            .map(Some)
            .map_err(|e| format!("value is not valid JSON: {e}")),
        CellValue::Bool(b) => Ok(Some(serde_json::Value::Bool(*b))),
        CellValue::Int(i) => Ok(Some(serde_json::Value::from(*i))),
        CellValue::Float(f) => serde_json::Number::from_f64(*f)
            .map(|n| Some(serde_json::Value::Number(n)))
            .ok_or_else(|| format!("{f} cannot be represented in JSON")),
    }
}

/// Multi-row `INSERT` with one placeholder per value
///
/// With no bindings (when probing the target for its column types) every
/// placeholder is a bare `$n`.
pub fn build_insert(
    table: &TableRef,
    columns: &[String],
    bindings: Option<&[ColumnBinding]>,
    row_count: usize,
) -> String {
    let column_list = columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");

    let mut sql = format!("INSERT INTO {} ({column_list}) VALUES ", table.quoted());
    let mut n = 1;
    for row in 0..row_count {
        if row > 0 {
            sql.push_str(", ");
        }
        sql.push('(');
        for col in 0..columns.len() {
            if col > 0 {
                sql.push_str(", ");
            }
            match bindings.and_then(|b| b.get(col)) {
                Some(binding) => sql.push_str(&binding.placeholder(n)),
                None => sql.push_str(&format!("${n}")),
            }
            n += 1;
        }
        sql.push(')');
    }
    sql
}

/// Rows per `INSERT` given the configured batch size and column count
pub fn chunk_size(batch_size: usize, column_count: usize) -> usize {
    let limit = MAX_BIND_PARAMETERS / column_count.max(1);
    batch_size.min(limit).max(1)
}

/// Binds a batch of rows in `columns` order
///
/// # Errors
///
/// Returns `(column, message)` for the first value that cannot be bound.
pub fn bind_rows(
    rows: &[MaskedRow],
    columns: &[String],
    bindings: &[ColumnBinding],
) -> Result<Vec<BoxedParam>, (String, String)> {
    let mut params = Vec::with_capacity(rows.len() * columns.len());
    for row in rows {
        for (column, binding) in columns.iter().zip(bindings) {
            let value = row
                .get(column)
                .ok_or_else(|| (column.clone(), "masked row has no value for this column".to_string()))?;
            let param = binding.bind(value).map_err(|e| (column.clone(), e))?;
            params.push(param);
        }
    }
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TableRef {
        TableRef::new("public.users_masked").unwrap()
    }

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_build_select_casts_non_native_types() {
        let sql = build_select(
            &TableRef::new("users").unwrap(),
            &[
                ("id".to_string(), Type::INT4),
                ("created_at".to_string(), Type::TIMESTAMPTZ),
                ("email".to_string(), Type::VARCHAR),
            ],
        );
        assert_eq!(
            sql,
            r#"SELECT "id", "created_at"::text AS "created_at", "email" FROM "users""#
        );
    }

    #[test]
    fn test_build_insert_without_bindings() {
        let sql = build_insert(&table(), &cols(&["id", "ssn"]), None, 1);
        assert_eq!(
            sql,
            r#"INSERT INTO "public"."users_masked" ("id", "ssn") VALUES ($1, $2)"#
        );
    }

    #[test]
    fn test_build_insert_multi_row_with_casts() {
        let bindings = vec![ColumnBinding::Int4, ColumnBinding::for_type(&Type::UUID)];
        let sql = build_insert(&table(), &cols(&["id", "uid"]), Some(&bindings), 2);
        assert_eq!(
            sql,
            r#"INSERT INTO "public"."users_masked" ("id", "uid") VALUES ($1, $2::text::"pg_catalog"."uuid"), ($3, $4::text::"pg_catalog"."uuid")"#
        );
    }

    #[test]
    fn test_build_insert_quotes_hostile_identifiers() {
        let sql = build_insert(&table(), &cols(&["we\"ird"]), None, 1);
        assert!(sql.contains(r#"("we""ird")"#));
    }

    #[test]
    fn test_chunk_size() {
        assert_eq!(chunk_size(500, 10), 500);
        assert_eq!(chunk_size(10000, 100), 655);
        assert_eq!(chunk_size(500, 0), 500);
        assert_eq!(chunk_size(1, 70000), 1);
    }

    #[test]
    fn test_binding_for_type() {
        assert_eq!(ColumnBinding::for_type(&Type::BPCHAR), ColumnBinding::Text);
        assert_eq!(ColumnBinding::for_type(&Type::JSONB), ColumnBinding::Json);
        assert_eq!(
            ColumnBinding::for_type(&Type::DATE),
            ColumnBinding::Cast(r#""pg_catalog"."date""#.to_string())
        );
    }

    #[test]
    fn test_bind_text_into_integer_column() {
        assert!(ColumnBinding::Int8.bind(&CellValue::from("42")).is_ok());
        let err = ColumnBinding::Int8
            .bind(&CellValue::from("[REDACTED]"))
            .err()
            .unwrap();
        assert!(err.contains("not an integer"));
    }

    #[test]
    fn test_bind_range_checks() {
        assert!(ColumnBinding::Int2.bind(&CellValue::Int(70000)).is_err());
        assert!(ColumnBinding::Int4.bind(&CellValue::Int(70000)).is_ok());
    }

    #[test]
    fn test_bind_nulls_for_every_binding() {
        for binding in [
            ColumnBinding::Bool,
            ColumnBinding::Int2,
            ColumnBinding::Float4,
            ColumnBinding::Json,
            ColumnBinding::Text,
            ColumnBinding::Cast("\"pg_catalog\".\"date\"".to_string()),
        ] {
            assert!(binding.bind(&CellValue::Null).is_ok());
        }
    }

    #[test]
    fn test_bool_and_json_parsing() {
        assert_eq!(to_bool(&CellValue::from("t")).unwrap(), Some(true));
        assert!(to_bool(&CellValue::Int(1)).is_err());
        assert_eq!(
            to_json(&CellValue::from(r#"{"a":1}"#)).unwrap(),
            Some(serde_json::json!({"a": 1}))
        );
        assert!(to_json(&CellValue::from("[REDACTED")).is_err());
    }

    #[test]
    fn test_bind_rows_names_failing_column() {
        let mut row = MaskedRow::with_capacity(2);
        row.push("id", CellValue::Int(1));
        row.push("age", CellValue::from("****"));

        let err = bind_rows(
            &[row],
            &cols(&["id", "age"]),
            &[ColumnBinding::Int4, ColumnBinding::Int4],
        )
        .err()
        .unwrap();
        assert_eq!(err.0, "age");
    }
}
