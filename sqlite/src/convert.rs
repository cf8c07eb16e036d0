//! Conversion between model [`Value`]s and SQLite values.
//!
//! Values are always bound as statement parameters through [`SqlValue`];
//! booleans are stored as `0`/`1`. Reading goes the other way: raw column
//! values become [`Value`]s and are then decoded against the model by
//! [`Row::decode`](litemodel_core::Row::decode), which turns `0`/`1` in
//! boolean columns back into booleans.

use litemodel_core::Value;
use rusqlite::types::{ToSql, ToSqlOutput, Value as RawValue, ValueRef};

use crate::error::{Result, SqliteError};

/// Binds a model value as a SQLite parameter.
#[derive(Debug)]
pub(crate) struct SqlValue<'a>(pub(crate) &'a Value);

impl ToSql for SqlValue<'_> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self.0 {
            Value::Null => Ok(ToSqlOutput::Owned(RawValue::Null)),
            Value::Boolean(true) => Ok(ToSqlOutput::Owned(RawValue::Integer(1))),
            Value::Boolean(false) => Ok(ToSqlOutput::Owned(RawValue::Integer(0))),
            Value::Integer(n) => Ok(ToSqlOutput::Owned(RawValue::Integer(*n))),
            Value::String(s) => Ok(ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes()))),
        }
    }
}

/// Wraps a slice of values for `rusqlite::params_from_iter`.
pub(crate) fn bind_all(values: &[Value]) -> impl Iterator<Item = SqlValue<'_>> {
    values.iter().map(SqlValue)
}

/// Converts a raw column value into a model value.
///
/// Reals and blobs have no model counterpart. SQLite stores a non-integer
/// written to an `INTEGER` column by another client as `REAL`, and that is
/// reported here rather than truncated.
pub(crate) fn from_sql(column: &str, value: ValueRef<'_>) -> Result<Value> {
    match value {
        ValueRef::Null => Ok(Value::Null),
        ValueRef::Integer(n) => Ok(Value::Integer(n)),
        ValueRef::Text(bytes) => Ok(Value::String(String::from_utf8_lossy(bytes).into_owned())),
        ValueRef::Real(_) => Err(SqliteError::UnsupportedValue {
            column: column.to_string(),
            kind: "real",
        }),
        ValueRef::Blob(_) => Err(SqliteError::UnsupportedValue {
            column: column.to_string(),
            kind: "blob",
        }),
    }
}

/// Reads every column of a result row as `(name, value)` pairs.
pub(crate) fn read_columns(row: &rusqlite::Row<'_>, names: &[String]) -> Result<Vec<(String, Value)>> {
    let mut columns = Vec::with_capacity(names.len());
    for (index, name) in names.iter().enumerate() {
        let value = from_sql(name, row.get_ref(index)?)?;
        columns.push((name.clone(), value));
    }
    Ok(columns)
}
