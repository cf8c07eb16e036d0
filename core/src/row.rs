//! Typed row decoding.
//!
//! Result rows arrive as `(column name, value)` pairs. [`Row::decode`]
//! checks them against a model's declared field set and fails explicitly on
//! a missing column or a value of the wrong type. Columns the descriptor does
//! not know about are skipped: they are left behind when a field is removed
//! from a model, and the store keeps them.

use crate::error::{Error, Result};
use crate::model::ModelDescriptor;
use crate::types::{FieldType, ID_FIELD, Value};

/// A result row validated against a [`ModelDescriptor`].
///
/// Holds the `id` and one value per declared field, in declaration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    model: String,
    id: i64,
    names: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    /// Decodes raw columns into a row of `descriptor`.
    ///
    /// Integer `0`/`1` in a boolean column decode to `false`/`true`, which is
    /// how SQLite stores booleans.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if `id` or a declared field is missing, or a
    /// value does not fit its field's type.
    ///
    /// # Examples
    ///
    /// ```
    /// use litemodel_core::{ModelDescriptor, Row, Value};
    ///
    /// let user = ModelDescriptor::builder("User")
    ///     .boolean("active", false)
    ///     .build()
    ///     .unwrap();
    /// let row = Row::decode(
    ///     &user,
    ///     vec![
    ///         ("id".to_string(), Value::Integer(3)),
    ///         ("active".to_string(), Value::Integer(1)),
    ///     ],
    /// )
    /// .unwrap();
    /// assert_eq!(row.id(), 3);
    /// assert!(row.get_bool("active").unwrap());
    /// ```
    pub fn decode(descriptor: &ModelDescriptor, columns: Vec<(String, Value)>) -> Result<Self> {
        let decode_error = |reason: String| Error::Decode {
            model: descriptor.name().to_string(),
            reason,
        };

        let mut id = None;
        let mut slots: Vec<Option<Value>> = vec![None; descriptor.fields().len()];
        for (column, value) in columns {
            if column.eq_ignore_ascii_case(ID_FIELD) {
                match value {
                    Value::Integer(n) => id = Some(n),
                    other => {
                        return Err(decode_error(format!(
                            "column 'id' holds {}, expected integer",
                            other.kind()
                        )));
                    }
                }
                continue;
            }
            let Some(index) = descriptor.column_index(&column) else {
                continue;
            };
            let field = &descriptor.fields()[index];
            let value = match (field.field_type, value) {
                (FieldType::Boolean, Value::Integer(0)) => Value::Boolean(false),
                (FieldType::Boolean, Value::Integer(1)) => Value::Boolean(true),
                (_, value) => value,
            };
            if !field.field_type.accepts(&value) {
                return Err(decode_error(format!(
                    "column '{column}' holds {}, expected {}",
                    value.kind(),
                    field.field_type
                )));
            }
            slots[index] = Some(value);
        }

        let id = id.ok_or_else(|| decode_error("missing column 'id'".to_string()))?;
        let mut values = Vec::with_capacity(slots.len());
        for (field, slot) in descriptor.fields().iter().zip(slots) {
            let value =
                slot.ok_or_else(|| decode_error(format!("missing column '{}'", field.name)))?;
            values.push(value);
        }

        Ok(Self {
            model: descriptor.name().to_string(),
            id,
            names: descriptor.fields().iter().map(|f| f.name.clone()).collect(),
            values,
        })
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    /// Iterates `(field name, value)` pairs in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.names.iter().map(String::as_str).zip(self.values.iter())
    }

    pub fn get(&self, field: &str) -> Result<&Value> {
        self.names
            .iter()
            .position(|n| n == field)
            .map(|i| &self.values[i])
            .ok_or_else(|| Error::UnknownField {
                model: self.model.clone(),
                field: field.to_string(),
            })
    }

    pub fn get_bool(&self, field: &str) -> Result<bool> {
        let value = self.get(field)?;
        value
            .as_bool()
            .ok_or_else(|| mismatch(field, FieldType::Boolean, value))
    }

    pub fn get_i64(&self, field: &str) -> Result<i64> {
        let value = self.get(field)?;
        value
            .as_i64()
            .ok_or_else(|| mismatch(field, FieldType::Integer, value))
    }

    /// Reads a non-null string field.
    pub fn get_str(&self, field: &str) -> Result<&str> {
        let value = self.get(field)?;
        value
            .as_str()
            .ok_or_else(|| mismatch(field, FieldType::String, value))
    }

    /// Reads a string field that may hold `NULL`.
    pub fn get_opt_str(&self, field: &str) -> Result<Option<&str>> {
        match self.get(field)? {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s)),
            other => Err(mismatch(field, FieldType::String, other)),
        }
    }

    /// Splits the row into its `id` and declaration-ordered values.
    pub fn into_parts(self) -> (i64, Vec<Value>) {
        (self.id, self.values)
    }
}

fn mismatch(field: &str, expected: FieldType, found: &Value) -> Error {
    Error::TypeMismatch {
        field: field.to_string(),
        expected,
        found: found.kind().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> ModelDescriptor {
        ModelDescriptor::builder("User")
            .string("name", "")
            .boolean("active", false)
            .integer("age", 0)
            .build()
            .unwrap()
    }

    fn columns(pairs: &[(&str, Value)]) -> Vec<(String, Value)> {
        pairs
            .iter()
            .map(|(n, v)| (n.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_decode_matches_by_name_not_position() {
        let row = Row::decode(
            &user(),
            columns(&[
                ("age", Value::Integer(30)),
                ("id", Value::Integer(9)),
                ("active", Value::Integer(0)),
                ("name", Value::from("ann")),
            ]),
        )
        .unwrap();
        assert_eq!(row.id(), 9);
        assert_eq!(row.get_str("name").unwrap(), "ann");
        assert!(!row.get_bool("active").unwrap());
        assert_eq!(row.get_i64("age").unwrap(), 30);
        let names: Vec<_> = row.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["name", "active", "age"]);
    }

    #[test]
    fn test_decode_matches_columns_case_insensitively() {
        let row = Row::decode(
            &user(),
            columns(&[
                ("ID", Value::Integer(4)),
                ("Name", Value::from("bo")),
                ("ACTIVE", Value::Integer(1)),
                ("age", Value::Integer(7)),
            ]),
        )
        .unwrap();
        assert_eq!(row.id(), 4);
        assert_eq!(row.get_str("name").unwrap(), "bo");
        assert!(row.get_bool("active").unwrap());
    }

    #[test]
    fn test_decode_skips_stale_columns() {
        let row = Row::decode(
            &user(),
            columns(&[
                ("id", Value::Integer(1)),
                ("name", Value::from("bo")),
                ("active", Value::Integer(1)),
                ("age", Value::Integer(5)),
                ("nickname", Value::from("old")),
            ]),
        )
        .unwrap();
        assert!(row.get("nickname").is_err());
    }

    #[test]
    fn test_decode_fails_on_missing_field() {
        let err = Row::decode(
            &user(),
            columns(&[("id", Value::Integer(1)), ("name", Value::from("x"))]),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Decode { reason, .. } if reason.contains("active")));
    }

    #[test]
    fn test_decode_fails_on_type_mismatch() {
        let err = Row::decode(
            &user(),
            columns(&[
                ("id", Value::Integer(1)),
                ("name", Value::from("x")),
                ("active", Value::Integer(1)),
                ("age", Value::from("thirty")),
            ]),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[test]
    fn test_decode_rejects_out_of_range_boolean() {
        let err = Row::decode(
            &user(),
            columns(&[
                ("id", Value::Integer(1)),
                ("name", Value::from("x")),
                ("active", Value::Integer(2)),
                ("age", Value::Integer(1)),
            ]),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[test]
    fn test_nullable_string_accessors() {
        let row = Row::decode(
            &user(),
            columns(&[
                ("id", Value::Integer(1)),
                ("name", Value::Null),
                ("active", Value::Integer(1)),
                ("age", Value::Integer(1)),
            ]),
        )
        .unwrap();
        assert_eq!(row.get_opt_str("name").unwrap(), None);
        assert!(row.get_str("name").is_err());
    }
}
