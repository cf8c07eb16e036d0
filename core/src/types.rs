//! Field type and value definitions.
//!
//! Columns come in a small closed set of semantic types. Every field of a
//! model carries one of them together with a default value, and every value
//! written to or read from the store is a [`Value`] checked against it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Primary key value of a record that has not been persisted yet.
pub const UNSAVED_ID: i64 = -1;

/// Name of the implicit primary key column every model carries.
pub const ID_FIELD: &str = "id";

/// Semantic type of a model field.
///
/// # Examples
///
/// ```
/// use litemodel_core::{FieldType, Value};
///
/// assert_eq!(FieldType::of(&Value::Boolean(true)), Some(FieldType::Boolean));
/// assert_eq!(FieldType::of(&Value::Null), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Stored as a `BOOLEAN NOT NULL` column (0/1).
    Boolean,
    /// Stored as a nullable `TEXT` column.
    String,
    /// Stored as an `INTEGER NOT NULL` column.
    Integer,
}

impl FieldType {
    /// Infers the field type from a default value.
    ///
    /// `Null` carries no type and yields `None`.
    pub fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Boolean(_) => Some(Self::Boolean),
            Value::String(_) => Some(Self::String),
            Value::Integer(_) => Some(Self::Integer),
            Value::Null => None,
        }
    }

    /// Returns `true` if `value` may be stored in a field of this type.
    ///
    /// Only string fields are nullable.
    pub fn accepts(self, value: &Value) -> bool {
        match value {
            Value::Null => self == Self::String,
            other => Self::of(other) == Some(self),
        }
    }

    /// Lower-case name used in configuration files and messages.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::String => "string",
            Self::Integer => "integer",
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    String(String),
}

impl Value {
    /// Short description of the value's kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Boolean(_) => "boolean",
            Self::Integer(_) => "integer",
            Self::String(_) => "string",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::Integer(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s:?}"),
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Option<String>> for Value {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Null, Self::String)
    }
}

/// Per-type defaults used for fields declared without an explicit default.
///
/// # Examples
///
/// ```
/// use litemodel_core::{FieldType, TypeDefaults, Value};
///
/// let defaults = TypeDefaults::default();
/// assert_eq!(defaults.for_type(FieldType::Integer), Value::Integer(-1));
/// assert_eq!(defaults.for_type(FieldType::String), Value::String(String::new()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeDefaults {
    pub boolean: bool,
    pub string: String,
    pub integer: i64,
}

impl Default for TypeDefaults {
    fn default() -> Self {
        Self {
            boolean: false,
            string: String::new(),
            integer: -1,
        }
    }
}

impl TypeDefaults {
    /// Returns the default value for fields of type `ty`.
    pub fn for_type(&self, ty: FieldType) -> Value {
        match ty {
            FieldType::Boolean => Value::Boolean(self.boolean),
            FieldType::String => Value::String(self.string.clone()),
            FieldType::Integer => Value::Integer(self.integer),
        }
    }
}

/// A named, typed, defaulted attribute of a model.
///
/// The type is fixed at declaration; later assignments are checked against
/// it and never change it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub field_type: FieldType,
    pub default: Value,
}

impl Field {
    /// Declares a boolean field.
    pub fn boolean(name: impl Into<String>, default: bool) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Boolean,
            default: Value::Boolean(default),
        }
    }

    /// Declares a string field.
    pub fn string(name: impl Into<String>, default: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::String,
            default: Value::String(default.into()),
        }
    }

    /// Declares an integer field.
    pub fn integer(name: impl Into<String>, default: i64) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Integer,
            default: Value::Integer(default),
        }
    }

    /// Declares a field of type `ty` defaulting to the configured value for that type.
    pub fn with_type_default(name: impl Into<String>, ty: FieldType, defaults: &TypeDefaults) -> Self {
        Self {
            name: name.into(),
            field_type: ty,
            default: defaults.for_type(ty),
        }
    }

    /// Declares a field whose type is inferred from its default value.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UntypedField`] when the default is `Null`.
    ///
    /// # Examples
    ///
    /// ```
    /// use litemodel_core::{Field, FieldType};
    ///
    /// let field = Field::inferred("active", false).unwrap();
    /// assert_eq!(field.field_type, FieldType::Boolean);
    /// ```
    pub fn inferred(name: impl Into<String>, default: impl Into<Value>) -> Result<Self> {
        let name = name.into();
        let default = default.into();
        let field_type = FieldType::of(&default).ok_or_else(|| Error::UntypedField(name.clone()))?;
        Ok(Self {
            name,
            field_type,
            default,
        })
    }

    /// Checks that `value` fits this field's type.
    pub fn check(&self, value: &Value) -> Result<()> {
        if self.field_type.accepts(value) {
            Ok(())
        } else {
            Err(Error::TypeMismatch {
                field: self.name.clone(),
                expected: self.field_type,
                found: value.kind().to_string(),
            })
        }
    }
}
