//! Error types for model declaration, value typing and row decoding.

use thiserror::Error;

use crate::types::FieldType;

/// Errors raised while declaring models, assigning values or decoding rows.
#[derive(Debug, Error)]
pub enum Error {
    /// A model or field name is not a plain SQL identifier.
    #[error(
        "invalid identifier '{0}': must start with a letter or underscore and contain only alphanumeric characters and underscores"
    )]
    InvalidIdentifier(String),

    /// A model tried to declare the implicit `id` field itself.
    #[error("field name '{0}' is reserved for the primary key")]
    ReservedField(String),

    /// A field declared without a type has no typed default to infer one from.
    #[error("cannot infer a type for field '{0}': declare a type or a non-null default")]
    UntypedField(String),

    /// Two fields of the same model share a name.
    #[error("duplicate field '{field}' in model '{model}'")]
    DuplicateField { model: String, field: String },

    /// A value does not match the declared type of its field.
    #[error("type mismatch for field '{field}': expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: FieldType,
        found: String,
    },

    /// The model has no field with this name.
    #[error("model '{model}' has no field '{field}'")]
    UnknownField { model: String, field: String },

    /// An ordering column is neither `id` nor a declared field.
    #[error("cannot order model '{model}' by unknown column '{column}'")]
    UnknownColumn { model: String, column: String },

    /// A filter carries values but no clause to bind them to.
    #[error("filter for model '{model}' has {values} value(s) but an empty clause")]
    UnboundFilterValues { model: String, values: usize },

    /// A result row does not fit the model's declared field set.
    #[error("cannot decode row for model '{model}': {reason}")]
    Decode { model: String, reason: String },

    /// Configuration content is structurally invalid.
    #[error("config error: {0}")]
    Config(String),

    /// Reading or writing a configuration file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing or serialization failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Convenience alias for results with [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
