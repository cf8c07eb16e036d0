//! Error types for SQLite store operations.
//!
//! Store-level failures from the driver pass through unmodified inside
//! [`SqliteError::DatabaseError`]; model-level failures (bad identifiers,
//! mistyped values, undecodable rows) arrive as [`SqliteError::Model`].

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum SqliteError {
    /// SQLite database operation failure.
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// Model declaration, typing or decoding failure.
    #[error(transparent)]
    Model(#[from] litemodel_core::Error),

    /// The value read from a column has no counterpart in the model's types.
    #[error("unsupported value in column '{column}': {kind}")]
    UnsupportedValue { column: String, kind: &'static str },

    /// No model with this name is registered with the store.
    #[error("model not registered: {0}")]
    UnknownModel(String),
}

/// Convenience alias for results with [`SqliteError`].
pub type Result<T> = std::result::Result<T, SqliteError>;
