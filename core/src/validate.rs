//! Identifier validation.
//!
//! Model and field names are embedded into generated SQL as table and
//! column identifiers, so they are restricted to plain identifiers before
//! any statement is built. Values never go through here; they are always
//! bound as parameters.
//!
//! # Examples
//!
//! ```
//! use litemodel_core::validate_identifier;
//!
//! assert!(validate_identifier("user_profile").is_ok());
//! assert!(validate_identifier("name\"; DROP TABLE user; --").is_err());
//! ```

use crate::error::{Error, Result};

/// Validates that `name` is a plain SQL identifier.
///
/// The name must be non-empty, start with an ASCII letter or underscore and
/// contain only ASCII alphanumerics and underscores.
///
/// # Errors
///
/// Returns [`Error::InvalidIdentifier`] otherwise.
pub fn validate_identifier(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(Error::InvalidIdentifier(name.to_string()));
    }
    Ok(())
}

/// Wraps an already validated identifier in double quotes.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{name}\"")
}
