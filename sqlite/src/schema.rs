//! SQL schema generation for model tables.
//!
//! Generates `CREATE TABLE` and `ALTER TABLE ... ADD COLUMN` statements from
//! a [`ModelDescriptor`]. The table is named after the model, lower-cased;
//! columns follow declaration order after the implicit `id`.
//!
//! # Column mapping
//!
//! | Field | Column |
//! |---|---|
//! | `id` | `INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL` |
//! | boolean | `BOOLEAN NOT NULL DEFAULT 0\|1` |
//! | string | `TEXT DEFAULT '...'` (nullable) |
//! | integer | `INTEGER NOT NULL DEFAULT n` |
//!
//! Identifiers come from validated descriptors and are double-quoted.

use litemodel_core::{Field, FieldType, ID_FIELD, ModelDescriptor, Value, quote_identifier};

/// Column definition of the implicit primary key.
pub fn id_column_definition() -> String {
    format!(
        "{} INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL",
        quote_identifier(ID_FIELD)
    )
}

/// Column definition for a declared field, including its default.
///
/// # Examples
///
/// ```
/// use litemodel_core::Field;
/// use litemodel_sqlite::schema::column_definition;
///
/// assert_eq!(
///     column_definition(&Field::boolean("active", false)),
///     "\"active\" BOOLEAN NOT NULL DEFAULT 0"
/// );
/// assert_eq!(
///     column_definition(&Field::string("name", "it's")),
///     "\"name\" TEXT DEFAULT 'it''s'"
/// );
/// ```
pub fn column_definition(field: &Field) -> String {
    let name = quote_identifier(&field.name);
    let default = sql_literal(&field.default);
    match field.field_type {
        FieldType::Boolean => format!("{name} BOOLEAN NOT NULL DEFAULT {default}"),
        FieldType::String => format!("{name} TEXT DEFAULT {default}"),
        FieldType::Integer => format!("{name} INTEGER NOT NULL DEFAULT {default}"),
    }
}

/// Renders a default value as a SQL literal.
///
/// Column defaults cannot be bound as parameters in DDL, so string defaults
/// are emitted with single quotes doubled.
fn sql_literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Boolean(b) => u8::from(*b).to_string(),
        Value::Integer(n) => n.to_string(),
        Value::String(s) => format!("'{}'", s.replace('\'', "''")),
    }
}

/// Generates the idempotent `CREATE TABLE IF NOT EXISTS` statement for a model.
pub fn create_table_sql(descriptor: &ModelDescriptor) -> String {
    let mut columns = Vec::with_capacity(descriptor.fields().len() + 1);
    columns.push(id_column_definition());
    columns.extend(descriptor.fields().iter().map(column_definition));
    format!(
        "CREATE TABLE IF NOT EXISTS {} ({})",
        quote_identifier(descriptor.table_name()),
        columns.join(", ")
    )
}

/// Generates the statement adding `field` to the model's table.
///
/// `id` never goes through here; it is always created with the table.
pub fn add_column_sql(descriptor: &ModelDescriptor, field: &Field) -> String {
    format!(
        "ALTER TABLE {} ADD COLUMN {}",
        quote_identifier(descriptor.table_name()),
        column_definition(field)
    )
}
