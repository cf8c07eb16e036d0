//! Additive schema synchronization.
//!
//! [`ensure_table`] brings a model's table to a state where its column set
//! is a superset of the model's fields: it creates the table when missing
//! and appends a column for every field the table lacks. Columns are never
//! dropped, renamed or retyped; columns of removed fields are reported as
//! stale and left in place.
//!
//! # Example
//!
//! ```
//! use litemodel_core::ModelDescriptor;
//! use litemodel_sqlite::migration::ensure_table;
//! use rusqlite::Connection;
//!
//! let conn = Connection::open_in_memory().unwrap();
//! let v1 = ModelDescriptor::builder("User").string("name", "").build().unwrap();
//! assert!(ensure_table(&conn, &v1).unwrap().created);
//!
//! let v2 = ModelDescriptor::builder("User")
//!     .string("name", "")
//!     .integer("age", 0)
//!     .build()
//!     .unwrap();
//! let report = ensure_table(&conn, &v2).unwrap();
//! assert!(!report.created);
//! assert_eq!(report.added_columns, vec!["age".to_string()]);
//! ```

use litemodel_core::{Field, ID_FIELD, ModelDescriptor};
use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::Result;
use crate::schema::{add_column_sql, create_table_sql};

/// Outcome of synchronizing one model's table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Table name.
    pub table: String,
    /// Whether the table did not exist before.
    pub created: bool,
    /// Columns appended for fields the table lacked, in declaration order.
    pub added_columns: Vec<String>,
    /// Columns in the table that no declared field maps to.
    pub stale_columns: Vec<String>,
}

/// Ensures the model's table exists and has a column for every field.
///
/// Safe to call repeatedly: an up-to-date table is left untouched. Store
/// errors propagate unchanged.
pub fn ensure_table(conn: &Connection, descriptor: &ModelDescriptor) -> Result<SyncReport> {
    let table = descriptor.table_name();
    let created = !table_exists(conn, table)?;

    let sql = create_table_sql(descriptor);
    debug!(%sql, "ensuring table");
    conn.execute_batch(&sql)?;
    if created {
        info!(table, model = descriptor.name(), "created table");
    }

    let live = live_columns(conn, table)?;
    let has_column = |name: &str| live.iter().any(|c| c.eq_ignore_ascii_case(name));

    let missing: Vec<&Field> = descriptor
        .fields()
        .iter()
        .filter(|f| !has_column(&f.name))
        .collect();
    let mut added_columns = Vec::with_capacity(missing.len());
    for field in missing {
        let sql = add_column_sql(descriptor, field);
        debug!(%sql, "adding column");
        conn.execute_batch(&sql)?;
        info!(table, column = %field.name, field_type = %field.field_type, "added column");
        added_columns.push(field.name.clone());
    }

    let stale_columns: Vec<String> = live
        .into_iter()
        .filter(|c| {
            !c.eq_ignore_ascii_case(ID_FIELD) && descriptor.column_index(c).is_none()
        })
        .collect();
    if !stale_columns.is_empty() {
        debug!(table, ?stale_columns, "table has columns without a field");
    }

    Ok(SyncReport {
        table: table.to_string(),
        created,
        added_columns,
        stale_columns,
    })
}

/// Ensures tables for all models, in the given order.
pub fn ensure_tables<'a>(
    conn: &Connection,
    descriptors: impl IntoIterator<Item = &'a ModelDescriptor>,
) -> Result<Vec<SyncReport>> {
    descriptors
        .into_iter()
        .map(|d| ensure_table(conn, d))
        .collect()
}

/// Returns the live column names of `table` in table order.
///
/// Empty if the table does not exist.
pub fn live_columns(conn: &Connection, table: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1) ORDER BY cid")?;
    let names = stmt
        .query_map([table], |row| row.get::<_, String>(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(names)
}

/// Checks whether a table exists.
pub fn table_exists(conn: &Connection, table: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1 COLLATE NOCASE",
        [table],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}
