//! SQLite storage for litemodel models.
//!
//! This crate turns [`ModelDescriptor`](litemodel_core::ModelDescriptor)s
//! into tables and records into rows. It covers two concerns:
//!
//! - **Schema synchronization**: [`migration::ensure_table`] creates a
//!   model's table when missing and appends columns for fields the table
//!   lacks. Evolution is additive only.
//! - **Record mapping**: [`Store`] builds parameterized `INSERT`,
//!   `UPDATE`, `DELETE` and `SELECT` statements for save, delete and find
//!   operations and decodes result rows back into records.
//!
//! # Architecture
//!
//! - **`schema`**: `CREATE TABLE` / `ALTER TABLE` generation
//! - **`migration`**: table introspection and additive synchronization
//! - **`statement`**: record statement building
//! - **`convert`**: value binding and column reading
//! - **`query`**: the [`Store`] handle
//!
//! # Quick start
//!
//! ```
//! use litemodel_core::{ModelDescriptor, Query, Record};
//! use litemodel_sqlite::Store;
//!
//! let user = ModelDescriptor::builder("User")
//!     .string("name", "")
//!     .boolean("active", false)
//!     .integer("age", 0)
//!     .build()
//!     .unwrap();
//! let store = Store::open_in_memory([user]).unwrap();
//! let user = store.descriptor("User").unwrap();
//!
//! for age in [10, 20, 30] {
//!     let mut record = Record::new(user.clone());
//!     record.set("age", age).unwrap();
//!     store.save_record(&mut record).unwrap();
//! }
//!
//! let over_15 = Query::new().filter("age > ?", [15]);
//! assert_eq!(store.count_records_by(&user, &over_15).unwrap(), 2);
//! ```
//!
//! # Table naming
//!
//! Tables are named after the model, lower-cased, in every statement.
//! Model and field names are restricted to plain identifiers when the
//! descriptor is built and are double-quoted in generated SQL.

mod convert;
mod error;
pub mod migration;
mod query;
pub mod schema;
pub mod statement;

pub use error::{Result, SqliteError};
pub use migration::SyncReport;
pub use query::{FindResult, Store};
