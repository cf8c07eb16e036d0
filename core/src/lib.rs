//! Core model types for the litemodel object mapper.
//!
//! This crate defines everything about a model that does not touch the
//! database:
//!
//! - [`ModelDescriptor`]: the ordered, typed, defaulted field set of one
//!   persisted entity, declared through [`ModelBuilder`].
//! - [`Field`], [`FieldType`] and [`Value`]: the closed set of semantic
//!   column types {boolean, string, integer} and their values.
//! - [`Record`] and the [`Model`] trait: dynamic and typed record
//!   instances, transient until first saved (`id == -1`).
//! - [`Row`]: a result row decoded and validated against a descriptor.
//! - [`Query`]: the optional filter/order/limit/offset of a find.
//! - [`config::OrmConfig`]: YAML configuration listing registered models.
//!
//! The SQLite side (schema synchronization and statement execution) lives
//! in `litemodel-sqlite`.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use litemodel_core::*;
//!
//! let user = ModelDescriptor::builder("User")
//!     .string("name", "")
//!     .boolean("active", false)
//!     .integer("age", 0)
//!     .build()
//!     .unwrap();
//!
//! let mut record = Record::new(Arc::new(user));
//! record.set("name", "ada").unwrap();
//! assert!(!record.is_saved());
//!
//! let query = Query::new().filter("age > ?", [15]).order_by("age", Direction::Desc);
//! assert!(query.validate(record.descriptor()).is_ok());
//! ```

pub mod config;
mod error;
mod model;
mod query;
mod row;
mod types;
mod validate;

pub use error::{Error, Result};
pub use model::{Model, ModelBuilder, ModelDescriptor, Record};
pub use query::{Direction, Filter, Order, Query, Selection};
pub use row::Row;
pub use types::*;
pub use validate::{quote_identifier, validate_identifier};
