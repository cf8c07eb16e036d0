//! Record persistence and queries.
//!
//! Provides [`Store`], which owns a connection, synchronizes the tables of
//! its registered models on construction, and translates save, delete and
//! find operations into parameterized statements. Every operation is a
//! single statement; there are no transactions spanning several.
//!
//! # Example
//!
//! ```
//! use litemodel_core::{Direction, ModelDescriptor, Query, Record};
//! use litemodel_sqlite::Store;
//!
//! let user = ModelDescriptor::builder("User")
//!     .string("name", "")
//!     .integer("age", 0)
//!     .build()
//!     .unwrap();
//! let store = Store::open_in_memory([user]).unwrap();
//! let user = store.descriptor("User").unwrap();
//!
//! let mut record = Record::new(user.clone());
//! record.set("name", "ada").unwrap();
//! record.set("age", 36).unwrap();
//! store.save_record(&mut record).unwrap();
//! assert!(record.is_saved());
//!
//! let oldest = store
//!     .find_many_records(&user, &Query::new().order_by("age", Direction::Desc).limit(1))
//!     .unwrap();
//! assert_eq!(oldest[0].get("name").unwrap().as_str(), Some("ada"));
//! ```

use std::path::Path;
use std::sync::Arc;

use litemodel_core::config::OrmConfig;
use litemodel_core::{Model, ModelDescriptor, Query, Record, Row, Selection, UNSAVED_ID, Value};
use rusqlite::{Connection, params_from_iter};
use tracing::{debug, warn};

use crate::convert::{bind_all, read_columns};
use crate::error::{Result, SqliteError};
use crate::migration::{SyncReport, ensure_table, table_exists};
use crate::statement::{self, Statement};

/// Rows returned by a find, plus their count.
///
/// For a count-only find `rows` is empty and `count` holds the aggregate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FindResult {
    pub rows: Vec<Row>,
    pub count: u64,
}

/// A SQLite-backed store of model records.
///
/// Construction runs schema synchronization for every model, in
/// registration order, before any record operation can reach them.
pub struct Store {
    conn: Connection,
    models: Vec<Arc<ModelDescriptor>>,
    reports: Vec<SyncReport>,
}

impl Store {
    /// Opens (or creates) the database at `path` and synchronizes `models`.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::DatabaseError`] if the file cannot be opened or
    /// a schema statement fails.
    pub fn open(
        path: impl AsRef<Path>,
        models: impl IntoIterator<Item = ModelDescriptor>,
    ) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::with_connection(conn, models)
    }

    /// Opens a private in-memory database and synchronizes `models`.
    pub fn open_in_memory(models: impl IntoIterator<Item = ModelDescriptor>) -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?, models)
    }

    /// Opens the database and models named in a configuration.
    ///
    /// `database` overrides the configured path when given.
    pub fn from_config(config: &OrmConfig, database: Option<&Path>) -> Result<Self> {
        let models = config.descriptors()?;
        let path = database.unwrap_or(config.database.as_path());
        Self::open(path, models)
    }

    /// Wraps an existing connection and synchronizes `models`.
    pub fn with_connection(
        conn: Connection,
        models: impl IntoIterator<Item = ModelDescriptor>,
    ) -> Result<Self> {
        let mut store = Self {
            conn,
            models: Vec::new(),
            reports: Vec::new(),
        };
        for model in models {
            store.register(model)?;
        }
        Ok(store)
    }

    /// Synchronizes a model's table and registers the model.
    ///
    /// Registering a model whose table name is already registered replaces
    /// the earlier descriptor.
    pub fn register(&mut self, descriptor: ModelDescriptor) -> Result<SyncReport> {
        let report = ensure_table(&self.conn, &descriptor)?;
        self.models
            .retain(|m| m.table_name() != descriptor.table_name());
        self.models.push(Arc::new(descriptor));
        self.reports.push(report.clone());
        Ok(report)
    }

    /// Synchronization reports, one per registration, in order.
    pub fn sync_reports(&self) -> &[SyncReport] {
        &self.reports
    }

    /// Registered models in registration order.
    pub fn descriptors(&self) -> &[Arc<ModelDescriptor>] {
        &self.models
    }

    /// Looks up a registered model by name, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::UnknownModel`] if no such model is registered.
    pub fn descriptor(&self, name: &str) -> Result<Arc<ModelDescriptor>> {
        self.models
            .iter()
            .find(|m| m.name().eq_ignore_ascii_case(name))
            .cloned()
            .ok_or_else(|| SqliteError::UnknownModel(name.to_string()))
    }

    /// Returns a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Consumes the store and returns the underlying connection.
    pub fn into_connection(self) -> Connection {
        self.conn
    }

    // -----------------------------------------------------------------------
    // Dynamic records
    // -----------------------------------------------------------------------

    /// Inserts an unsaved record or updates a saved one.
    ///
    /// On insert the record's `id` is set from the generated row id. An
    /// update of an `id` with no row affects nothing and is not an error.
    pub fn save_record(&self, record: &mut Record) -> Result<()> {
        let id = self.save_values(record.descriptor(), record.id(), record.values())?;
        record.set_id(id);
        Ok(())
    }

    /// Deletes the row with the record's `id` and returns the number of rows
    /// removed. The record keeps its `id`.
    pub fn delete_record(&self, record: &Record) -> Result<usize> {
        self.delete_id(record.descriptor(), record.id())
    }

    pub fn find_one_record(
        &self,
        descriptor: &Arc<ModelDescriptor>,
        id: i64,
    ) -> Result<Option<Record>> {
        let result = self.find(descriptor, &Query::by_id(id).limit(1), Selection::Rows)?;
        result
            .rows
            .into_iter()
            .next()
            .map(|row| Record::from_row(Arc::clone(descriptor), row).map_err(SqliteError::from))
            .transpose()
    }

    pub fn find_many_records(
        &self,
        descriptor: &Arc<ModelDescriptor>,
        query: &Query,
    ) -> Result<Vec<Record>> {
        let result = self.find(descriptor, query, Selection::Rows)?;
        result
            .rows
            .into_iter()
            .map(|row| Record::from_row(Arc::clone(descriptor), row).map_err(SqliteError::from))
            .collect()
    }

    pub fn count_records(&self, descriptor: &ModelDescriptor) -> Result<u64> {
        self.count_records_by(descriptor, &Query::new())
    }

    pub fn count_records_by(&self, descriptor: &ModelDescriptor, query: &Query) -> Result<u64> {
        Ok(self.find(descriptor, query, Selection::Count)?.count)
    }

    // -----------------------------------------------------------------------
    // Typed models
    // -----------------------------------------------------------------------

    /// Inserts an unsaved model or updates a saved one.
    pub fn save<M: Model>(&self, model: &mut M) -> Result<()> {
        let id = self.save_values(M::descriptor(), model.id(), &model.values())?;
        model.set_id(id);
        Ok(())
    }

    /// Deletes the model's row and returns the number of rows removed.
    pub fn delete<M: Model>(&self, model: &M) -> Result<usize> {
        self.delete_id(M::descriptor(), model.id())
    }

    pub fn find_one<M: Model>(&self, id: i64) -> Result<Option<M>> {
        let result = self.find(M::descriptor(), &Query::by_id(id).limit(1), Selection::Rows)?;
        match result.rows.first() {
            Some(row) => Ok(Some(M::from_row(row)?)),
            None => Ok(None),
        }
    }

    pub fn find_many<M: Model>(&self, query: &Query) -> Result<Vec<M>> {
        let result = self.find(M::descriptor(), query, Selection::Rows)?;
        result
            .rows
            .iter()
            .map(|row| M::from_row(row).map_err(SqliteError::from))
            .collect()
    }

    pub fn count<M: Model>(&self) -> Result<u64> {
        self.count_records(M::descriptor())
    }

    pub fn count_by<M: Model>(&self, query: &Query) -> Result<u64> {
        self.count_records_by(M::descriptor(), query)
    }

    // -----------------------------------------------------------------------
    // Statement execution
    // -----------------------------------------------------------------------

    /// Runs a find and decodes every returned row against `descriptor`.
    ///
    /// If the statement cannot be prepared because the model's table does
    /// not exist, the result is empty instead of an error.
    pub fn find(
        &self,
        descriptor: &ModelDescriptor,
        query: &Query,
        selection: Selection,
    ) -> Result<FindResult> {
        let Statement { sql, params } = statement::select(descriptor, query, selection)?;
        debug!(%sql, params = params.len(), "find");

        let mut stmt = match self.conn.prepare(&sql) {
            Ok(stmt) => stmt,
            Err(err) => {
                if !table_exists(&self.conn, descriptor.table_name())? {
                    warn!(
                        table = descriptor.table_name(),
                        error = %err,
                        "table does not exist, returning empty result"
                    );
                    return Ok(FindResult::default());
                }
                return Err(err.into());
            }
        };

        if selection == Selection::Count {
            let count: i64 = stmt.query_row(params_from_iter(bind_all(&params)), |row| row.get(0))?;
            return Ok(FindResult {
                rows: Vec::new(),
                count: u64::try_from(count).unwrap_or_default(),
            });
        }

        let names: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let mut rows = stmt.query(params_from_iter(bind_all(&params)))?;
        let mut decoded = Vec::new();
        while let Some(row) = rows.next()? {
            let columns = read_columns(row, &names)?;
            decoded.push(Row::decode(descriptor, columns)?);
        }
        let count = decoded.len() as u64;
        Ok(FindResult {
            rows: decoded,
            count,
        })
    }

    fn save_values(&self, descriptor: &ModelDescriptor, id: i64, values: &[Value]) -> Result<i64> {
        descriptor.check_values(values)?;
        if id == UNSAVED_ID {
            self.execute(&statement::insert(descriptor, values))?;
            let id = self.conn.last_insert_rowid();
            debug!(table = descriptor.table_name(), id, "inserted row");
            Ok(id)
        } else {
            let changed = self.execute(&statement::update(descriptor, id, values))?;
            debug!(table = descriptor.table_name(), id, changed, "updated row");
            Ok(id)
        }
    }

    fn delete_id(&self, descriptor: &ModelDescriptor, id: i64) -> Result<usize> {
        let deleted = self.execute(&statement::delete(descriptor, id))?;
        debug!(table = descriptor.table_name(), id, deleted, "deleted row");
        Ok(deleted)
    }

    fn execute(&self, statement: &Statement) -> Result<usize> {
        debug!(sql = %statement.sql, params = statement.params.len(), "execute");
        let changed = self
            .conn
            .execute(&statement.sql, params_from_iter(bind_all(&statement.params)))?;
        Ok(changed)
    }
}
