//! Integration tests for the litemodel-sqlite crate.

use std::sync::{Arc, OnceLock};

use litemodel_core::config::OrmConfig;
use litemodel_core::{
    Direction, Model, ModelDescriptor, Query, Record, Row, UNSAVED_ID, Value,
};
use litemodel_sqlite::migration::{ensure_table, live_columns};
use litemodel_sqlite::{SqliteError, Store};
use rusqlite::Connection;

#[derive(Debug, Clone, PartialEq)]
struct User {
    id: i64,
    name: String,
    active: bool,
    age: i64,
}

impl User {
    fn new(name: &str, age: i64) -> Self {
        Self {
            id: UNSAVED_ID,
            name: name.to_string(),
            active: false,
            age,
        }
    }
}

impl Model for User {
    fn descriptor() -> &'static ModelDescriptor {
        static DESCRIPTOR: OnceLock<ModelDescriptor> = OnceLock::new();
        DESCRIPTOR.get_or_init(|| {
            ModelDescriptor::builder("User")
                .string("name", "")
                .boolean("active", false)
                .integer("age", 0)
                .build()
                .unwrap()
        })
    }

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }

    fn values(&self) -> Vec<Value> {
        vec![
            self.name.clone().into(),
            self.active.into(),
            self.age.into(),
        ]
    }

    fn from_row(row: &Row) -> litemodel_core::Result<Self> {
        Ok(Self {
            id: row.id(),
            name: row.get_str("name")?.to_string(),
            active: row.get_bool("active")?,
            age: row.get_i64("age")?,
        })
    }
}

fn user_store() -> Store {
    Store::open_in_memory([User::descriptor().clone()]).unwrap()
}

fn seed_ages(store: &Store, ages: &[i64]) -> Vec<User> {
    ages.iter()
        .map(|&age| {
            let mut user = User::new(&format!("user{age}"), age);
            store.save(&mut user).unwrap();
            user
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Schema synchronization
// ---------------------------------------------------------------------------

#[test]
fn schema_creation_is_idempotent() {
    let conn = Connection::open_in_memory().unwrap();
    ensure_table(&conn, User::descriptor()).unwrap();
    let before = live_columns(&conn, "user").unwrap();

    let report = ensure_table(&conn, User::descriptor()).unwrap();
    assert!(!report.created);
    assert!(report.added_columns.is_empty());
    assert_eq!(live_columns(&conn, "user").unwrap(), before);
}

#[test]
fn added_field_backfills_existing_rows_with_default() {
    let store = user_store();
    seed_ages(&store, &[1, 2]);
    let conn = store.into_connection();

    let grown = ModelDescriptor::builder("User")
        .string("name", "")
        .boolean("active", false)
        .integer("age", 0)
        .string("city", "nowhere")
        .boolean("admin", true)
        .build()
        .unwrap();
    let report = ensure_table(&conn, &grown).unwrap();
    assert_eq!(report.added_columns, ["city", "admin"]);

    let cities: Vec<(String, bool)> = conn
        .prepare("SELECT city, admin FROM user")
        .unwrap()
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(
        cities,
        vec![("nowhere".to_string(), true), ("nowhere".to_string(), true)]
    );
}

#[test]
fn file_backed_store_grows_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app.db");

    let v1 = ModelDescriptor::builder("Note")
        .string("body", "")
        .build()
        .unwrap();
    {
        let store = Store::open(&path, [v1]).unwrap();
        let note = store.descriptor("Note").unwrap();
        let mut record = Record::new(note);
        record.set("body", "hello").unwrap();
        store.save_record(&mut record).unwrap();
    }

    let v2 = ModelDescriptor::builder("Note")
        .string("body", "")
        .integer("stars", 5)
        .build()
        .unwrap();
    let store = Store::open(&path, [v2]).unwrap();
    assert_eq!(store.sync_reports()[0].added_columns, ["stars"]);

    let note = store.descriptor("Note").unwrap();
    let records = store.find_many_records(&note, &Query::new()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("body").unwrap(), &Value::from("hello"));
    assert_eq!(records[0].get("stars").unwrap(), &Value::Integer(5));
}

#[test]
fn removed_field_keeps_stale_column_and_still_decodes() {
    let store = user_store();
    seed_ages(&store, &[40]);
    let conn = store.into_connection();

    let shrunk = ModelDescriptor::builder("User")
        .string("name", "")
        .build()
        .unwrap();
    let store = Store::with_connection(conn, [shrunk]).unwrap();
    assert_eq!(store.sync_reports()[0].stale_columns, ["active", "age"]);

    let user = store.descriptor("User").unwrap();
    let records = store.find_many_records(&user, &Query::new()).unwrap();
    assert_eq!(records[0].get("name").unwrap(), &Value::from("user40"));
    assert!(records[0].get("age").is_err());

    // The stale NOT NULL column still has its default, so inserts keep working.
    let mut record = Record::new(user.clone());
    store.save_record(&mut record).unwrap();
    assert_eq!(store.count_records(&user).unwrap(), 2);
}

#[test]
fn field_renamed_only_in_case_reuses_column() {
    let v1 = ModelDescriptor::builder("User")
        .string("Name", "")
        .build()
        .unwrap();
    let store = Store::open_in_memory([v1]).unwrap();
    let user = store.descriptor("User").unwrap();
    let mut record = Record::new(user.clone());
    record.set("Name", "ann").unwrap();
    store.save_record(&mut record).unwrap();
    let conn = store.into_connection();

    let v2 = ModelDescriptor::builder("User")
        .string("name", "")
        .build()
        .unwrap();
    let store = Store::with_connection(conn, [v2]).unwrap();
    let report = &store.sync_reports()[0];
    assert!(report.added_columns.is_empty());
    assert!(report.stale_columns.is_empty());

    let user = store.descriptor("User").unwrap();
    let found = store
        .find_one_record(&user, record.id())
        .unwrap()
        .expect("row saved under the old casing");
    assert_eq!(found.get("name").unwrap(), &Value::from("ann"));

    let mut renamed = Record::new(user.clone());
    renamed.set("name", "bo").unwrap();
    store.save_record(&mut renamed).unwrap();
    let records = store
        .find_many_records(&user, &Query::new().order_by("id", Direction::Asc))
        .unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].get("name").unwrap(), &Value::from("bo"));
}

// ---------------------------------------------------------------------------
// Record mapping
// ---------------------------------------------------------------------------

#[test]
fn save_assigns_id_and_round_trips() {
    let store = user_store();
    let mut user = User::new("ada", 36);
    user.active = true;
    assert_eq!(user.id, UNSAVED_ID);

    store.save(&mut user).unwrap();
    assert_ne!(user.id, UNSAVED_ID);

    let loaded: User = store.find_one(user.id).unwrap().unwrap();
    assert_eq!(loaded, user);
}

#[test]
fn update_keeps_id_and_count() {
    let store = user_store();
    let mut users = seed_ages(&store, &[10, 20]);
    let id = users[0].id;

    users[0].age = 11;
    store.save(&mut users[0]).unwrap();
    assert_eq!(users[0].id, id);
    assert_eq!(store.count::<User>().unwrap(), 2);

    let loaded: User = store.find_one(id).unwrap().unwrap();
    assert_eq!(loaded.age, 11);
    assert_eq!(loaded.name, "user10");
    let other: User = store.find_one(users[1].id).unwrap().unwrap();
    assert_eq!(other.age, 20);
}

#[test]
fn update_of_missing_row_is_silent() {
    let store = user_store();
    let mut ghost = User::new("ghost", 1);
    ghost.id = 999;
    store.save(&mut ghost).unwrap();
    assert_eq!(ghost.id, 999);
    assert_eq!(store.count::<User>().unwrap(), 0);
}

#[test]
fn delete_removes_exactly_one_row() {
    let store = user_store();
    let users = seed_ages(&store, &[1, 2, 3]);

    let id = users[1].id;
    assert_eq!(store.delete(&users[1]).unwrap(), 1);
    assert!(store.find_one::<User>(id).unwrap().is_none());
    assert_eq!(store.count::<User>().unwrap(), 2);
    assert_eq!(users[1].id, id);

    // Deleting twice is a silent no-op.
    assert_eq!(store.delete(&users[1]).unwrap(), 0);
    assert_eq!(store.count::<User>().unwrap(), 2);
}

#[test]
fn pagination_returns_expected_slice() {
    let store = user_store();
    seed_ages(&store, &[1, 2, 3, 4, 5]);
    let n: u64 = 5;

    for (limit, offset) in [(2, 0), (2, 4), (10, 1), (3, 5), (1, 9)] {
        let rows: Vec<User> = store
            .find_many(&Query::new().limit(limit).offset(offset))
            .unwrap();
        let expected = limit.min(n.saturating_sub(offset));
        assert_eq!(rows.len() as u64, expected, "limit={limit} offset={offset}");
    }

    let page: Vec<User> = store.find_many(&Query::new().limit(2).offset(1)).unwrap();
    let ages: Vec<_> = page.iter().map(|u| u.age).collect();
    assert_eq!(ages, [2, 3]);

    let tail: Vec<User> = store.find_many(&Query::new().offset(3)).unwrap();
    assert_eq!(tail.len(), 2);
}

#[test]
fn oversized_limit_and_offset_are_clamped() {
    let store = user_store();
    seed_ages(&store, &[1, 2, 3]);

    let all: Vec<User> = store.find_many(&Query::new().limit(u64::MAX)).unwrap();
    assert_eq!(all.len(), 3);

    let none: Vec<User> = store
        .find_many(&Query::new().limit(u64::MAX).offset(u64::MAX))
        .unwrap();
    assert!(none.is_empty());
}

#[test]
fn filter_values_without_clause_are_rejected() {
    let store = user_store();
    seed_ages(&store, &[1]);
    let err = store
        .count_by::<User>(&Query::new().filter("", [1]))
        .unwrap_err();
    assert!(matches!(
        err,
        SqliteError::Model(litemodel_core::Error::UnboundFilterValues { values: 1, .. })
    ));
}

#[test]
fn user_scenario() {
    let store = user_store();
    let users = seed_ages(&store, &[10, 20, 30]);

    let over_15 = Query::new().filter("age > ?", [15]);
    assert_eq!(store.count_by::<User>(&over_15).unwrap(), 2);

    let by_age_desc: Vec<User> = store
        .find_many(&Query::new().order_by("age", Direction::Desc))
        .unwrap();
    assert_eq!(by_age_desc[0].age, 30);

    store.delete(&users[0]).unwrap();
    assert_eq!(store.count::<User>().unwrap(), 2);
}

#[test]
fn find_result_count_matches_rows() {
    let store = user_store();
    seed_ages(&store, &[5, 6, 7]);
    let result = store
        .find(
            User::descriptor(),
            &Query::new().filter("age >= ?", [6]),
            litemodel_core::Selection::Rows,
        )
        .unwrap();
    assert_eq!(result.count, 2);
    assert_eq!(result.rows.len(), 2);
}

#[test]
fn find_on_unsynchronized_model_is_empty() {
    let store = Store::open_in_memory(Vec::new()).unwrap();
    assert!(store.find_many::<User>(&Query::new()).unwrap().is_empty());
    assert!(store.find_one::<User>(1).unwrap().is_none());
    assert_eq!(store.count::<User>().unwrap(), 0);
}

#[test]
fn save_to_unsynchronized_model_propagates_store_error() {
    let store = Store::open_in_memory(Vec::new()).unwrap();
    let mut user = User::new("x", 1);
    assert!(matches!(
        store.save(&mut user),
        Err(SqliteError::DatabaseError(_))
    ));
    assert_eq!(user.id, UNSAVED_ID);
}

#[test]
fn boolean_field_stays_boolean() {
    let store = user_store();
    let user = store.descriptor("User").unwrap();
    let mut record = Record::new(Arc::clone(&user));
    assert!(record.set("active", 1).is_err());
    record.set("active", true).unwrap();
    store.save_record(&mut record).unwrap();

    let loaded = store.find_one_record(&user, record.id()).unwrap().unwrap();
    assert_eq!(loaded.get("active").unwrap(), &Value::Boolean(true));
}

#[test]
fn real_written_by_another_client_is_reported_not_truncated() {
    let store = user_store();
    let users = seed_ages(&store, &[1]);
    store
        .connection()
        .execute("UPDATE user SET age = 2.5 WHERE id = ?1", [users[0].id])
        .unwrap();
    assert!(matches!(
        store.find_one::<User>(users[0].id),
        Err(SqliteError::UnsupportedValue { kind: "real", .. })
    ));
}

#[test]
fn filter_values_are_bound_not_interpolated() {
    let store = user_store();
    seed_ages(&store, &[1]);
    let hostile = "x' OR '1'='1";
    let query = Query::new().filter("name = ?", [hostile]);
    assert_eq!(store.count_by::<User>(&query).unwrap(), 0);

    let mut user = User::new(hostile, 2);
    store.save(&mut user).unwrap();
    assert_eq!(store.count_by::<User>(&query).unwrap(), 1);
}

#[test]
fn nullable_string_round_trips() {
    let store = user_store();
    let user = store.descriptor("User").unwrap();
    let mut record = Record::new(Arc::clone(&user));
    record.set("name", Value::Null).unwrap();
    store.save_record(&mut record).unwrap();

    let loaded = store.find_one_record(&user, record.id()).unwrap().unwrap();
    assert_eq!(loaded.get("name").unwrap(), &Value::Null);
    // The typed decoder requires a non-null name.
    assert!(store.find_one::<User>(record.id()).is_err());
}

#[test]
fn store_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let config: OrmConfig = write_config(&dir.path().join("cfg.db"));
    let store = Store::from_config(&config, None).unwrap();
    let post = store.descriptor("post").unwrap();
    let record = {
        let mut record = Record::new(Arc::clone(&post));
        store.save_record(&mut record).unwrap();
        record
    };
    let loaded = store.find_one_record(&post, record.id()).unwrap().unwrap();
    assert_eq!(loaded.get("views").unwrap(), &Value::Integer(0));
    assert_eq!(loaded.get("title").unwrap(), &Value::from("untitled"));
}

fn write_config(db: &std::path::Path) -> OrmConfig {
    let dir = db.parent().unwrap();
    let path = dir.join("litemodel.yaml");
    std::fs::write(
        &path,
        format!(
            "version: '1.0'\ndatabase: {}\ndefaults:\n  integer: 0\nmodels:\n  - name: Post\n    fields:\n      - {{ name: title, default: untitled }}\n      - {{ name: views, type: integer }}\n",
            db.display()
        ),
    )
    .unwrap();
    OrmConfig::load(&path).unwrap()
}
