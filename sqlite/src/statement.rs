//! Statement building for record operations.
//!
//! Every builder returns SQL text together with the values to bind, in
//! placeholder order. Row values are never interpolated; identifiers come
//! from validated descriptors and are double-quoted. Limit and offset are
//! integers and are written as literals.

use litemodel_core::{ID_FIELD, ModelDescriptor, Query, Selection, Value, quote_identifier};

use crate::error::Result;

/// SQL text plus its bound values.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

fn table(descriptor: &ModelDescriptor) -> String {
    quote_identifier(descriptor.table_name())
}

fn id_predicate() -> String {
    format!("{} = ?", quote_identifier(ID_FIELD))
}

/// `INSERT` of every declared field, in declaration order.
///
/// A model without declared fields inserts `DEFAULT VALUES`.
pub fn insert(descriptor: &ModelDescriptor, values: &[Value]) -> Statement {
    if descriptor.fields().is_empty() {
        return Statement {
            sql: format!("INSERT INTO {} DEFAULT VALUES", table(descriptor)),
            params: Vec::new(),
        };
    }
    let columns: Vec<String> = descriptor
        .fields()
        .iter()
        .map(|f| quote_identifier(&f.name))
        .collect();
    let placeholders = vec!["?"; columns.len()].join(", ");
    Statement {
        sql: format!(
            "INSERT INTO {} ({}) VALUES ({placeholders})",
            table(descriptor),
            columns.join(", ")
        ),
        params: values.to_vec(),
    }
}

/// `UPDATE` of every declared field of the row with primary key `id`.
///
/// Field values are bound first, then `id`.
pub fn update(descriptor: &ModelDescriptor, id: i64, values: &[Value]) -> Statement {
    let assignments = if descriptor.fields().is_empty() {
        let id = quote_identifier(ID_FIELD);
        format!("{id} = {id}")
    } else {
        descriptor
            .fields()
            .iter()
            .map(|f| format!("{} = ?", quote_identifier(&f.name)))
            .collect::<Vec<_>>()
            .join(", ")
    };
    let mut params = values.to_vec();
    params.push(Value::Integer(id));
    Statement {
        sql: format!(
            "UPDATE {} SET {assignments} WHERE {}",
            table(descriptor),
            id_predicate()
        ),
        params,
    }
}

/// `DELETE` of the row with primary key `id`.
pub fn delete(descriptor: &ModelDescriptor, id: i64) -> Statement {
    Statement {
        sql: format!("DELETE FROM {} WHERE {}", table(descriptor), id_predicate()),
        params: vec![Value::Integer(id)],
    }
}

/// `SELECT` for a find.
///
/// Only the filter's values are bound. A count ignores ordering and
/// pagination, which would otherwise apply to the single aggregate row. An
/// offset without a limit is written as `LIMIT -1 OFFSET n`, since SQLite
/// only accepts `OFFSET` after `LIMIT`.
///
/// # Errors
///
/// Returns an error if the ordering column is not `id` or a declared field.
///
/// # Examples
///
/// ```
/// use litemodel_core::{Direction, ModelDescriptor, Query, Selection};
/// use litemodel_sqlite::statement::select;
///
/// let user = ModelDescriptor::builder("User").integer("age", 0).build().unwrap();
/// let query = Query::new().filter("age > ?", [15]).order_by("age", Direction::Desc).limit(5);
/// let stmt = select(&user, &query, Selection::Rows).unwrap();
/// assert_eq!(
///     stmt.sql,
///     "SELECT * FROM \"user\" WHERE age > ? ORDER BY \"age\" DESC LIMIT 5"
/// );
/// ```
pub fn select(descriptor: &ModelDescriptor, query: &Query, selection: Selection) -> Result<Statement> {
    query.validate(descriptor)?;

    let projection = match selection {
        Selection::Rows => "*",
        Selection::Count => "COUNT(*)",
    };
    let mut sql = format!("SELECT {projection} FROM {}", table(descriptor));
    let mut params = Vec::new();

    if let Some(filter) = &query.filter {
        if !filter.clause.trim().is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&filter.clause);
            params.extend(filter.values.iter().cloned());
        }
    }

    if selection == Selection::Rows {
        if let Some(order) = &query.order {
            sql.push_str(&format!(
                " ORDER BY {} {}",
                quote_identifier(&order.column),
                order.direction.as_sql()
            ));
        }
        match (query.limit.map(sql_count), query.offset.map(sql_count)) {
            (Some(limit), Some(offset)) => sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}")),
            (Some(limit), None) => sql.push_str(&format!(" LIMIT {limit}")),
            (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {offset}")),
            (None, None) => {}
        }
    }

    Ok(Statement { sql, params })
}

/// SQLite reads integer literals above `i64::MAX` as REAL, which LIMIT and
/// OFFSET reject.
fn sql_count(n: u64) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
