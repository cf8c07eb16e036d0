//! Query structure for find-style operations.
//!
//! A [`Query`] is at most one flat filter, one ordering column, a limit and
//! an offset. The filter clause is raw SQL supplied by the caller with `?`
//! placeholders; it is passed through unparsed and only its values are
//! bound. The ordering column is checked against the model before use.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::model::ModelDescriptor;
use crate::types::Value;

/// Sort direction of an ordering clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

impl Direction {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("unknown sort direction '{other}': expected asc or desc")),
        }
    }
}

/// A raw predicate fragment and the values bound to its placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub clause: String,
    pub values: Vec<Value>,
}

/// An ordering column and direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub direction: Direction,
}

/// Whether a find returns rows or only their count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    Rows,
    Count,
}

/// Optional filter, ordering, limit and offset.
///
/// # Examples
///
/// ```
/// use litemodel_core::{Direction, Query};
///
/// let query = Query::new()
///     .filter("age > ?", [15])
///     .order_by("age", Direction::Desc)
///     .limit(10)
///     .offset(20);
/// assert_eq!(query.limit, Some(10));
/// assert_eq!(query.filter.unwrap().values.len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Query {
    pub filter: Option<Filter>,
    pub order: Option<Order>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects the row whose primary key is `id`.
    pub fn by_id(id: i64) -> Self {
        Self::new().filter("id = ?", [id])
    }

    /// Sets the predicate fragment and its bound values.
    pub fn filter<I, V>(mut self, clause: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.filter = Some(Filter {
            clause: clause.into(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    pub fn order_by(mut self, column: impl Into<String>, direction: Direction) -> Self {
        self.order = Some(Order {
            column: column.into(),
            direction,
        });
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Values to bind, in placeholder order.
    pub fn bound_values(&self) -> &[Value] {
        match &self.filter {
            Some(filter) => &filter.values,
            None => &[],
        }
    }

    /// Checks that the ordering column is `id` or a declared field and that
    /// filter values have a clause to bind to.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownColumn`] or [`Error::UnboundFilterValues`].
    pub fn validate(&self, descriptor: &ModelDescriptor) -> Result<()> {
        if let Some(filter) = &self.filter {
            if filter.clause.trim().is_empty() && !filter.values.is_empty() {
                return Err(Error::UnboundFilterValues {
                    model: descriptor.name().to_string(),
                    values: filter.values.len(),
                });
            }
        }
        match &self.order {
            Some(order) if !descriptor.has_column(&order.column) => Err(Error::UnknownColumn {
                model: descriptor.name().to_string(),
                column: order.column.clone(),
            }),
            _ => Ok(()),
        }
    }
}
