//! Column-level writes.
//!
//! A [`Changeset`] collects exactly the columns a request supplied. Creates bind
//! every collected column into an `INSERT`, updates bind them into an `UPDATE`
//! so columns the caller left out are never touched.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{postgres::PgRow, FromRow, PgConnection, Postgres, QueryBuilder};

use crate::dto::patch::Patch;
use crate::error::{Error, Result};
use crate::utils::json_field;

#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(Option<String>),
    Int(Option<i32>),
    Bool(Option<bool>),
    Timestamp(Option<DateTime<Utc>>),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        match self {
            SqlValue::Text(v) => v.is_none(),
            SqlValue::Int(v) => v.is_none(),
            SqlValue::Bool(v) => v.is_none(),
            SqlValue::Timestamp(v) => v.is_none(),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            SqlValue::Text(Some(v)) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            SqlValue::Int(v) => *v,
            _ => None,
        }
    }
}

/// Rust types that map onto a single scalar column.
pub trait ColumnValue: Sized {
    fn into_sql(value: Option<Self>) -> SqlValue;
}

impl ColumnValue for String {
    fn into_sql(value: Option<Self>) -> SqlValue {
        SqlValue::Text(value)
    }
}

impl ColumnValue for i32 {
    fn into_sql(value: Option<Self>) -> SqlValue {
        SqlValue::Int(value)
    }
}

impl ColumnValue for bool {
    fn into_sql(value: Option<Self>) -> SqlValue {
        SqlValue::Bool(value)
    }
}

impl ColumnValue for DateTime<Utc> {
    fn into_sql(value: Option<Self>) -> SqlValue {
        SqlValue::Timestamp(value)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Changeset {
    entries: Vec<(&'static str, SqlValue)>,
}

impl Changeset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, column: &'static str, value: SqlValue) {
        match self.entries.iter_mut().find(|(c, _)| *c == column) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((column, value)),
        }
    }

    pub fn value<T: ColumnValue>(&mut self, column: &'static str, value: T) {
        self.set(column, T::into_sql(Some(value)));
    }

    pub fn optional<T: ColumnValue>(&mut self, column: &'static str, value: Option<T>) {
        self.set(column, T::into_sql(value));
    }

    /// Multi-value column on insert: absent or empty lists are stored as NULL.
    pub fn list<T: Serialize>(&mut self, column: &'static str, values: Option<Vec<T>>) -> Result<()> {
        let encoded = json_field::encode(values.as_deref())?;
        self.set(column, SqlValue::Text(encoded));
        Ok(())
    }

    /// Applies a patch to a nullable column. `Null` clears it.
    pub fn patch<T: ColumnValue>(&mut self, column: &'static str, patch: Patch<T>) {
        match patch {
            Patch::Missing => {}
            Patch::Null => self.set(column, T::into_sql(None)),
            Patch::Value(v) => self.set(column, T::into_sql(Some(v))),
        }
    }

    /// Applies a patch to a NOT NULL column. `Null` is rejected.
    pub fn patch_required<T: ColumnValue>(
        &mut self,
        column: &'static str,
        patch: Patch<T>,
    ) -> Result<()> {
        match patch {
            Patch::Missing => Ok(()),
            Patch::Null => Err(Error::Invalid(format!("{} cannot be null", column))),
            Patch::Value(v) => {
                self.set(column, T::into_sql(Some(v)));
                Ok(())
            }
        }
    }

    /// Applies a patch to a multi-value column, re-encoding the list.
    pub fn patch_list<T: Serialize>(&mut self, column: &'static str, patch: Patch<Vec<T>>) -> Result<()> {
        match patch {
            Patch::Missing => Ok(()),
            Patch::Null => {
                self.set(column, SqlValue::Text(None));
                Ok(())
            }
            Patch::Value(values) => self.list(column, Some(values)),
        }
    }

    /// Stamps `updated_at`; every mutating write goes through here.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.value("updated_at", now);
    }

    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.entries
            .iter()
            .find(|(c, _)| *c == column)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn text(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(SqlValue::as_text)
    }

    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(c, _)| *c)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

fn push_value(qb: &mut QueryBuilder<'_, Postgres>, value: &SqlValue) {
    match value {
        SqlValue::Text(v) => qb.push_bind(v.clone()),
        SqlValue::Int(v) => qb.push_bind(*v),
        SqlValue::Bool(v) => qb.push_bind(*v),
        SqlValue::Timestamp(v) => qb.push_bind(*v),
    };
}

pub fn build_insert<'a>(table: &str, changes: &Changeset) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::new(format!("INSERT INTO {} (", table));
    qb.push(changes.columns().collect::<Vec<_>>().join(", "));
    qb.push(") VALUES (");
    for (i, (_, value)) in changes.entries.iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        push_value(&mut qb, value);
    }
    qb.push(") RETURNING *");
    qb
}

pub fn build_update<'a>(table: &str, id: i32, changes: &Changeset) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::new(format!("UPDATE {} SET ", table));
    for (i, (column, value)) in changes.entries.iter().enumerate() {
        if i > 0 {
            qb.push(", ");
        }
        qb.push(format!("{} = ", column));
        push_value(&mut qb, value);
    }
    qb.push(" WHERE id = ");
    qb.push_bind(id);
    qb.push(" RETURNING *");
    qb
}

pub async fn insert_returning<T>(conn: &mut PgConnection, table: &str, changes: &Changeset) -> Result<T>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    if changes.is_empty() {
        return Err(Error::Internal(format!("Empty insert into {}", table)));
    }
    let mut qb = build_insert(table, changes);
    let row = qb
        .build_query_as::<T>()
        .fetch_one(&mut *conn)
        .await?;
    Ok(row)
}

/// Returns `None` when no row has the given id.
pub async fn update_returning<T>(
    conn: &mut PgConnection,
    table: &str,
    id: i32,
    changes: &Changeset,
) -> Result<Option<T>>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    if changes.is_empty() {
        return Err(Error::Internal(format!("Empty update of {}", table)));
    }
    let mut qb = build_update(table, id, changes);
    let row = qb
        .build_query_as::<T>()
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}
