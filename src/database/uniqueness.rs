use sqlx::{PgConnection, Postgres, QueryBuilder};

use super::changeset::{Changeset, SqlValue};
use crate::error::{Error, Result};

/// A unique key of a table: one column, or several columns unique together.
#[derive(Debug, Clone, PartialEq)]
pub struct UniqueKey {
    pub field: &'static str,
    pub columns: Vec<(&'static str, SqlValue)>,
}

impl UniqueKey {
    pub fn single(column: &'static str, value: SqlValue) -> Self {
        Self {
            field: column,
            columns: vec![(column, value)],
        }
    }

    pub fn pair(
        field: &'static str,
        first: (&'static str, SqlValue),
        second: (&'static str, SqlValue),
    ) -> Self {
        Self {
            field,
            columns: vec![first, second],
        }
    }

    /// Keys for every listed column the changeset actually writes.
    pub fn from_changes(changes: &Changeset, columns: &[&'static str]) -> Vec<Self> {
        columns
            .iter()
            .filter_map(|c| changes.get(c).map(|v| Self::single(c, v.clone())))
            .collect()
    }

    /// NULL never collides in SQL, so keys with a NULL part are skipped.
    fn is_checkable(&self) -> bool {
        self.columns.iter().all(|(_, v)| !v.is_null())
    }
}

pub fn build_probe<'a>(table: &str, key: &UniqueKey, exclude_id: Option<i32>) -> QueryBuilder<'a, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT id FROM {} WHERE ", table));
    for (i, (column, value)) in key.columns.iter().enumerate() {
        if i > 0 {
            qb.push(" AND ");
        }
        qb.push(format!("{} = ", column));
        match value {
            SqlValue::Text(v) => qb.push_bind(v.clone()),
            SqlValue::Int(v) => qb.push_bind(*v),
            SqlValue::Bool(v) => qb.push_bind(*v),
            SqlValue::Timestamp(v) => qb.push_bind(*v),
        };
    }
    if let Some(id) = exclude_id {
        qb.push(" AND id <> ").push_bind(id);
    }
    qb.push(" LIMIT 1");
    qb
}

/// Fails with `Conflict` naming the first key another row already holds.
///
/// `exclude_id` is the id of the row being updated, so a record never
/// conflicts with itself. This is a pre-check only; the table's unique
/// constraints still reject a racing duplicate at commit time.
pub async fn ensure_unique(
    conn: &mut PgConnection,
    table: &str,
    keys: &[UniqueKey],
    exclude_id: Option<i32>,
) -> Result<()> {
    for key in keys.iter().filter(|k| k.is_checkable()) {
        let mut qb = build_probe(table, key, exclude_id);
        let existing: Option<i32> = qb.build_query_scalar().fetch_optional(&mut *conn).await?;
        if let Some(other_id) = existing {
            tracing::warn!(table, field = key.field, other_id, "Uniqueness check failed");
            return Err(Error::Conflict(conflict_message(table, key.field)));
        }
    }
    Ok(())
}

fn conflict_message(table: &str, field: &str) -> String {
    format!("A record in {} with this {} already exists", table, field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn probe_excludes_own_row_on_update() {
        let key = UniqueKey::single("email", SqlValue::Text(Some("a@b.io".into())));
        let qb = build_probe("users", &key, Some(4));
        assert_eq!(qb.sql(), "SELECT id FROM users WHERE email = $1 AND id <> $2 LIMIT 1");

        let qb = build_probe("users", &key, None);
        assert_eq!(qb.sql(), "SELECT id FROM users WHERE email = $1 LIMIT 1");
    }

    #[test]
    fn pair_keys_match_both_columns() {
        let key = UniqueKey::pair(
            "course_id, candidate_id",
            ("course_id", SqlValue::Int(Some(1))),
            ("candidate_id", SqlValue::Int(Some(9))),
        );
        let qb = build_probe("enrollments", &key, None);
        assert_eq!(
            qb.sql(),
            "SELECT id FROM enrollments WHERE course_id = $1 AND candidate_id = $2 LIMIT 1"
        );
    }

    #[test]
    fn keys_come_only_from_written_columns() {
        let mut changes = Changeset::new();
        changes.value("mobile", "9000000001".to_string());
        changes.value("full_name", "Asha".to_string());
        let keys = UniqueKey::from_changes(&changes, &["email", "mobile"]);
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].field, "mobile");
    }

    #[test]
    fn null_keys_are_not_checked() {
        let key = UniqueKey::single("email", SqlValue::Text(None));
        assert!(!key.is_checkable());
        assert!(conflict_message("users", "email").contains("email"));
    }
}
