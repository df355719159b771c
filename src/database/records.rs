use chrono::{DateTime, Utc};
use sqlx::{postgres::PgRow, FromRow, PgConnection, PgPool};

use crate::dto::stats_dto::Breakdown;
use crate::error::Result;

pub async fn find_by_id<T>(conn: &mut PgConnection, table: &str, id: i32) -> Result<Option<T>>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let row = sqlx::query_as::<_, T>(&format!("SELECT * FROM {} WHERE id = $1", table))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

/// Row lock for read-modify-write inside a transaction.
pub async fn find_for_update<T>(conn: &mut PgConnection, table: &str, id: i32) -> Result<Option<T>>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let row = sqlx::query_as::<_, T>(&format!("SELECT * FROM {} WHERE id = $1 FOR UPDATE", table))
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row)
}

pub async fn exists(conn: &mut PgConnection, table: &str, id: i32) -> Result<bool> {
    let found: bool = sqlx::query_scalar(&format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)", table))
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(found)
}

/// Returns whether a row was removed.
pub async fn delete_by_id(conn: &mut PgConnection, table: &str, id: i32) -> Result<bool> {
    let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", table))
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn count_all(pool: &PgPool, table: &str) -> Result<i64> {
    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
        .fetch_one(pool)
        .await?;
    Ok(total)
}

pub async fn count_since(pool: &PgPool, table: &str, column: &str, since: DateTime<Utc>) -> Result<i64> {
    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {} WHERE {} >= $1", table, column))
        .bind(since)
        .fetch_one(pool)
        .await?;
    Ok(total)
}

/// Counts rows per value of `column`, reporting zero for allowed values with no rows.
pub async fn breakdown(pool: &PgPool, table: &str, column: &str, allowed: &[&str]) -> Result<Breakdown> {
    let rows: Vec<(String, i64)> = sqlx::query_as(&format!(
        "SELECT {col}::TEXT, COUNT(*) FROM {table} WHERE {col} IS NOT NULL GROUP BY {col}",
        col = column,
        table = table
    ))
    .fetch_all(pool)
    .await?;
    Ok(fill_breakdown(rows, allowed))
}

pub fn fill_breakdown(rows: Vec<(String, i64)>, allowed: &[&str]) -> Breakdown {
    let mut counts: Breakdown = allowed.iter().map(|v| (v.to_string(), 0)).collect();
    for (value, count) in rows {
        *counts.entry(value).or_insert(0) += count;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn breakdown_reports_every_allowed_value() {
        let counts = fill_breakdown(vec![("high".into(), 4)], &["low", "medium", "high"]);
        assert_eq!(counts.len(), 3);
        assert_eq!(counts["high"], 4);
        assert_eq!(counts["low"], 0);
    }

    #[test]
    fn breakdown_keeps_unexpected_values() {
        let counts = fill_breakdown(vec![("2021".into(), 2), ("2022".into(), 1)], &[]);
        assert_eq!(counts["2021"], 2);
        assert_eq!(counts.len(), 2);
    }
}
