use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow, PgPool, Postgres, QueryBuilder};

use crate::error::Result;

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;
pub const MAX_SKIP: i64 = i32::MAX as i64;

/// A single list predicate. All predicates of a query are ANDed.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    TextEq(&'static str, String),
    IntEq(&'static str, i32),
    BoolEq(&'static str, bool),
    /// Case-insensitive substring match; the term may hit any of the columns.
    Search(&'static [&'static str], String),
    /// Inclusive numeric range; either bound may be open.
    Range(&'static str, Option<i32>, Option<i32>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct PageParams {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl PageParams {
    pub fn resolve(&self) -> (i64, i64) {
        let skip = self.skip.unwrap_or(0).clamp(0, MAX_SKIP);
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        (skip, limit)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub filters: Vec<Filter>,
    pub skip: i64,
    pub limit: i64,
}

impl ListQuery {
    pub fn new(page: PageParams) -> Self {
        let (skip, limit) = page.resolve();
        Self {
            filters: Vec::new(),
            skip,
            limit,
        }
    }

    pub fn text_eq(mut self, column: &'static str, value: Option<String>) -> Self {
        if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
            self.filters.push(Filter::TextEq(column, v));
        }
        self
    }

    pub fn int_eq(mut self, column: &'static str, value: Option<i32>) -> Self {
        if let Some(v) = value {
            self.filters.push(Filter::IntEq(column, v));
        }
        self
    }

    pub fn bool_eq(mut self, column: &'static str, value: Option<bool>) -> Self {
        if let Some(v) = value {
            self.filters.push(Filter::BoolEq(column, v));
        }
        self
    }

    pub fn search(mut self, columns: &'static [&'static str], term: Option<String>) -> Self {
        if let Some(t) = term.filter(|t| !t.trim().is_empty()) {
            self.filters.push(Filter::Search(columns, t.trim().to_string()));
        }
        self
    }

    pub fn range(mut self, column: &'static str, min: Option<i32>, max: Option<i32>) -> Self {
        if min.is_some() || max.is_some() {
            self.filters.push(Filter::Range(column, min, max));
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub skip: i64,
    pub limit: i64,
    pub total: i64,
    pub current_page: i64,
    pub total_pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
    pub showing_from: i64,
    pub showing_to: i64,
}

impl PageMeta {
    pub fn new(skip: i64, limit: i64, total: i64, returned: i64) -> Self {
        let limit = limit.max(1);
        let end = skip.saturating_add(returned);
        let total_pages = total.saturating_add(limit - 1) / limit;
        let showing_to = end.min(total);
        Self {
            skip,
            limit,
            total,
            current_page: skip / limit + 1,
            total_pages,
            has_next: end < total,
            has_prev: skip > 0,
            showing_from: if total == 0 { 0 } else { skip.saturating_add(1) },
            showing_to,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub data: Vec<T>,
    pub pagination: PageMeta,
}

impl<T> ListResponse<T> {
    pub fn try_from_page<R>(page: Page<R>, convert: impl Fn(R) -> Result<T>) -> Result<Self> {
        let data = page.items.into_iter().map(convert).collect::<Result<Vec<_>>>()?;
        Ok(Self {
            data,
            pagination: page.meta,
        })
    }
}

pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

/// Escapes LIKE wildcards so user input only ever matches literally.
pub fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

pub fn push_where(qb: &mut QueryBuilder<'_, Postgres>, filters: &[Filter]) {
    for (i, filter) in filters.iter().enumerate() {
        qb.push(if i == 0 { " WHERE " } else { " AND " });
        match filter {
            Filter::TextEq(column, value) => {
                qb.push(format!("{} = ", column)).push_bind(value.clone());
            }
            Filter::IntEq(column, value) => {
                qb.push(format!("{} = ", column)).push_bind(*value);
            }
            Filter::BoolEq(column, value) => {
                qb.push(format!("{} = ", column)).push_bind(*value);
            }
            Filter::Search(columns, term) => {
                let pattern = like_pattern(term);
                qb.push("(");
                for (j, column) in columns.iter().enumerate() {
                    if j > 0 {
                        qb.push(" OR ");
                    }
                    qb.push(format!("{} ILIKE ", column))
                        .push_bind(pattern.clone());
                }
                qb.push(")");
            }
            Filter::Range(column, min, max) => {
                qb.push("(TRUE");
                if let Some(min) = min {
                    qb.push(format!(" AND {} >= ", column)).push_bind(*min);
                }
                if let Some(max) = max {
                    qb.push(format!(" AND {} <= ", column)).push_bind(*max);
                }
                qb.push(")");
            }
        }
    }
}

pub async fn fetch_page<T>(
    pool: &PgPool,
    table: &str,
    order_by: &str,
    query: &ListQuery,
) -> Result<Page<T>>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let mut count_qb = QueryBuilder::<Postgres>::new(format!("SELECT COUNT(*) FROM {}", table));
    push_where(&mut count_qb, &query.filters);
    let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

    let mut items_qb = QueryBuilder::<Postgres>::new(format!("SELECT * FROM {}", table));
    push_where(&mut items_qb, &query.filters);
    items_qb
        .push(format!(" ORDER BY {} LIMIT ", order_by))
        .push_bind(query.limit)
        .push(" OFFSET ")
        .push_bind(query.skip);
    let items = items_qb.build_query_as::<T>().fetch_all(pool).await?;

    let meta = PageMeta::new(query.skip, query.limit, total, items.len() as i64);
    Ok(Page { items, meta })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_meta_for_last_partial_page() {
        let meta = PageMeta::new(40, 20, 57, 17);
        assert_eq!(meta.current_page, 3);
        assert_eq!(meta.total_pages, 3);
        assert_eq!(meta.showing_from, 41);
        assert_eq!(meta.showing_to, 57);
        assert!(!meta.has_next);
        assert!(meta.has_prev);
    }

    #[test]
    fn page_meta_for_empty_table() {
        let meta = PageMeta::new(0, 20, 0, 0);
        assert_eq!(meta.current_page, 1);
        assert_eq!(meta.total_pages, 0);
        assert_eq!(meta.showing_from, 0);
        assert_eq!(meta.showing_to, 0);
        assert!(!meta.has_next);
        assert!(!meta.has_prev);
    }

    #[test]
    fn page_meta_skip_beyond_total() {
        let meta = PageMeta::new(100, 20, 57, 0);
        assert_eq!(meta.current_page, 6);
        assert_eq!(meta.showing_from, 101);
        assert_eq!(meta.showing_to, 57);
    }

    #[test]
    fn page_params_are_clamped() {
        assert_eq!(PageParams::default().resolve(), (0, DEFAULT_LIMIT));
        let params = PageParams {
            skip: Some(-5),
            limit: Some(10_000),
        };
        assert_eq!(params.resolve(), (0, MAX_LIMIT));
        let params = PageParams {
            skip: Some(3),
            limit: Some(0),
        };
        assert_eq!(params.resolve(), (3, 1));
    }

    #[test]
    fn huge_skip_is_bounded() {
        let params = PageParams {
            skip: Some(i64::MAX),
            limit: None,
        };
        assert_eq!(params.resolve(), (MAX_SKIP, DEFAULT_LIMIT));

        let meta = PageMeta::new(i64::MAX, 20, 5, 0);
        assert_eq!(meta.showing_from, i64::MAX);
        assert_eq!(meta.showing_to, 5);
        assert!(!meta.has_next);
        assert!(meta.has_prev);
    }

    #[test]
    fn filters_are_anded_and_search_is_ored() {
        let query = ListQuery::new(PageParams::default())
            .text_eq("status", Some("active".into()))
            .search(&["job_title", "company_name"], Some("rust".into()))
            .range("salary_min", Some(1000), None)
            .text_eq("city", Some("  ".into()))
            .int_eq("job_id", None);
        assert_eq!(query.filters.len(), 3);

        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM jobs");
        push_where(&mut qb, &query.filters);
        assert_eq!(
            qb.sql(),
            "SELECT * FROM jobs WHERE status = $1 AND (job_title ILIKE $2 OR company_name ILIKE $3) AND (TRUE AND salary_min >= $4)"
        );
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("Rust"), "%Rust%");
    }
}
