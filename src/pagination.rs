//! Count-plus-page query execution and pagination metadata.

use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, SqlitePool};

use crate::query::{Predicate, SqlArg};

/// Requested page coordinates. Page is 1-indexed; both fields are coerced to
/// a minimum of 1 so a zero or negative limit can never divide by zero.
#[derive(Debug, Clone, Copy)]
pub struct PageParams {
    pub page: i64,
    pub limit: i64,
}

impl PageParams {
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_items: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    /// `totalPages = ceil(total / limit)`, with zero total yielding zero
    /// pages rather than one empty page.
    pub fn compute(total: i64, params: &PageParams) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            (total + params.limit - 1) / params.limit
        };
        Self {
            current_page: params.page,
            total_pages,
            total_items: total,
            has_next: params.page < total_pages,
            has_prev: params.page > 1,
        }
    }
}

/// Run the count query and the page query for one filtered listing.
///
/// Both queries share the predicate's binds; the page query appends its
/// `LIMIT`/`OFFSET` binds after them, continuing the placeholder numbering.
/// The two queries have no ordering dependency and run concurrently.
pub async fn fetch_page<T>(
    pool: &SqlitePool,
    base_select: &str,
    count_from: &str,
    predicate: &Predicate,
    order_by: &str,
    params: &PageParams,
) -> anyhow::Result<(Vec<T>, Pagination)>
where
    T: for<'r> FromRow<'r, SqliteRow> + Send + Unpin,
{
    let where_clause = predicate.where_clause();
    let count_sql = format!("SELECT COUNT(*) {count_from} {where_clause}");
    let n = predicate.len();
    let page_sql = format!(
        "{base_select} {where_clause} {order_by} LIMIT ?{} OFFSET ?{}",
        n + 1,
        n + 2
    );

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    let mut page_query = sqlx::query_as::<_, T>(&page_sql);
    for arg in predicate.args() {
        match arg {
            SqlArg::Int(v) => {
                count_query = count_query.bind(*v);
                page_query = page_query.bind(*v);
            }
            SqlArg::Text(s) => {
                count_query = count_query.bind(s.as_str());
                page_query = page_query.bind(s.as_str());
            }
        }
    }
    let count_query = count_query.fetch_one(pool);
    let page_query = page_query
        .bind(params.limit)
        .bind(params.offset())
        .fetch_all(pool);

    let (total, rows) = tokio::join!(count_query, page_query);
    let total = total?;
    let rows = rows?;

    Ok((rows, Pagination::compute(total, params)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    #[test]
    fn zero_total_means_zero_pages() {
        let p = Pagination::compute(0, &PageParams::new(1, 10));
        assert_eq!(p.total_pages, 0);
        assert!(!p.has_next);
        assert!(!p.has_prev);
    }

    #[test]
    fn total_pages_is_ceiling() {
        let params = PageParams::new(1, 10);
        assert_eq!(Pagination::compute(1, &params).total_pages, 1);
        assert_eq!(Pagination::compute(10, &params).total_pages, 1);
        assert_eq!(Pagination::compute(11, &params).total_pages, 2);
        assert_eq!(Pagination::compute(25, &params).total_pages, 3);
        assert_eq!(Pagination::compute(100_000, &params).total_pages, 10_000);
    }

    #[test]
    fn has_next_and_has_prev_track_page_position() {
        let first = Pagination::compute(25, &PageParams::new(1, 10));
        assert!(first.has_next);
        assert!(!first.has_prev);

        let middle = Pagination::compute(25, &PageParams::new(2, 10));
        assert!(middle.has_next);
        assert!(middle.has_prev);

        let last = Pagination::compute(25, &PageParams::new(3, 10));
        assert!(!last.has_next);
        assert!(last.has_prev);

        let beyond = Pagination::compute(25, &PageParams::new(9, 10));
        assert!(!beyond.has_next);
        assert!(beyond.has_prev);
    }

    #[test]
    fn page_and_limit_are_coerced_to_minimum_one() {
        let params = PageParams::new(0, 0);
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, 1);
        assert_eq!(params.offset(), 0);

        let params = PageParams::new(-5, -3);
        assert_eq!(params.page, 1);
        assert_eq!(params.limit, 1);
    }

    #[derive(sqlx::FromRow)]
    struct NumberRow {
        n: i64,
    }

    #[tokio::test]
    async fn count_and_page_run_against_same_predicate() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::query("CREATE TABLE numbers (n INTEGER, parity TEXT)")
            .execute(&pool)
            .await
            .unwrap();
        for n in 1..=25 {
            sqlx::query("INSERT INTO numbers (n, parity) VALUES (?, ?)")
                .bind(n)
                .bind(if n % 2 == 0 { "even" } else { "odd" })
                .execute(&pool)
                .await
                .unwrap();
        }

        let mut predicate = crate::query::Predicate::new();
        predicate.equals_text("parity", Some("odd"));

        let (rows, pagination) = fetch_page::<NumberRow>(
            &pool,
            "SELECT n FROM numbers",
            "FROM numbers",
            &predicate,
            "ORDER BY n DESC",
            &PageParams::new(2, 5),
        )
        .await
        .unwrap();

        // 13 odd numbers in 1..=25; page 2 of 5 is 15, 13, 11, 9, 7
        assert_eq!(pagination.total_items, 13);
        assert_eq!(pagination.total_pages, 3);
        assert!(pagination.has_next);
        assert!(pagination.has_prev);
        let ns: Vec<i64> = rows.iter().map(|r| r.n).collect();
        assert_eq!(ns, vec![15, 13, 11, 9, 7]);
    }

    #[tokio::test]
    async fn page_beyond_last_returns_empty_rows() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::query("CREATE TABLE numbers (n INTEGER, parity TEXT)")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("INSERT INTO numbers (n, parity) VALUES (1, 'odd')")
            .execute(&pool)
            .await
            .unwrap();

        let predicate = crate::query::Predicate::new();
        let (rows, pagination) = fetch_page::<NumberRow>(
            &pool,
            "SELECT n FROM numbers",
            "FROM numbers",
            &predicate,
            "ORDER BY n",
            &PageParams::new(10, 10),
        )
        .await
        .unwrap();

        assert!(rows.is_empty());
        assert!(!pagination.has_next);
        assert!(pagination.has_prev);
    }
}
