//! Borrow records repository for database operations

use chrono::{DateTime, Utc};
use sqlx::{Pool, QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    error::{AppError, AppResult},
    models::enums::{RecordSortKey, RecordStatusFilter},
    models::record::{BorrowRecord, RecordDetails, RecordQuery},
};

#[derive(Clone)]
pub struct RecordsRepository {
    pool: Pool<Sqlite>,
}

impl RecordsRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Get record by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<BorrowRecord> {
        sqlx::query_as::<_, BorrowRecord>("SELECT * FROM borrow_records WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Borrow record with id {} not found", id)))
    }

    /// Get record by ID inside a caller's transaction
    pub async fn get_in_tx(&self, conn: &mut SqliteConnection, id: i64) -> AppResult<BorrowRecord> {
        sqlx::query_as::<_, BorrowRecord>("SELECT * FROM borrow_records WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Borrow record with id {} not found", id)))
    }

    /// Does the member already hold an active loan for this book?
    pub async fn active_exists(
        &self,
        conn: &mut SqliteConnection,
        member_id: i64,
        book_id: i64,
    ) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM borrow_records
                WHERE member_id = ? AND book_id = ? AND status = 'borrowed'
            )
            "#,
        )
        .bind(member_id)
        .bind(book_id)
        .fetch_one(&mut *conn)
        .await?;
        Ok(exists)
    }

    /// Insert a new active record inside a caller's transaction
    pub async fn insert(
        &self,
        conn: &mut SqliteConnection,
        member_id: i64,
        book_id: i64,
        borrowed_at: DateTime<Utc>,
        due_at: DateTime<Utc>,
    ) -> AppResult<BorrowRecord> {
        let record = sqlx::query_as::<_, BorrowRecord>(
            r#"
            INSERT INTO borrow_records (member_id, book_id, borrowed_at, due_at, status)
            VALUES (?, ?, ?, ?, 'borrowed')
            RETURNING *
            "#,
        )
        .bind(member_id)
        .bind(book_id)
        .bind(borrowed_at)
        .bind(due_at)
        .fetch_one(&mut *conn)
        .await?;
        Ok(record)
    }

    /// Transition an active record to returned. Guarded on the current
    /// status so a concurrent second return affects zero rows.
    pub async fn mark_returned(
        &self,
        conn: &mut SqliteConnection,
        id: i64,
        returned_at: DateTime<Utc>,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE borrow_records SET returned_at = ?, status = 'returned'
            WHERE id = ? AND status = 'borrowed'
            "#,
        )
        .bind(returned_at)
        .bind(id)
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Book ids of the member's active loans (one entry per record)
    pub async fn active_book_ids_for_member(
        &self,
        conn: &mut SqliteConnection,
        member_id: i64,
    ) -> AppResult<Vec<i64>> {
        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT book_id FROM borrow_records WHERE member_id = ? AND status = 'borrowed'",
        )
        .bind(member_id)
        .fetch_all(&mut *conn)
        .await?;
        Ok(ids)
    }

    /// Active loans for one book, inside a caller's transaction
    pub async fn active_count_for_book(
        &self,
        conn: &mut SqliteConnection,
        book_id: i64,
    ) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM borrow_records WHERE book_id = ? AND status = 'borrowed'",
        )
        .bind(book_id)
        .fetch_one(&mut *conn)
        .await?;
        Ok(count)
    }

    /// Hard-delete all records of a member (administrative cascade)
    pub async fn delete_by_member(
        &self,
        conn: &mut SqliteConnection,
        member_id: i64,
    ) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM borrow_records WHERE member_id = ?")
            .bind(member_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }

    /// Hard-delete all records of a book (administrative cascade)
    pub async fn delete_by_book(
        &self,
        conn: &mut SqliteConnection,
        book_id: i64,
    ) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM borrow_records WHERE book_id = ?")
            .bind(book_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }

    // =========================================================================
    // COUNTS
    // =========================================================================

    /// Count a member's active loans
    pub async fn count_active_for_member(&self, member_id: i64) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM borrow_records WHERE member_id = ? AND status = 'borrowed'",
        )
        .bind(member_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Count a member's overdue loans
    pub async fn count_overdue_for_member(
        &self,
        member_id: i64,
        now: DateTime<Utc>,
    ) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM borrow_records
            WHERE member_id = ? AND status = 'borrowed' AND due_at < ?
            "#,
        )
        .bind(member_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Count active loans
    pub async fn count_active(&self) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM borrow_records WHERE status = 'borrowed'")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Count overdue loans
    pub async fn count_overdue(&self, now: DateTime<Utc>) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM borrow_records WHERE status = 'borrowed' AND due_at < ?",
        )
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    // =========================================================================
    // SEARCH
    // =========================================================================

    fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, query: &RecordQuery, now: DateTime<Utc>) {
        if let Some(ref term) = query.search {
            let term = term.trim();
            if !term.is_empty() {
                let pattern = format!("%{}%", term.to_lowercase());
                qb.push(" AND (LOWER(b.title) LIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR LOWER(b.author) LIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR LOWER(b.isbn) LIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR LOWER(m.username) LIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR LOWER(m.full_name) LIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR LOWER(m.email) LIKE ")
                    .push_bind(pattern)
                    .push(")");
            }
        }

        if let Some(member_id) = query.member_id {
            qb.push(" AND r.member_id = ").push_bind(member_id);
        }

        if let Some(book_id) = query.book_id {
            qb.push(" AND r.book_id = ").push_bind(book_id);
        }

        let status = query
            .status
            .as_deref()
            .map(RecordStatusFilter::from)
            .unwrap_or_default();
        match status {
            RecordStatusFilter::Any => {}
            RecordStatusFilter::Borrowed => {
                qb.push(" AND r.status = 'borrowed'");
            }
            RecordStatusFilter::Returned => {
                qb.push(" AND r.status = 'returned'");
            }
            RecordStatusFilter::Overdue => {
                qb.push(" AND r.status = 'borrowed' AND r.due_at < ")
                    .push_bind(now);
            }
        }

        // Half-open range over borrowed_at: lower inclusive, upper exclusive
        if let Some(from) = query.range.from {
            qb.push(" AND r.borrowed_at >= ").push_bind(from);
        }
        if let Some(until) = query.range.until {
            qb.push(" AND r.borrowed_at < ").push_bind(until);
        }
    }

    /// Search records with pagination; returns the page plus the total count
    pub async fn search(&self, query: &RecordQuery) -> AppResult<(Vec<RecordDetails>, i64)> {
        query.range.validate()?;

        let now = Utc::now();
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(10).max(1);
        let offset = (page - 1) * per_page;

        let mut count_qb = QueryBuilder::new(
            r#"
            SELECT COUNT(*)
            FROM borrow_records r
            JOIN books b ON b.id = r.book_id
            JOIN members m ON m.id = r.member_id
            WHERE 1=1
            "#,
        );
        Self::push_filters(&mut count_qb, query, now);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let sort = query
            .sort
            .as_deref()
            .map(RecordSortKey::from)
            .unwrap_or_default();

        let mut qb = QueryBuilder::new(
            r#"
            SELECT r.id, r.member_id, r.book_id, r.borrowed_at, r.due_at,
                   r.returned_at, r.status,
                   b.title AS book_title, b.isbn AS book_isbn,
                   m.username AS member_username,
                   (r.status = 'borrowed' AND r.due_at < "#,
        );
        qb.push_bind(now).push(
            r#") AS is_overdue
            FROM borrow_records r
            JOIN books b ON b.id = r.book_id
            JOIN members m ON m.id = r.member_id
            WHERE 1=1
            "#,
        );
        Self::push_filters(&mut qb, query, now);
        qb.push(" ORDER BY ")
            .push(sort.order_clause())
            .push(" LIMIT ")
            .push_bind(per_page)
            .push(" OFFSET ")
            .push_bind(offset);

        let records = qb
            .build_query_as::<RecordDetails>()
            .fetch_all(&self.pool)
            .await?;

        Ok((records, total))
    }
}
