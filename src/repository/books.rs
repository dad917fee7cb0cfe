//! Books repository: catalog rows plus the inventory accessor.
//!
//! `reserve` and `release` are single guarded UPDATE statements so that the
//! check and the count change happen in one step; two concurrent
//! reservations for the last copy can never both win.

use chrono::Utc;
use sqlx::{Pool, QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookQuery, CreateBook, UpdateBook},
    models::enums::{BookSortKey, BookStatusFilter},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Sqlite>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // READ
    // =========================================================================

    /// Get book by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Get book by ID inside a caller's transaction
    pub async fn get_in_tx(&self, conn: &mut SqliteConnection, id: i64) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Check whether an ISBN is taken, optionally ignoring one row
    pub async fn isbn_exists(&self, isbn: &str, exclude_id: Option<i64>) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE isbn = ? AND id != ?)")
                .bind(isbn)
                .bind(exclude_id.unwrap_or(0))
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn exists(conn: &mut SqliteConnection, id: i64) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM books WHERE id = ?)")
            .bind(id)
            .fetch_one(&mut *conn)
            .await?;
        Ok(exists)
    }

    // =========================================================================
    // WRITE
    // =========================================================================

    /// Create a new book; every copy starts on the shelf
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books
                (title, author, isbn, publisher, publication_date,
                 quantity, available, description, category_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(&book.publisher)
        .bind(book.publication_date)
        .bind(book.quantity)
        .bind(book.quantity)
        .bind(&book.description)
        .bind(book.category_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// Update a book inside a caller's transaction. `available` is the
    /// re-derived shelf count the caller computed from the active loans.
    pub async fn update_in_tx(
        &self,
        conn: &mut SqliteConnection,
        id: i64,
        book: &UpdateBook,
        available: i64,
    ) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books SET
                title = ?, author = ?, isbn = ?, publisher = ?,
                publication_date = ?, quantity = ?, available = ?,
                description = ?, category_id = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(&book.publisher)
        .bind(book.publication_date)
        .bind(book.quantity)
        .bind(available)
        .bind(&book.description)
        .bind(book.category_id)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Book with id {} not found", id)))
    }

    /// Re-point every book of one category to another; returns how many moved
    pub async fn reassign_category(
        &self,
        conn: &mut SqliteConnection,
        from: i64,
        to: i64,
    ) -> AppResult<u64> {
        let result = sqlx::query("UPDATE books SET category_id = ? WHERE category_id = ?")
            .bind(to)
            .bind(from)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete the book row inside a caller's transaction
    pub async fn delete_in_tx(&self, conn: &mut SqliteConnection, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }

    // =========================================================================
    // INVENTORY
    // =========================================================================

    /// Take one copy off the shelf. The availability check and the decrement
    /// are one statement; losing the race surfaces as `OutOfStock`.
    pub async fn reserve(&self, conn: &mut SqliteConnection, id: i64) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE books SET available = available - 1 WHERE id = ? AND available > 0")
                .bind(id)
                .execute(&mut *conn)
                .await?;

        if result.rows_affected() == 0 {
            if Self::exists(conn, id).await? {
                return Err(AppError::OutOfStock);
            }
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }

    /// Put one copy back on the shelf. A release that would push `available`
    /// above `quantity` means the loan accounting is broken; it is rejected
    /// as `InventoryCorruption`, never clamped.
    pub async fn release(&self, conn: &mut SqliteConnection, id: i64) -> AppResult<()> {
        let result = sqlx::query(
            "UPDATE books SET available = available + 1 WHERE id = ? AND available < quantity",
        )
        .bind(id)
        .execute(&mut *conn)
        .await?;

        if result.rows_affected() == 0 {
            if Self::exists(conn, id).await? {
                return Err(AppError::inventory_corruption(format!(
                    "release would push book {} above its total quantity",
                    id
                )));
            }
            return Err(AppError::NotFound(format!("Book with id {} not found", id)));
        }
        Ok(())
    }

    // =========================================================================
    // SEARCH
    // =========================================================================

    fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, query: &BookQuery) {
        if let Some(ref term) = query.search {
            let term = term.trim();
            if !term.is_empty() {
                let pattern = format!("%{}%", term.to_lowercase());
                qb.push(" AND (LOWER(title) LIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR LOWER(author) LIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR LOWER(isbn) LIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR LOWER(COALESCE(description, '')) LIKE ")
                    .push_bind(pattern)
                    .push(")");
            }
        }

        if let Some(category_id) = query.category_id {
            qb.push(" AND category_id = ").push_bind(category_id);
        }

        let status = query
            .status
            .as_deref()
            .map(BookStatusFilter::from)
            .unwrap_or_default();
        match status {
            BookStatusFilter::Any => {}
            BookStatusFilter::Available => {
                qb.push(" AND available > 0");
            }
            BookStatusFilter::Loaned => {
                qb.push(" AND available < quantity");
            }
        }
    }

    /// Search books with pagination; returns the page plus the total count
    pub async fn search(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(10).max(1);
        let offset = (page - 1) * per_page;

        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM books WHERE 1=1");
        Self::push_filters(&mut count_qb, query);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let sort = query
            .sort
            .as_deref()
            .map(BookSortKey::from)
            .unwrap_or_default();

        let mut qb = QueryBuilder::new("SELECT * FROM books WHERE 1=1");
        Self::push_filters(&mut qb, query);
        qb.push(" ORDER BY ")
            .push(sort.order_clause())
            .push(" LIMIT ")
            .push_bind(per_page)
            .push(" OFFSET ")
            .push_bind(offset);

        let books = qb
            .build_query_as::<Book>()
            .fetch_all(&self.pool)
            .await?;

        Ok((books, total))
    }

    /// Count all books
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
