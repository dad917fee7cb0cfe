//! Catalog administration for books

use validator::Validate;

use crate::{
    config::LendingConfig,
    error::{AppError, AppResult},
    models::book::{Book, BookQuery, CreateBook, UpdateBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    config: LendingConfig,
}

impl CatalogService {
    pub fn new(repository: Repository, config: LendingConfig) -> Self {
        Self { repository, config }
    }

    /// Get book by id
    pub async fn get_book(&self, id: i64) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    /// Add a book to the catalog; every copy starts available
    pub async fn create_book(&self, book: CreateBook) -> AppResult<Book> {
        book.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        // Category must exist up front; the FK would reject it anyway but
        // the caller gets a typed NotFound instead of a raw database error.
        self.repository.categories.get_by_id(book.category_id).await?;

        if self.repository.books.isbn_exists(&book.isbn, None).await? {
            return Err(AppError::Conflict("ISBN already exists".to_string()));
        }

        let created = self.repository.books.create(&book).await?;
        tracing::info!(book_id = created.id, isbn = %created.isbn, "book created");
        Ok(created)
    }

    /// Update a book. `available` is re-derived from the copies currently
    /// on loan; a quantity below that count is rejected.
    pub async fn update_book(&self, id: i64, book: UpdateBook) -> AppResult<Book> {
        book.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self.repository.books.isbn_exists(&book.isbn, Some(id)).await? {
            return Err(AppError::Conflict("ISBN already exists".to_string()));
        }

        let mut tx = self.repository.pool.begin().await?;

        self.repository.books.get_in_tx(&mut tx, id).await?;
        self.repository.categories.get_in_tx(&mut tx, book.category_id).await?;

        let on_loan = self
            .repository
            .records
            .active_count_for_book(&mut tx, id)
            .await?;
        if book.quantity < on_loan {
            return Err(AppError::Validation(format!(
                "quantity {} is below the {} copies currently on loan",
                book.quantity, on_loan
            )));
        }

        let available = book.quantity - on_loan;
        let updated = self
            .repository
            .books
            .update_in_tx(&mut tx, id, &book, available)
            .await?;

        tx.commit().await?;
        Ok(updated)
    }

    /// Hard-delete a book and every borrow record that references it
    pub async fn delete_book(&self, id: i64) -> AppResult<()> {
        let mut tx = self.repository.pool.begin().await?;

        let records = self.repository.records.delete_by_book(&mut tx, id).await?;
        self.repository.books.delete_in_tx(&mut tx, id).await?;

        tx.commit().await?;
        tracing::info!(book_id = id, cascaded_records = records, "book deleted");
        Ok(())
    }

    /// Search books with the caller's criteria
    pub async fn search_books(&self, query: &BookQuery) -> AppResult<(Vec<Book>, i64)> {
        let mut query = query.clone();
        query.page = Some(query.page.unwrap_or(1).max(1));
        query.per_page = Some(
            query
                .per_page
                .unwrap_or(self.config.default_page_size)
                .clamp(1, self.config.max_page_size),
        );
        self.repository.books.search(&query).await
    }
}
