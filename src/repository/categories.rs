//! Categories repository for database operations

use chrono::Utc;
use sqlx::{Pool, Sqlite, SqliteConnection};

use crate::{
    error::{AppError, AppResult},
    models::category::{Category, CategoryInput, CategoryQuery},
};

#[derive(Clone)]
pub struct CategoriesRepository {
    pool: Pool<Sqlite>,
}

impl CategoriesRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Get category by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Category> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category with id {} not found", id)))
    }

    /// Get category by ID inside a caller's transaction
    pub async fn get_in_tx(&self, conn: &mut SqliteConnection, id: i64) -> AppResult<Category> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Category with id {} not found", id)))
    }

    /// List all categories ordered by name
    pub async fn list(&self, query: &CategoryQuery) -> AppResult<Vec<Category>> {
        let categories = match query.search {
            Some(ref term) if !term.trim().is_empty() => {
                let pattern = format!("%{}%", term.trim().to_lowercase());
                sqlx::query_as::<_, Category>(
                    r#"
                    SELECT * FROM categories
                    WHERE LOWER(name) LIKE ? OR LOWER(COALESCE(description, '')) LIKE ?
                    ORDER BY name
                    "#,
                )
                .bind(&pattern)
                .bind(&pattern)
                .fetch_all(&self.pool)
                .await?
            }
            _ => {
                sqlx::query_as::<_, Category>("SELECT * FROM categories ORDER BY name")
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(categories)
    }

    /// Check whether a category name is taken, optionally ignoring one row
    pub async fn name_exists(&self, name: &str, exclude_id: Option<i64>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE name = ? AND id != ?)",
        )
        .bind(name)
        .bind(exclude_id.unwrap_or(0))
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Create a new category
    pub async fn create(&self, input: &CategoryInput) -> AppResult<Category> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (name, description, created_at)
            VALUES (?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(category)
    }

    /// Update name/description of an existing category
    pub async fn update(&self, id: i64, input: &CategoryInput) -> AppResult<Category> {
        sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories SET name = ?, description = ?
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Category with id {} not found", id)))
    }

    /// Number of books referencing the category
    pub async fn books_count(&self, conn: &mut SqliteConnection, id: i64) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE category_id = ?")
            .bind(id)
            .fetch_one(&mut *conn)
            .await?;
        Ok(count)
    }

    /// Pick the fallback for a deletion: the lowest-id category other than
    /// the one being deleted. Deterministic so migrations are testable.
    pub async fn pick_fallback(
        &self,
        conn: &mut SqliteConnection,
        excluding: i64,
    ) -> AppResult<Option<i64>> {
        let fallback: Option<i64> =
            sqlx::query_scalar("SELECT id FROM categories WHERE id != ? ORDER BY id LIMIT 1")
                .bind(excluding)
                .fetch_optional(&mut *conn)
                .await?;
        Ok(fallback)
    }

    /// Delete the category row; returns the number of rows removed
    pub async fn delete_row(&self, conn: &mut SqliteConnection, id: i64) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }

    /// Count all categories
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
