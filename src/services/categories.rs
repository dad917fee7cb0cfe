//! Category lifecycle management.
//!
//! Deletion comes in two deliberately separate operations: `delete_strict`
//! refuses to touch a populated category, `delete_and_reassign` migrates the
//! books to a fallback first. They are distinct calls, not flags, so a
//! caller can never reassign by accident.

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::category::{Category, CategoryInput, CategoryQuery},
    repository::Repository,
};

#[derive(Clone)]
pub struct CategoriesService {
    repository: Repository,
}

impl CategoriesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Get category by id
    pub async fn get(&self, id: i64) -> AppResult<Category> {
        self.repository.categories.get_by_id(id).await
    }

    /// List categories, optionally filtered by a search term
    pub async fn list(&self, query: &CategoryQuery) -> AppResult<Vec<Category>> {
        self.repository.categories.list(query).await
    }

    /// Create a new category
    pub async fn create(&self, input: CategoryInput) -> AppResult<Category> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self.repository.categories.name_exists(&input.name, None).await? {
            return Err(AppError::Conflict("Category name already exists".to_string()));
        }

        self.repository.categories.create(&input).await
    }

    /// Update an existing category
    pub async fn update(&self, id: i64, input: CategoryInput) -> AppResult<Category> {
        input
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self
            .repository
            .categories
            .name_exists(&input.name, Some(id))
            .await?
        {
            return Err(AppError::Conflict("Category name already exists".to_string()));
        }

        self.repository.categories.update(id, &input).await
    }

    /// Delete a category only if no book references it; a populated
    /// category is reported as `HasBooks` with the offending count.
    pub async fn delete_strict(&self, id: i64) -> AppResult<()> {
        let mut tx = self.repository.pool.begin().await?;

        self.repository.categories.get_in_tx(&mut tx, id).await?;

        let owned = self.repository.categories.books_count(&mut tx, id).await?;
        if owned > 0 {
            return Err(AppError::HasBooks(owned));
        }

        self.repository.categories.delete_row(&mut tx, id).await?;
        tx.commit().await?;
        tracing::info!(category_id = id, "category deleted");
        Ok(())
    }

    /// Delete a category after re-pointing every owned book to the fallback
    /// (the lowest-id other category). Reassignment and deletion commit as
    /// one unit; a book can never be left referencing a dead category.
    pub async fn delete_and_reassign(&self, id: i64) -> AppResult<()> {
        let mut tx = self.repository.pool.begin().await?;

        // NotFound before fallback selection: a missing category is not a
        // missing fallback.
        self.repository.categories.get_in_tx(&mut tx, id).await?;

        let fallback = self
            .repository
            .categories
            .pick_fallback(&mut tx, id)
            .await?
            .ok_or(AppError::NoFallbackAvailable)?;

        let moved = self
            .repository
            .books
            .reassign_category(&mut tx, id, fallback)
            .await?;

        self.repository.categories.delete_row(&mut tx, id).await?;
        tx.commit().await?;
        tracing::info!(
            category_id = id,
            fallback_id = fallback,
            moved,
            "category deleted, books reassigned"
        );
        Ok(())
    }
}
