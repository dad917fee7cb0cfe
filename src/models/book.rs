//! Book model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// Book model from database.
///
/// `quantity` is the total copies owned, `available` the copies currently on
/// the shelf. At all times `quantity - available` equals the number of
/// active borrow records for the book.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub publisher: Option<String>,
    pub publication_date: Option<NaiveDate>,
    pub quantity: i64,
    pub available: i64,
    pub description: Option<String>,
    pub category_id: i64,
    pub created_at: DateTime<Utc>,
}

impl Book {
    /// Copies currently out on loan
    pub fn on_loan(&self) -> i64 {
        self.quantity - self.available
    }
}

/// Create book request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 100))]
    pub author: String,
    #[validate(length(min = 1, max = 20))]
    pub isbn: String,
    pub publisher: Option<String>,
    pub publication_date: Option<NaiveDate>,
    #[validate(range(min = 1))]
    pub quantity: i64,
    pub description: Option<String>,
    pub category_id: i64,
}

/// Update book request. `quantity` edits re-derive `available`; dropping
/// the total below the copies currently on loan is rejected.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 100))]
    pub author: String,
    #[validate(length(min = 1, max = 20))]
    pub isbn: String,
    pub publisher: Option<String>,
    pub publication_date: Option<NaiveDate>,
    #[validate(range(min = 1))]
    pub quantity: i64,
    pub description: Option<String>,
    pub category_id: i64,
}

/// Search criteria for books
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookQuery {
    /// Substring matched against title, author, isbn and description
    pub search: Option<String>,
    pub category_id: Option<i64>,
    /// any | available | loaned
    pub status: Option<String>,
    /// Sort key from the allow-list; unknown keys sort by id
    pub sort: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}
