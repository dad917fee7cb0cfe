//! Repository layer for database operations
//!
//! Single-statement reads go through the pool; anything that must compose
//! into a caller's transaction takes `&mut SqliteConnection` so the service
//! layer owns the commit boundary.

pub mod books;
pub mod categories;
pub mod members;
pub mod records;

use sqlx::{Pool, Sqlite};

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Sqlite>,
    pub categories: categories::CategoriesRepository,
    pub books: books::BooksRepository,
    pub members: members::MembersRepository,
    pub records: records::RecordsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self {
            categories: categories::CategoriesRepository::new(pool.clone()),
            books: books::BooksRepository::new(pool.clone()),
            members: members::MembersRepository::new(pool.clone()),
            records: records::RecordsRepository::new(pool.clone()),
            pool,
        }
    }
}
