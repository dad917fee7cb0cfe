//! Shared test fixtures

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;

use atheneum::config::LendingConfig;
use atheneum::models::book::{Book, CreateBook};
use atheneum::models::category::{Category, CategoryInput};
use atheneum::models::member::{Member, RegisterMember};
use atheneum::repository::Repository;
use atheneum::services::Services;

/// Fresh in-memory database with migrations applied. A single connection
/// keeps every test self-contained while still exercising the real store.
pub async fn setup() -> (Services, SqlitePool) {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("Failed to parse connect options")
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .expect("Failed to open in-memory database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let services = Services::new(Repository::new(pool.clone()), LendingConfig::default());
    (services, pool)
}

pub async fn category(services: &Services, name: &str) -> Category {
    services
        .categories
        .create(CategoryInput {
            name: name.to_string(),
            description: None,
        })
        .await
        .expect("Failed to create category")
}

pub async fn book(services: &Services, category_id: i64, isbn: &str, quantity: i64) -> Book {
    services
        .catalog
        .create_book(CreateBook {
            title: format!("Book {}", isbn),
            author: "Test Author".to_string(),
            isbn: isbn.to_string(),
            publisher: None,
            publication_date: None,
            quantity,
            description: None,
            category_id,
        })
        .await
        .expect("Failed to create book")
}

pub async fn patron(services: &Services, username: &str) -> Member {
    services
        .members
        .register(RegisterMember {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            full_name: format!("Patron {}", username),
            phone: None,
            address: None,
            password: "secret123".to_string(),
        })
        .await
        .expect("Failed to register patron")
}

pub async fn admin(services: &Services, username: &str) -> Member {
    services
        .members
        .create_administrator(RegisterMember {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            full_name: format!("Admin {}", username),
            phone: None,
            address: None,
            password: "secret123".to_string(),
        })
        .await
        .expect("Failed to create administrator")
}

/// Assert the book-level invariant: the copies missing from the shelf are
/// exactly the active borrow records.
pub async fn assert_inventory_consistent(pool: &SqlitePool, book_id: i64) {
    let (quantity, available): (i64, i64) =
        sqlx::query_as("SELECT quantity, available FROM books WHERE id = ?")
            .bind(book_id)
            .fetch_one(pool)
            .await
            .expect("Failed to fetch book counts");

    let active: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM borrow_records WHERE book_id = ? AND status = 'borrowed'",
    )
    .bind(book_id)
    .fetch_one(pool)
    .await
    .expect("Failed to count active records");

    assert!(available >= 0 && available <= quantity);
    assert_eq!(quantity - available, active);
}
