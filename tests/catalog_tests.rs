//! Catalog administration tests

mod common;

use atheneum::error::AppError;
use atheneum::models::book::{Book, CreateBook, UpdateBook};

fn update_from(book: &Book) -> UpdateBook {
    UpdateBook {
        title: book.title.clone(),
        author: book.author.clone(),
        isbn: book.isbn.clone(),
        publisher: book.publisher.clone(),
        publication_date: book.publication_date,
        quantity: book.quantity,
        description: book.description.clone(),
        category_id: book.category_id,
    }
}

#[tokio::test]
async fn isbn_is_unique_across_the_catalog() {
    let (services, _pool) = common::setup().await;
    let cat = common::category(&services, "Fiction").await;
    common::book(&services, cat.id, "isbn-1", 1).await;

    let err = services
        .catalog
        .create_book(CreateBook {
            title: "Duplicate".to_string(),
            author: "Someone".to_string(),
            isbn: "isbn-1".to_string(),
            publisher: None,
            publication_date: None,
            quantity: 1,
            description: None,
            category_id: cat.id,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn creating_a_book_requires_an_existing_category() {
    let (services, _pool) = common::setup().await;

    let err = services
        .catalog
        .create_book(CreateBook {
            title: "Orphan".to_string(),
            author: "Someone".to_string(),
            isbn: "isbn-1".to_string(),
            publisher: None,
            publication_date: None,
            quantity: 1,
            description: None,
            category_id: 999,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn zero_quantity_is_rejected_by_validation() {
    let (services, _pool) = common::setup().await;
    let cat = common::category(&services, "Fiction").await;

    let err = services
        .catalog
        .create_book(CreateBook {
            title: "Empty shelf".to_string(),
            author: "Someone".to_string(),
            isbn: "isbn-1".to_string(),
            publisher: None,
            publication_date: None,
            quantity: 0,
            description: None,
            category_id: cat.id,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn quantity_edits_rederive_the_shelf_count() {
    let (services, pool) = common::setup().await;
    let cat = common::category(&services, "Fiction").await;
    let book = common::book(&services, cat.id, "isbn-1", 3).await;
    let member = common::patron(&services, "alice").await;

    services.lending.borrow(member.id, book.id).await.unwrap();

    let mut update = update_from(&book);
    update.quantity = 5;
    let updated = services.catalog.update_book(book.id, update).await.unwrap();

    assert_eq!(updated.quantity, 5);
    assert_eq!(updated.available, 4);
    common::assert_inventory_consistent(&pool, book.id).await;
}

#[tokio::test]
async fn quantity_cannot_drop_below_the_copies_on_loan() {
    let (services, _pool) = common::setup().await;
    let cat = common::category(&services, "Fiction").await;
    let book = common::book(&services, cat.id, "isbn-1", 3).await;
    let m1 = common::patron(&services, "m1").await;
    let m2 = common::patron(&services, "m2").await;

    services.lending.borrow(m1.id, book.id).await.unwrap();
    services.lending.borrow(m2.id, book.id).await.unwrap();

    let mut update = update_from(&book);
    update.quantity = 1;
    let err = services
        .catalog
        .update_book(book.id, update)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    // the rejected edit left the book untouched
    let kept = services.catalog.get_book(book.id).await.unwrap();
    assert_eq!(kept.quantity, 3);
    assert_eq!(kept.available, 1);
}

#[tokio::test]
async fn deleting_a_book_cascades_to_its_records() {
    let (services, pool) = common::setup().await;
    let cat = common::category(&services, "Fiction").await;
    let book = common::book(&services, cat.id, "isbn-1", 2).await;
    let member = common::patron(&services, "alice").await;

    let record = services.lending.borrow(member.id, book.id).await.unwrap();

    services.catalog.delete_book(book.id).await.unwrap();

    assert!(matches!(
        services.catalog.get_book(book.id).await.unwrap_err(),
        AppError::NotFound(_)
    ));
    assert!(matches!(
        services.lending.get_record(record.id).await.unwrap_err(),
        AppError::NotFound(_)
    ));

    let leftover: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM borrow_records")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(leftover, 0);
}

#[tokio::test]
async fn dashboard_totals_follow_the_catalog() {
    let (services, pool) = common::setup().await;
    let cat = common::category(&services, "Fiction").await;
    let b1 = common::book(&services, cat.id, "isbn-1", 1).await;
    let b2 = common::book(&services, cat.id, "isbn-2", 1).await;
    let member = common::patron(&services, "alice").await;

    let r1 = services.lending.borrow(member.id, b1.id).await.unwrap();
    services.lending.borrow(member.id, b2.id).await.unwrap();

    sqlx::query("UPDATE borrow_records SET due_at = ? WHERE id = ?")
        .bind(chrono::Utc::now() - chrono::Duration::days(1))
        .bind(r1.id)
        .execute(&pool)
        .await
        .unwrap();

    let stats = services.stats.dashboard().await.unwrap();
    assert_eq!(stats.total_books, 2);
    assert_eq!(stats.total_members, 1);
    assert_eq!(stats.total_categories, 1);
    assert_eq!(stats.active_loans, 2);
    assert_eq!(stats.overdue_loans, 1);
}
