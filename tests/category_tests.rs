//! Category lifecycle tests

mod common;

use atheneum::error::AppError;
use atheneum::models::category::{CategoryInput, CategoryQuery};

#[tokio::test]
async fn strict_delete_refuses_a_populated_category() {
    let (services, _pool) = common::setup().await;
    let cat = common::category(&services, "Fiction").await;
    common::book(&services, cat.id, "isbn-1", 1).await;
    common::book(&services, cat.id, "isbn-2", 1).await;

    let err = services.categories.delete_strict(cat.id).await.unwrap_err();
    assert!(matches!(err, AppError::HasBooks(2)));

    // category and its books are untouched
    let kept = services.categories.get(cat.id).await.unwrap();
    assert_eq!(kept.name, "Fiction");
    let (books, total) = services
        .catalog
        .search_books(&atheneum::models::book::BookQuery {
            category_id: Some(cat.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(total, 2);
    assert!(books.iter().all(|b| b.category_id == cat.id));
}

#[tokio::test]
async fn strict_delete_removes_an_empty_category() {
    let (services, _pool) = common::setup().await;
    let cat = common::category(&services, "Empty").await;

    services.categories.delete_strict(cat.id).await.unwrap();

    assert!(matches!(
        services.categories.get(cat.id).await.unwrap_err(),
        AppError::NotFound(_)
    ));
}

#[tokio::test]
async fn delete_and_reassign_migrates_every_book_to_the_lowest_other_id() {
    let (services, _pool) = common::setup().await;
    let fallback = common::category(&services, "General").await;
    let doomed = common::category(&services, "Doomed").await;
    let later = common::category(&services, "Later").await;

    let b1 = common::book(&services, doomed.id, "isbn-1", 1).await;
    let b2 = common::book(&services, doomed.id, "isbn-2", 1).await;
    let b3 = common::book(&services, doomed.id, "isbn-3", 1).await;

    services.categories.delete_and_reassign(doomed.id).await.unwrap();

    assert!(matches!(
        services.categories.get(doomed.id).await.unwrap_err(),
        AppError::NotFound(_)
    ));

    // all three books moved to the lowest-id survivor, none to the later one
    for book_id in [b1.id, b2.id, b3.id] {
        let book = services.catalog.get_book(book_id).await.unwrap();
        assert_eq!(book.category_id, fallback.id);
        assert_ne!(book.category_id, later.id);
    }
}

#[tokio::test]
async fn delete_and_reassign_fails_without_a_fallback() {
    let (services, _pool) = common::setup().await;
    let only = common::category(&services, "Only").await;
    let book = common::book(&services, only.id, "isbn-1", 1).await;

    let err = services
        .categories
        .delete_and_reassign(only.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NoFallbackAvailable));

    // nothing was mutated
    services.categories.get(only.id).await.unwrap();
    let kept = services.catalog.get_book(book.id).await.unwrap();
    assert_eq!(kept.category_id, only.id);
}

#[tokio::test]
async fn deleting_a_missing_category_is_not_found() {
    let (services, _pool) = common::setup().await;
    common::category(&services, "Other").await;

    assert!(matches!(
        services.categories.delete_strict(999).await.unwrap_err(),
        AppError::NotFound(_)
    ));
    assert!(matches!(
        services.categories.delete_and_reassign(999).await.unwrap_err(),
        AppError::NotFound(_)
    ));
}

#[tokio::test]
async fn category_names_are_unique() {
    let (services, _pool) = common::setup().await;
    common::category(&services, "Fiction").await;

    let err = services
        .categories
        .create(CategoryInput {
            name: "Fiction".to_string(),
            description: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn category_listing_filters_by_search_term() {
    let (services, _pool) = common::setup().await;
    common::category(&services, "Science Fiction").await;
    common::category(&services, "History").await;

    let all = services
        .categories
        .list(&CategoryQuery::default())
        .await
        .unwrap();
    assert_eq!(all.len(), 2);

    let filtered = services
        .categories
        .list(&CategoryQuery {
            search: Some("fiction".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].name, "Science Fiction");
}
