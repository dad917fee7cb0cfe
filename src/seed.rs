//! Database seeding: default administrator and demo data

use crate::{
    error::AppResult,
    models::book::CreateBook,
    models::category::{CategoryInput, CategoryQuery},
    models::member::{Member, RegisterMember},
    services::Services,
};

/// Create the default administrator account if it does not exist yet.
/// The password is meant to be changed on first login.
pub async fn ensure_default_admin(services: &Services) -> AppResult<Option<Member>> {
    if services.members.find_by_username("admin").await?.is_some() {
        return Ok(None);
    }

    match services
        .members
        .create_administrator(RegisterMember {
            username: "admin".to_string(),
            email: "admin@library.local".to_string(),
            full_name: "Administrator".to_string(),
            phone: None,
            address: None,
            password: "admin123".to_string(),
        })
        .await
    {
        Ok(admin) => {
            tracing::info!(member_id = admin.id, "default administrator created");
            Ok(Some(admin))
        }
        Err(crate::error::AppError::Conflict(_)) => Ok(None),
        Err(err) => Err(err),
    }
}

/// Populate an empty catalog with a handful of categories and books
pub async fn seed_demo_data(services: &Services) -> AppResult<()> {
    if !services.categories.list(&CategoryQuery::default()).await?.is_empty() {
        return Ok(());
    }

    let fiction = services
        .categories
        .create(CategoryInput {
            name: "Fiction".to_string(),
            description: Some("Novels and short stories".to_string()),
        })
        .await?;
    let science = services
        .categories
        .create(CategoryInput {
            name: "Science".to_string(),
            description: Some("Popular science and reference".to_string()),
        })
        .await?;

    let books = [
        ("The Left Hand of Darkness", "Ursula K. Le Guin", "978-0-441-47812-5", fiction.id),
        ("The Dispossessed", "Ursula K. Le Guin", "978-0-06-051275-5", fiction.id),
        ("A Brief History of Time", "Stephen Hawking", "978-0-553-38016-3", science.id),
    ];

    for (title, author, isbn, category_id) in books {
        services
            .catalog
            .create_book(CreateBook {
                title: title.to_string(),
                author: author.to_string(),
                isbn: isbn.to_string(),
                publisher: None,
                publication_date: None,
                quantity: 3,
                description: None,
                category_id,
            })
            .await?;
    }

    tracing::info!("demo data seeded");
    Ok(())
}
