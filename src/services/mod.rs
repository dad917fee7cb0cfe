//! Business logic services

pub mod catalog;
pub mod categories;
pub mod lending;
pub mod members;
pub mod stats;

use crate::{config::LendingConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub catalog: catalog::CatalogService,
    pub categories: categories::CategoriesService,
    pub members: members::MembersService,
    pub lending: lending::LendingService,
    pub stats: stats::StatsService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: LendingConfig) -> Self {
        Self {
            catalog: catalog::CatalogService::new(repository.clone(), config.clone()),
            categories: categories::CategoriesService::new(repository.clone()),
            members: members::MembersService::new(repository.clone(), config.clone()),
            lending: lending::LendingService::new(repository.clone(), config),
            stats: stats::StatsService::new(repository),
        }
    }
}
