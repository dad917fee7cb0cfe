//! Dashboard statistics

use chrono::Utc;
use serde::Serialize;

use crate::{error::AppResult, repository::Repository};

/// Totals shown on the administrative dashboard
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total_books: i64,
    pub total_members: i64,
    pub total_categories: i64,
    pub active_loans: i64,
    pub overdue_loans: i64,
}

#[derive(Clone)]
pub struct StatsService {
    repository: Repository,
}

impl StatsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn dashboard(&self) -> AppResult<DashboardStats> {
        Ok(DashboardStats {
            total_books: self.repository.books.count().await?,
            total_members: self.repository.members.count().await?,
            total_categories: self.repository.categories.count().await?,
            active_loans: self.repository.records.count_active().await?,
            overdue_loans: self.repository.records.count_overdue(Utc::now()).await?,
        })
    }
}
