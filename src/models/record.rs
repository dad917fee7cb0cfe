//! Borrow record model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::enums::RecordStatus;
use crate::error::{AppError, AppResult};

/// Borrow record from database. Immutable once created except for the
/// return transition (`returned_at` + `status`).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct BorrowRecord {
    pub id: i64,
    pub member_id: i64,
    pub book_id: i64,
    pub borrowed_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub status: RecordStatus,
}

impl BorrowRecord {
    /// Derived predicate: still out and past due. Never stored.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status == RecordStatus::Borrowed && now > self.due_at
    }
}

/// Borrow record with joined display fields
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecordDetails {
    pub id: i64,
    pub member_id: i64,
    pub book_id: i64,
    pub borrowed_at: DateTime<Utc>,
    pub due_at: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub status: RecordStatus,
    pub book_title: String,
    pub book_isbn: String,
    pub member_username: String,
    pub is_overdue: bool,
}

/// Half-open date range over `borrowed_at`: lower bound inclusive,
/// upper bound exclusive.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct DateRange {
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn validate(&self) -> AppResult<()> {
        if let (Some(from), Some(until)) = (self.from, self.until) {
            if from > until {
                return Err(AppError::InvalidRange(format!(
                    "lower bound {} is after upper bound {}",
                    from, until
                )));
            }
        }
        Ok(())
    }
}

/// Search criteria for borrow records
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordQuery {
    /// Substring matched against book title/author/isbn and member
    /// username/full name/email
    pub search: Option<String>,
    pub member_id: Option<i64>,
    pub book_id: Option<i64>,
    /// any | borrowed | returned | overdue
    pub status: Option<String>,
    #[serde(default)]
    pub range: DateRange,
    /// Sort key from the allow-list; unknown keys sort by id
    pub sort: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Outcome of a best-effort batch return. Successful sub-operations commit
/// even when others fail; one failure never obscures the rest.
#[derive(Debug, Default)]
pub struct BatchReturnReport {
    pub succeeded: Vec<i64>,
    pub failed: Vec<(i64, AppError)>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(due_offset_days: i64, status: RecordStatus) -> BorrowRecord {
        let now = Utc::now();
        BorrowRecord {
            id: 1,
            member_id: 1,
            book_id: 1,
            borrowed_at: now - Duration::days(10),
            due_at: now + Duration::days(due_offset_days),
            returned_at: None,
            status,
        }
    }

    #[test]
    fn overdue_requires_active_status_and_past_due() {
        let now = Utc::now();
        assert!(record(-1, RecordStatus::Borrowed).is_overdue(now));
        assert!(!record(1, RecordStatus::Borrowed).is_overdue(now));
        assert!(!record(-1, RecordStatus::Returned).is_overdue(now));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let now = Utc::now();
        let range = DateRange {
            from: Some(now),
            until: Some(now - Duration::days(1)),
        };
        assert!(matches!(range.validate(), Err(AppError::InvalidRange(_))));
    }

    #[test]
    fn equal_bounds_are_a_valid_empty_range() {
        let now = Utc::now();
        let range = DateRange {
            from: Some(now),
            until: Some(now),
        };
        assert!(range.validate().is_ok());
    }
}
