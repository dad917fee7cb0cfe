//! Lending engine: borrow, return and batch-return workflows.
//!
//! Each workflow runs inside one transaction so the inventory change and the
//! record change commit or roll back together. The record state machine is
//! `none -> Borrowed -> Returned`; nothing leaves `Returned`.

use chrono::{Duration, Utc};

use crate::{
    config::LendingConfig,
    error::{AppError, AppResult},
    models::enums::RecordStatus,
    models::member::Member,
    models::record::{BatchReturnReport, BorrowRecord, RecordDetails, RecordQuery},
    repository::Repository,
};

#[derive(Clone)]
pub struct LendingService {
    repository: Repository,
    config: LendingConfig,
}

impl LendingService {
    pub fn new(repository: Repository, config: LendingConfig) -> Self {
        Self { repository, config }
    }

    /// Borrow one copy of a book for a patron.
    ///
    /// The duplicate-loan check, the reservation and the record insert
    /// commit as one unit; a reservation is never lost to a failed insert.
    pub async fn borrow(&self, member_id: i64, book_id: i64) -> AppResult<BorrowRecord> {
        let member = self.repository.members.get_by_id(member_id).await?;
        if member.is_administrator() {
            return Err(AppError::Forbidden(
                "administrators manage the catalog and do not borrow".to_string(),
            ));
        }

        let mut tx = self.repository.pool.begin().await?;

        if self
            .repository
            .records
            .active_exists(&mut tx, member_id, book_id)
            .await?
        {
            return Err(AppError::AlreadyBorrowed);
        }

        self.repository.books.reserve(&mut tx, book_id).await?;

        let now = Utc::now();
        let due_at = now + Duration::days(self.config.loan_period_days);
        let record = self
            .repository
            .records
            .insert(&mut tx, member_id, book_id, now, due_at)
            .await?;

        tx.commit().await?;

        tracing::info!(
            member_id,
            book_id,
            record_id = record.id,
            due_at = %record.due_at,
            "book borrowed"
        );
        Ok(record)
    }

    /// Return one record on behalf of `acting_member_id`. Patrons may only
    /// return their own loans; administrators may return any.
    pub async fn return_one(&self, record_id: i64, acting_member_id: i64) -> AppResult<BorrowRecord> {
        let actor = self.repository.members.get_by_id(acting_member_id).await?;
        self.return_record(&actor, record_id).await
    }

    /// Return a set of records as one best-effort batch. Every id goes
    /// through the same rules as `return_one` in its own transaction; a
    /// failed id never rolls back the ones that succeeded.
    pub async fn return_batch(
        &self,
        record_ids: &[i64],
        acting_member_id: i64,
    ) -> AppResult<BatchReturnReport> {
        let actor = self.repository.members.get_by_id(acting_member_id).await?;
        if !actor.is_administrator() {
            return Err(AppError::Forbidden(
                "batch return is an administrator operation".to_string(),
            ));
        }

        let mut report = BatchReturnReport::default();
        for &record_id in record_ids {
            match self.return_record(&actor, record_id).await {
                Ok(_) => report.succeeded.push(record_id),
                Err(err) => report.failed.push((record_id, err)),
            }
        }

        tracing::info!(
            requested = record_ids.len(),
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            "batch return processed"
        );
        Ok(report)
    }

    /// The shared return path: one transaction covering the state
    /// transition and the inventory release.
    async fn return_record(&self, actor: &Member, record_id: i64) -> AppResult<BorrowRecord> {
        let mut tx = self.repository.pool.begin().await?;

        let record = self.repository.records.get_in_tx(&mut tx, record_id).await?;

        if !actor.is_administrator() && record.member_id != actor.id {
            return Err(AppError::Forbidden(
                "patrons may only return their own loans".to_string(),
            ));
        }

        if record.status == RecordStatus::Returned {
            return Err(AppError::AlreadyReturned);
        }

        let now = Utc::now();
        // Status-guarded update: a concurrent return that got there first
        // leaves zero rows for us.
        let transitioned = self
            .repository
            .records
            .mark_returned(&mut tx, record_id, now)
            .await?;
        if transitioned == 0 {
            return Err(AppError::AlreadyReturned);
        }

        self.repository.books.release(&mut tx, record.book_id).await?;

        tx.commit().await?;

        tracing::info!(record_id, book_id = record.book_id, "book returned");
        Ok(BorrowRecord {
            returned_at: Some(now),
            status: RecordStatus::Returned,
            ..record
        })
    }

    // =========================================================================
    // Read-only queries
    // =========================================================================

    /// Get one record by id
    pub async fn get_record(&self, record_id: i64) -> AppResult<BorrowRecord> {
        self.repository.records.get_by_id(record_id).await
    }

    /// Is the record still out past its due date?
    pub fn is_overdue(&self, record: &BorrowRecord) -> bool {
        record.is_overdue(Utc::now())
    }

    /// Number of active loans held by a member
    pub async fn active_borrow_count(&self, member_id: i64) -> AppResult<i64> {
        self.repository.records.count_active_for_member(member_id).await
    }

    /// Number of overdue loans held by a member
    pub async fn overdue_count(&self, member_id: i64) -> AppResult<i64> {
        self.repository
            .records
            .count_overdue_for_member(member_id, Utc::now())
            .await
    }

    /// Search borrow records with the caller's criteria
    pub async fn search_records(
        &self,
        query: &RecordQuery,
    ) -> AppResult<(Vec<RecordDetails>, i64)> {
        let mut query = query.clone();
        query.page = Some(query.page.unwrap_or(1).max(1));
        query.per_page = Some(
            query
                .per_page
                .unwrap_or(self.config.default_page_size)
                .clamp(1, self.config.max_page_size),
        );
        self.repository.records.search(&query).await
    }
}
