//! Members repository for database operations

use chrono::Utc;
use sqlx::{Pool, QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    error::{AppError, AppResult},
    models::enums::{MemberSortKey, Role},
    models::member::{Member, MemberQuery, RegisterMember, UpdateProfile},
};

#[derive(Clone)]
pub struct MembersRepository {
    pool: Pool<Sqlite>,
}

impl MembersRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Get member by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Member> {
        sqlx::query_as::<_, Member>("SELECT * FROM members WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member with id {} not found", id)))
    }

    /// Get member by username, if any
    pub async fn get_by_username(&self, username: &str) -> AppResult<Option<Member>> {
        let member = sqlx::query_as::<_, Member>("SELECT * FROM members WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(member)
    }

    pub async fn username_exists(&self, username: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM members WHERE username = ?)")
                .bind(username)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    pub async fn email_exists(&self, email: &str) -> AppResult<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM members WHERE email = ?)")
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    /// Create a new member with an already-hashed credential
    pub async fn create(
        &self,
        member: &RegisterMember,
        password_hash: &str,
        role: Role,
    ) -> AppResult<Member> {
        let created = sqlx::query_as::<_, Member>(
            r#"
            INSERT INTO members
                (username, email, full_name, phone, address, password_hash, role, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(&member.username)
        .bind(&member.email)
        .bind(&member.full_name)
        .bind(&member.phone)
        .bind(&member.address)
        .bind(password_hash)
        .bind(role)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// Update profile fields; absent fields keep their current value
    pub async fn update_profile(
        &self,
        id: i64,
        profile: &UpdateProfile,
        password_hash: Option<String>,
    ) -> AppResult<Member> {
        sqlx::query_as::<_, Member>(
            r#"
            UPDATE members SET
                full_name = COALESCE(?, full_name),
                phone = COALESCE(?, phone),
                address = COALESCE(?, address),
                password_hash = COALESCE(?, password_hash)
            WHERE id = ?
            RETURNING *
            "#,
        )
        .bind(&profile.full_name)
        .bind(&profile.phone)
        .bind(&profile.address)
        .bind(password_hash)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Member with id {} not found", id)))
    }

    /// Delete the member row inside a caller's transaction
    pub async fn delete_in_tx(&self, conn: &mut SqliteConnection, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM members WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Member with id {} not found", id)));
        }
        Ok(())
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, query: &MemberQuery) {
        if let Some(ref term) = query.search {
            let term = term.trim();
            if !term.is_empty() {
                let pattern = format!("%{}%", term.to_lowercase());
                qb.push(" AND (LOWER(username) LIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR LOWER(email) LIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR LOWER(full_name) LIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR LOWER(COALESCE(phone, '')) LIKE ")
                    .push_bind(pattern)
                    .push(")");
            }
        }

        if let Some(role) = query.role {
            qb.push(" AND role = ").push_bind(role);
        }
    }

    /// Search members with pagination; returns the page plus the total count
    pub async fn search(&self, query: &MemberQuery) -> AppResult<(Vec<Member>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(10).max(1);
        let offset = (page - 1) * per_page;

        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM members WHERE 1=1");
        Self::push_filters(&mut count_qb, query);
        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await?;

        let sort = query
            .sort
            .as_deref()
            .map(MemberSortKey::from)
            .unwrap_or_default();

        let mut qb = QueryBuilder::new("SELECT * FROM members WHERE 1=1");
        Self::push_filters(&mut qb, query);
        qb.push(" ORDER BY ")
            .push(sort.order_clause())
            .push(" LIMIT ")
            .push_bind(per_page)
            .push(" OFFSET ")
            .push_bind(offset);

        let members = qb
            .build_query_as::<Member>()
            .fetch_all(&self.pool)
            .await?;

        Ok((members, total))
    }

    /// Count all members
    pub async fn count(&self) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM members")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
