//! Member management: registration, credentials, profile, deletion

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use validator::Validate;

use crate::{
    config::LendingConfig,
    error::{AppError, AppResult},
    models::enums::Role,
    models::member::{Member, MemberQuery, RegisterMember, UpdateProfile},
    repository::Repository,
};

#[derive(Clone)]
pub struct MembersService {
    repository: Repository,
    config: LendingConfig,
}

impl MembersService {
    pub fn new(repository: Repository, config: LendingConfig) -> Self {
        Self { repository, config }
    }

    /// Get member by id
    pub async fn get(&self, id: i64) -> AppResult<Member> {
        self.repository.members.get_by_id(id).await
    }

    /// Look a member up by username, if any
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<Member>> {
        self.repository.members.get_by_username(username).await
    }

    /// Self-service patron registration
    pub async fn register(&self, member: RegisterMember) -> AppResult<Member> {
        self.create_with_role(member, Role::Patron).await
    }

    /// Administrative creation of an administrator account
    pub async fn create_administrator(&self, member: RegisterMember) -> AppResult<Member> {
        self.create_with_role(member, Role::Administrator).await
    }

    async fn create_with_role(&self, member: RegisterMember, role: Role) -> AppResult<Member> {
        member
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        if self.repository.members.username_exists(&member.username).await? {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }
        if self.repository.members.email_exists(&member.email).await? {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }

        let password_hash = self.hash_password(&member.password)?;
        let created = self
            .repository
            .members
            .create(&member, &password_hash, role)
            .await?;

        tracing::info!(member_id = created.id, username = %created.username, %role, "member created");
        Ok(created)
    }

    /// Verify credentials and return the member. The engine stops at
    /// credential verification; sessions belong to the caller.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<Member> {
        let member = self
            .repository
            .members
            .get_by_username(username)
            .await?
            .ok_or_else(|| {
                AppError::Authentication("Invalid username or password".to_string())
            })?;

        if !self.verify_password(&member, password)? {
            return Err(AppError::Authentication(
                "Invalid username or password".to_string(),
            ));
        }

        Ok(member)
    }

    /// Update profile fields; a new password is re-hashed
    pub async fn update_profile(&self, id: i64, profile: UpdateProfile) -> AppResult<Member> {
        profile
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let password_hash = match profile.password {
            Some(ref password) => Some(self.hash_password(password)?),
            None => None,
        };

        self.repository
            .members
            .update_profile(id, &profile, password_hash)
            .await
    }

    /// Administrative hard delete. Cascades to the member's borrow records;
    /// active loans put their copies back on the shelf first so the book
    /// counts stay consistent with the remaining records.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let mut tx = self.repository.pool.begin().await?;

        let active_books = self
            .repository
            .records
            .active_book_ids_for_member(&mut tx, id)
            .await?;
        for book_id in &active_books {
            self.repository.books.release(&mut tx, *book_id).await?;
        }

        let records = self.repository.records.delete_by_member(&mut tx, id).await?;
        self.repository.members.delete_in_tx(&mut tx, id).await?;

        tx.commit().await?;
        tracing::info!(
            member_id = id,
            cascaded_records = records,
            released = active_books.len(),
            "member deleted"
        );
        Ok(())
    }

    /// Search members with the caller's criteria
    pub async fn search(&self, query: &MemberQuery) -> AppResult<(Vec<Member>, i64)> {
        let mut query = query.clone();
        query.page = Some(query.page.unwrap_or(1).max(1));
        query.per_page = Some(
            query
                .per_page
                .unwrap_or(self.config.default_page_size)
                .clamp(1, self.config.max_page_size),
        );
        self.repository.members.search(&query).await
    }

    fn verify_password(&self, member: &Member, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&member.password_hash)
            .map_err(|e| AppError::Internal(format!("Stored hash is invalid: {}", e)))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }
}
