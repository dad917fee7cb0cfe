//! Member model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use super::enums::Role;

/// Member model from database. Administrators and patrons share the
/// identity table; `role` carries the privilege set.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Member {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl Member {
    pub fn is_administrator(&self) -> bool {
        self.role == Role::Administrator
    }
}

/// Registration / administrative creation request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterMember {
    #[validate(length(min = 4, max = 20))]
    pub username: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 100))]
    pub full_name: String,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    pub address: Option<String>,
    #[validate(length(min = 6))]
    pub password: String,
}

/// Profile update request
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProfile {
    #[validate(length(min = 1, max = 100))]
    pub full_name: Option<String>,
    #[validate(length(max = 20))]
    pub phone: Option<String>,
    pub address: Option<String>,
    #[validate(length(min = 6))]
    pub password: Option<String>,
}

/// Search criteria for members
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberQuery {
    /// Substring matched against username, email, full name and phone
    pub search: Option<String>,
    pub role: Option<Role>,
    /// Sort key from the allow-list; unknown keys sort by id
    pub sort: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}
