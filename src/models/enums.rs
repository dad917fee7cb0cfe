//! Shared domain enums

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Role
// ---------------------------------------------------------------------------

/// Member role. One identity table, two disjoint privilege sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Administrator,
    Patron,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Administrator => "administrator",
            Role::Patron => "patron",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "administrator" | "admin" => Ok(Role::Administrator),
            "patron" => Ok(Role::Patron),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

// ---------------------------------------------------------------------------
// RecordStatus
// ---------------------------------------------------------------------------

/// Borrow record lifecycle state. `Returned` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Borrowed,
    Returned,
}

impl RecordStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordStatus::Borrowed => "borrowed",
            RecordStatus::Returned => "returned",
        }
    }
}

impl std::fmt::Display for RecordStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Status filters
// ---------------------------------------------------------------------------

/// Shelf-status filter for book searches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookStatusFilter {
    #[default]
    Any,
    /// At least one copy on the shelf
    Available,
    /// At least one copy out on loan
    Loaned,
}

impl From<&str> for BookStatusFilter {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "available" => BookStatusFilter::Available,
            "loaned" | "borrowed" => BookStatusFilter::Loaned,
            _ => BookStatusFilter::Any,
        }
    }
}

/// Status filter for borrow-record searches. `Overdue` is derived,
/// never a stored state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatusFilter {
    #[default]
    Any,
    Borrowed,
    Returned,
    Overdue,
}

impl From<&str> for RecordStatusFilter {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "borrowed" => RecordStatusFilter::Borrowed,
            "returned" => RecordStatusFilter::Returned,
            "overdue" => RecordStatusFilter::Overdue,
            _ => RecordStatusFilter::Any,
        }
    }
}

// ---------------------------------------------------------------------------
// Sort keys
// ---------------------------------------------------------------------------
//
// Sort keys come from callers as free-form strings. Unknown keys fall back
// to the primary key ascending instead of erroring.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookSortKey {
    #[default]
    Id,
    Title,
    Author,
    Isbn,
    AddedDate,
}

impl From<&str> for BookSortKey {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "title" => BookSortKey::Title,
            "author" => BookSortKey::Author,
            "isbn" => BookSortKey::Isbn,
            "added_date" => BookSortKey::AddedDate,
            _ => BookSortKey::Id,
        }
    }
}

impl BookSortKey {
    pub fn order_clause(&self) -> &'static str {
        match self {
            BookSortKey::Id => "id",
            BookSortKey::Title => "title",
            BookSortKey::Author => "author",
            BookSortKey::Isbn => "isbn",
            BookSortKey::AddedDate => "created_at DESC, id DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSortKey {
    #[default]
    Id,
    BorrowDate,
    DueDate,
    ReturnDate,
    MemberName,
}

impl From<&str> for RecordSortKey {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "borrow_date" => RecordSortKey::BorrowDate,
            "due_date" => RecordSortKey::DueDate,
            "return_date" => RecordSortKey::ReturnDate,
            "member_name" => RecordSortKey::MemberName,
            _ => RecordSortKey::Id,
        }
    }
}

impl RecordSortKey {
    pub fn order_clause(&self) -> &'static str {
        match self {
            RecordSortKey::Id => "r.id",
            RecordSortKey::BorrowDate => "r.borrowed_at DESC",
            RecordSortKey::DueDate => "r.due_at DESC",
            RecordSortKey::ReturnDate => "r.returned_at DESC",
            RecordSortKey::MemberName => "m.full_name",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberSortKey {
    #[default]
    Id,
    Username,
    Email,
    CreatedDate,
}

impl From<&str> for MemberSortKey {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "username" => MemberSortKey::Username,
            "email" => MemberSortKey::Email,
            "created_date" => MemberSortKey::CreatedDate,
            _ => MemberSortKey::Id,
        }
    }
}

impl MemberSortKey {
    pub fn order_clause(&self) -> &'static str {
        match self {
            MemberSortKey::Id => "id",
            MemberSortKey::Username => "username",
            MemberSortKey::Email => "email",
            MemberSortKey::CreatedDate => "created_at",
        }
    }
}
