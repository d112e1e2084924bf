//! Database models for Reshelve
//!
//! Entity structs map one-to-one onto the tables created in `migrations.rs`.
//!
//! # SQLite Adaptations
//! - Roles stored by id, exposed as the closed [`Role`] enum
//! - Tag ownership stored as nullable `user_id`, exposed as [`TagScope`]
//! - DateTime stored as TEXT (RFC 3339), dates as `YYYY-MM-DD`
//! - Tag id lists in list views aggregated with GROUP_CONCAT

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ============================================================================
// ENUMS
// ============================================================================

/// Account role; ids match the seeded `roles` table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(i64)]
pub enum Role {
    User = 1,
    Admin = 2,
}

impl Role {
    pub fn from_id(value: i64) -> Self {
        match value {
            2 => Role::Admin,
            _ => Role::User, // Default to least privilege
        }
    }

    pub fn id(&self) -> i64 {
        *self as i64
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl std::str::FromStr for Role {
    type Err = crate::error::ReshelveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(crate::error::ReshelveError::invalid_input(format!(
                "Invalid role: {}",
                s
            ))),
        }
    }
}

/// Ownership scope of a tag
///
/// `System` tags are shared by every user and mutable only by admins.
/// `OwnedBy` tags are private to one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "owner_id", rename_all = "snake_case")]
pub enum TagScope {
    System,
    OwnedBy(i64),
}

impl TagScope {
    /// Build from the nullable `tags.user_id` column
    pub fn from_owner(user_id: Option<i64>) -> Self {
        match user_id {
            None => TagScope::System,
            Some(id) => TagScope::OwnedBy(id),
        }
    }

    /// Value for the nullable `tags.user_id` column
    pub fn owner_id(&self) -> Option<i64> {
        match self {
            TagScope::System => None,
            TagScope::OwnedBy(id) => Some(*id),
        }
    }

    pub fn is_system(&self) -> bool {
        matches!(self, TagScope::System)
    }
}

// ============================================================================
// ACCOUNTS
// ============================================================================

/// Registered user
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub role_id: i64,
}

impl User {
    pub fn role(&self) -> Role {
        Role::from_id(self.role_id)
    }
}

/// New user record for insertion; the password is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

// ============================================================================
// CATALOG
// ============================================================================

/// Canonical catalog book
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub genre: String,
    #[sqlx(default)]
    pub cover_url: Option<String>,
    #[sqlx(default)]
    pub description: Option<String>,
    #[sqlx(default)]
    pub published_year: Option<i32>,
}

/// Book fields for insert and full update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub cover_url: Option<String>,
    pub description: Option<String>,
    pub published_year: Option<i32>,
}

impl NewBook {
    pub fn new(title: impl Into<String>, author: impl Into<String>, genre: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            genre: genre.into(),
            ..Self::default()
        }
    }
}

// ============================================================================
// BOOKSHELF
// ============================================================================

/// A user's shelving of one catalog book
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct BookshelfEntry {
    pub id: i64,
    pub user_id: i64,
    pub book_id: i64,
}

/// Row of the shelf list view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShelfItem {
    pub bookshelf_id: i64,
    pub book_id: i64,
    pub title: String,
    pub author: String,
    pub cover_url: Option<String>,
    pub tag_ids: Vec<i64>,
}

/// Raw shelf list row with the tag ids still concatenated
#[derive(Debug, FromRow)]
pub(crate) struct ShelfItemRow {
    pub bookshelf_id: i64,
    pub book_id: i64,
    pub title: String,
    pub author: String,
    pub cover_url: Option<String>,
    pub tag_ids: Option<String>,
}

impl From<ShelfItemRow> for ShelfItem {
    fn from(row: ShelfItemRow) -> Self {
        let mut tag_ids: Vec<i64> = row
            .tag_ids
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .filter_map(|id| id.trim().parse().ok())
            .collect();
        tag_ids.sort_unstable();

        Self {
            bookshelf_id: row.bookshelf_id,
            book_id: row.book_id,
            title: row.title,
            author: row.author,
            cover_url: row.cover_url,
            tag_ids,
        }
    }
}

/// Entry core fields joined with its catalog book
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct EntryWithBook {
    pub bookshelf_id: i64,
    pub book_id: i64,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub cover_url: Option<String>,
    pub description: Option<String>,
    pub published_year: Option<i32>,
}

// ============================================================================
// ANNOTATIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub bookshelf_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct ReadingLog {
    pub id: i64,
    pub bookshelf_id: i64,
    pub start_page: i32,
    pub end_page: i32,
    #[sqlx(default)]
    pub duration_minutes: Option<i32>,
    pub date: NaiveDate,
}

impl ReadingLog {
    /// Pages covered by this session
    pub fn pages_read(&self) -> i32 {
        self.end_page - self.start_page
    }
}

/// Reading log fields for insert and update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewReadingLog {
    pub start_page: i32,
    pub end_page: i32,
    pub duration_minutes: Option<i32>,
    /// Defaults to today on insert; ignored on update
    pub date: Option<NaiveDate>,
}

impl NewReadingLog {
    pub fn new(start_page: i32, end_page: i32) -> Self {
        Self {
            start_page,
            end_page,
            ..Self::default()
        }
    }
}

// ============================================================================
// TAGS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub scope: TagScope,
}

/// Raw `tags` row
#[derive(Debug, FromRow)]
pub(crate) struct TagRecord {
    pub id: i64,
    pub name: String,
    pub user_id: Option<i64>,
}

impl From<TagRecord> for Tag {
    fn from(record: TagRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            scope: TagScope::from_owner(record.user_id),
        }
    }
}

/// Tags visible to one requester, partitioned by scope
///
/// Each list is ordered by name, ties broken by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibleTags {
    pub system: Vec<Tag>,
    pub owned: Vec<Tag>,
    pub all: Vec<Tag>,
}
