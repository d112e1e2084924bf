// Reshelve - Personal Reading Tracker
// Copyright (C) 2025 Henning Berge
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Database query functions
//!
//! Row-level repository functions, one section per table. Nothing here
//! knows about requesters: authorization lives in `policy` and the service
//! modules, which call these with the ownership predicate already chosen.
//!
//! # Query Patterns
//! - Every function is generic over [`sqlx::Executor`], so the same query
//!   runs on the pool or inside a transaction (`&mut *tx`)
//! - Ownership-scoped lookups take the owner id and filter in SQL rather
//!   than fetching and comparing

use crate::error::Result;
use crate::storage::models::*;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Executor, Sqlite};

/// Sort direction for annotation listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}

// ============================================================================
// BOOK QUERIES
// ============================================================================

/// Insert a new book
///
/// Returns the id of the inserted book.
pub async fn insert_book<'e, E>(executor: E, book: &NewBook) -> std::result::Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        INSERT INTO books (title, author, genre, cover_url, description, published_year)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&book.title)
    .bind(&book.author)
    .bind(&book.genre)
    .bind(&book.cover_url)
    .bind(&book.description)
    .bind(book.published_year)
    .execute(executor)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Find book by ID
pub async fn find_book_by_id<'e, E>(executor: E, book_id: i64) -> Result<Option<Book>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = ?")
        .bind(book_id)
        .fetch_optional(executor)
        .await?;

    Ok(book)
}

/// List all books ordered by title
pub async fn list_books<'e, E>(executor: E) -> Result<Vec<Book>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let books = sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY title ASC, id ASC")
        .fetch_all(executor)
        .await?;

    Ok(books)
}

/// Replace every field of a book; returns rows affected
pub async fn update_book<'e, E>(
    executor: E,
    book_id: i64,
    book: &NewBook,
) -> std::result::Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        UPDATE books SET
            title = ?, author = ?, genre = ?,
            cover_url = ?, description = ?, published_year = ?
        WHERE id = ?
        "#,
    )
    .bind(&book.title)
    .bind(&book.author)
    .bind(&book.genre)
    .bind(&book.cover_url)
    .bind(&book.description)
    .bind(book.published_year)
    .bind(book_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

/// Delete a book; returns rows affected
///
/// Fails with a foreign key violation while any shelf entry references it.
pub async fn delete_book<'e, E>(executor: E, book_id: i64) -> std::result::Result<u64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM books WHERE id = ?")
        .bind(book_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

// ============================================================================
// BOOKSHELF QUERIES
// ============================================================================

/// Insert a shelf entry; returns the new entry id
pub async fn insert_entry<'e, E>(
    executor: E,
    user_id: i64,
    book_id: i64,
) -> std::result::Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("INSERT INTO bookshelf (user_id, book_id) VALUES (?, ?)")
        .bind(user_id)
        .bind(book_id)
        .execute(executor)
        .await?;

    Ok(result.last_insert_rowid())
}

/// Find a shelf entry only if it belongs to `user_id`
pub async fn find_owned_entry<'e, E>(
    executor: E,
    entry_id: i64,
    user_id: i64,
) -> Result<Option<BookshelfEntry>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let entry = sqlx::query_as::<_, BookshelfEntry>(
        "SELECT id, user_id, book_id FROM bookshelf WHERE id = ? AND user_id = ?",
    )
    .bind(entry_id)
    .bind(user_id)
    .fetch_optional(executor)
    .await?;

    Ok(entry)
}

/// Find the entry `user_id` holds for `book_id`, if any
pub async fn find_entry_for_book<'e, E>(
    executor: E,
    user_id: i64,
    book_id: i64,
) -> Result<Option<BookshelfEntry>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let entry = sqlx::query_as::<_, BookshelfEntry>(
        "SELECT id, user_id, book_id FROM bookshelf WHERE user_id = ? AND book_id = ?",
    )
    .bind(user_id)
    .bind(book_id)
    .fetch_optional(executor)
    .await?;

    Ok(entry)
}

/// Find an owned entry joined with its catalog book
pub async fn find_owned_entry_with_book<'e, E>(
    executor: E,
    entry_id: i64,
    user_id: i64,
) -> Result<Option<EntryWithBook>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let entry = sqlx::query_as::<_, EntryWithBook>(
        r#"
        SELECT
            b.id AS bookshelf_id,
            k.id AS book_id,
            k.title,
            k.author,
            k.genre,
            k.cover_url,
            k.description,
            k.published_year
        FROM bookshelf b
        JOIN books k ON b.book_id = k.id
        WHERE b.id = ? AND b.user_id = ?
        "#,
    )
    .bind(entry_id)
    .bind(user_id)
    .fetch_optional(executor)
    .await?;

    Ok(entry)
}

/// Delete an entry only if it belongs to `user_id`; returns rows affected
///
/// Comments, reading logs and tag assignments go with it via ON DELETE CASCADE.
pub async fn delete_owned_entry<'e, E>(executor: E, entry_id: i64, user_id: i64) -> Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM bookshelf WHERE id = ? AND user_id = ?")
        .bind(entry_id)
        .bind(user_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

/// List a user's shelf, newest entry first, with assigned tag ids
pub async fn list_shelf_items<'e, E>(executor: E, user_id: i64) -> Result<Vec<ShelfItem>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, ShelfItemRow>(
        r#"
        SELECT
            b.id AS bookshelf_id,
            b.book_id,
            k.title,
            k.author,
            k.cover_url,
            GROUP_CONCAT(bt.tag_id) AS tag_ids
        FROM bookshelf b
        JOIN books k ON b.book_id = k.id
        LEFT JOIN bookshelf_tags bt ON bt.bookshelf_id = b.id
        WHERE b.user_id = ?
        GROUP BY b.id
        ORDER BY b.id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(ShelfItem::from).collect())
}

// ============================================================================
// COMMENT QUERIES
// ============================================================================

/// Insert a comment; created_at and updated_at both start at `now`
pub async fn insert_comment<'e, E>(
    executor: E,
    entry_id: i64,
    content: &str,
    now: DateTime<Utc>,
) -> Result<Comment>
where
    E: Executor<'e, Database = Sqlite>,
{
    let comment = sqlx::query_as::<_, Comment>(
        r#"
        INSERT INTO comments (bookshelf_id, content, created_at, updated_at)
        VALUES (?, ?, ?, ?)
        RETURNING id, bookshelf_id, content, created_at, updated_at
        "#,
    )
    .bind(entry_id)
    .bind(content)
    .bind(now)
    .bind(now)
    .fetch_one(executor)
    .await?;

    Ok(comment)
}

/// Find comment by ID
pub async fn find_comment<'e, E>(executor: E, comment_id: i64) -> Result<Option<Comment>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let comment = sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = ?")
        .bind(comment_id)
        .fetch_optional(executor)
        .await?;

    Ok(comment)
}

/// List comments of an entry by creation time
pub async fn list_comments<'e, E>(executor: E, entry_id: i64, order: SortOrder) -> Result<Vec<Comment>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "SELECT * FROM comments WHERE bookshelf_id = ? ORDER BY created_at {dir}, id {dir}",
        dir = order.as_sql()
    );
    let comments = sqlx::query_as::<_, Comment>(&sql)
        .bind(entry_id)
        .fetch_all(executor)
        .await?;

    Ok(comments)
}

/// Replace comment content and refresh updated_at
pub async fn update_comment<'e, E>(
    executor: E,
    comment_id: i64,
    content: &str,
    now: DateTime<Utc>,
) -> Result<Option<Comment>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let comment = sqlx::query_as::<_, Comment>(
        r#"
        UPDATE comments SET content = ?, updated_at = ?
        WHERE id = ?
        RETURNING id, bookshelf_id, content, created_at, updated_at
        "#,
    )
    .bind(content)
    .bind(now)
    .bind(comment_id)
    .fetch_optional(executor)
    .await?;

    Ok(comment)
}

/// Delete comment; returns rows affected
pub async fn delete_comment<'e, E>(executor: E, comment_id: i64) -> Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM comments WHERE id = ?")
        .bind(comment_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

// ============================================================================
// READING LOG QUERIES
// ============================================================================

/// Insert a reading log dated `date`
pub async fn insert_reading_log<'e, E>(
    executor: E,
    entry_id: i64,
    log: &NewReadingLog,
    date: NaiveDate,
) -> Result<ReadingLog>
where
    E: Executor<'e, Database = Sqlite>,
{
    let log = sqlx::query_as::<_, ReadingLog>(
        r#"
        INSERT INTO reading_logs (bookshelf_id, start_page, end_page, duration_minutes, date)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id, bookshelf_id, start_page, end_page, duration_minutes, date
        "#,
    )
    .bind(entry_id)
    .bind(log.start_page)
    .bind(log.end_page)
    .bind(log.duration_minutes)
    .bind(date)
    .fetch_one(executor)
    .await?;

    Ok(log)
}

/// Find reading log by ID
pub async fn find_reading_log<'e, E>(executor: E, log_id: i64) -> Result<Option<ReadingLog>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let log = sqlx::query_as::<_, ReadingLog>("SELECT * FROM reading_logs WHERE id = ?")
        .bind(log_id)
        .fetch_optional(executor)
        .await?;

    Ok(log)
}

/// List reading logs of an entry by date
pub async fn list_reading_logs<'e, E>(
    executor: E,
    entry_id: i64,
    order: SortOrder,
) -> Result<Vec<ReadingLog>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "SELECT * FROM reading_logs WHERE bookshelf_id = ? ORDER BY date {dir}, id {dir}",
        dir = order.as_sql()
    );
    let logs = sqlx::query_as::<_, ReadingLog>(&sql)
        .bind(entry_id)
        .fetch_all(executor)
        .await?;

    Ok(logs)
}

/// Replace page range and duration of one log in a single-row update
pub async fn update_reading_log<'e, E>(
    executor: E,
    log_id: i64,
    log: &NewReadingLog,
) -> Result<Option<ReadingLog>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let log = sqlx::query_as::<_, ReadingLog>(
        r#"
        UPDATE reading_logs SET start_page = ?, end_page = ?, duration_minutes = ?
        WHERE id = ?
        RETURNING id, bookshelf_id, start_page, end_page, duration_minutes, date
        "#,
    )
    .bind(log.start_page)
    .bind(log.end_page)
    .bind(log.duration_minutes)
    .bind(log_id)
    .fetch_optional(executor)
    .await?;

    Ok(log)
}

/// Delete reading log; returns rows affected
pub async fn delete_reading_log<'e, E>(executor: E, log_id: i64) -> Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM reading_logs WHERE id = ?")
        .bind(log_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

// ============================================================================
// TAG QUERIES
// ============================================================================

/// Insert a tag in the given scope
pub async fn insert_tag<'e, E>(executor: E, name: &str, scope: TagScope) -> Result<Tag>
where
    E: Executor<'e, Database = Sqlite>,
{
    let record = sqlx::query_as::<_, TagRecord>(
        "INSERT INTO tags (name, user_id) VALUES (?, ?) RETURNING id, name, user_id",
    )
    .bind(name)
    .bind(scope.owner_id())
    .fetch_one(executor)
    .await?;

    Ok(record.into())
}

/// Find tag by ID regardless of scope
pub async fn find_tag<'e, E>(executor: E, tag_id: i64) -> Result<Option<Tag>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let record = sqlx::query_as::<_, TagRecord>("SELECT id, name, user_id FROM tags WHERE id = ?")
        .bind(tag_id)
        .fetch_optional(executor)
        .await?;

    Ok(record.map(Tag::from))
}

/// All tags visible to `user_id`: system tags plus that user's own
pub async fn list_visible_tags<'e, E>(executor: E, user_id: i64) -> Result<Vec<Tag>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let records = sqlx::query_as::<_, TagRecord>(
        r#"
        SELECT id, name, user_id FROM tags
        WHERE user_id IS NULL OR user_id = ?
        ORDER BY name ASC, id ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(executor)
    .await?;

    Ok(records.into_iter().map(Tag::from).collect())
}

/// Rename a tag only if it is in `scope`
///
/// Returns `None` when no row matched: the tag is absent or in another scope.
pub async fn update_tag_in_scope<'e, E>(
    executor: E,
    tag_id: i64,
    scope: TagScope,
    name: &str,
) -> Result<Option<Tag>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let query = match scope {
        TagScope::System => sqlx::query_as::<_, TagRecord>(
            "UPDATE tags SET name = ? WHERE id = ? AND user_id IS NULL RETURNING id, name, user_id",
        )
        .bind(name)
        .bind(tag_id),
        TagScope::OwnedBy(owner) => sqlx::query_as::<_, TagRecord>(
            "UPDATE tags SET name = ? WHERE id = ? AND user_id = ? RETURNING id, name, user_id",
        )
        .bind(name)
        .bind(tag_id)
        .bind(owner),
    };

    let record = query.fetch_optional(executor).await?;
    Ok(record.map(Tag::from))
}

/// Delete a tag only if it is in `scope`; returns rows affected
///
/// Assignments of the tag go with it via ON DELETE CASCADE.
pub async fn delete_tag_in_scope<'e, E>(executor: E, tag_id: i64, scope: TagScope) -> Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let query = match scope {
        TagScope::System => {
            sqlx::query("DELETE FROM tags WHERE id = ? AND user_id IS NULL").bind(tag_id)
        }
        TagScope::OwnedBy(owner) => sqlx::query("DELETE FROM tags WHERE id = ? AND user_id = ?")
            .bind(tag_id)
            .bind(owner),
    };

    let result = query.execute(executor).await?;
    Ok(result.rows_affected())
}

// ============================================================================
// TAG ASSIGNMENT QUERIES
// ============================================================================

/// Tags assigned to an entry, ordered by name
pub async fn list_entry_tags<'e, E>(executor: E, entry_id: i64) -> Result<Vec<Tag>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let records = sqlx::query_as::<_, TagRecord>(
        r#"
        SELECT t.id, t.name, t.user_id
        FROM bookshelf_tags bt
        JOIN tags t ON bt.tag_id = t.id
        WHERE bt.bookshelf_id = ?
        ORDER BY t.name ASC, t.id ASC
        "#,
    )
    .bind(entry_id)
    .fetch_all(executor)
    .await?;

    Ok(records.into_iter().map(Tag::from).collect())
}

/// Remove every assignment of an entry, but only if `user_id` owns it
///
/// Returns rows affected. As a write, this takes SQLite's write lock when
/// it is the first statement of a transaction, so a read-then-write
/// sequence after it cannot fail on a stale snapshot.
pub async fn clear_owned_assignments<'e, E>(executor: E, entry_id: i64, user_id: i64) -> Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        DELETE FROM bookshelf_tags
        WHERE bookshelf_id = ?
          AND EXISTS (SELECT 1 FROM bookshelf WHERE id = ? AND user_id = ?)
        "#,
    )
    .bind(entry_id)
    .bind(entry_id)
    .bind(user_id)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

/// Assign one tag to an entry; an existing assignment is left as is
pub async fn insert_assignment<'e, E>(executor: E, entry_id: i64, tag_id: i64) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("INSERT OR IGNORE INTO bookshelf_tags (bookshelf_id, tag_id) VALUES (?, ?)")
        .bind(entry_id)
        .bind(tag_id)
        .execute(executor)
        .await?;

    Ok(())
}

/// Remove one assignment; returns rows affected
pub async fn delete_assignment<'e, E>(executor: E, entry_id: i64, tag_id: i64) -> Result<u64>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM bookshelf_tags WHERE bookshelf_id = ? AND tag_id = ?")
        .bind(entry_id)
        .bind(tag_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}
