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


//! Detail views
//!
//! # Snapshot Reads
//! Each view is assembled from several record sets inside one read
//! transaction, so concurrent writers cannot make the parts disagree.
//! The ownership lookup runs first; when it misses, no child record is
//! read at all.

use crate::auth::Requester;
use crate::error::{ReshelveError, Result};
use crate::policy;
use crate::storage::models::{Book, Comment, EntryWithBook, ReadingLog, Tag};
use crate::storage::queries::{self, SortOrder};
use crate::storage::Database;
use serde::{Deserialize, Serialize};

/// Everything shown for one shelf entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookshelfEntryDetail {
    #[serde(flatten)]
    pub entry: EntryWithBook,
    /// Oldest first
    pub comments: Vec<Comment>,
    /// Earliest date first
    pub reading_logs: Vec<ReadingLog>,
    pub assigned_tags: Vec<Tag>,
    pub owned_tags: Vec<Tag>,
    pub system_tags: Vec<Tag>,
    pub all_tags: Vec<Tag>,
}

/// A catalog book as seen by one requester
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookDetail {
    #[serde(flatten)]
    pub book: Book,
    /// The requester's entry for this book, if shelved
    pub bookshelf_id: Option<i64>,
    pub assigned_tags: Vec<Tag>,
    pub owned_tags: Vec<Tag>,
    pub system_tags: Vec<Tag>,
    pub all_tags: Vec<Tag>,
}

/// Detail of an entry the requester owns
///
/// Someone else's entry and a missing one produce the same NotFound.
pub async fn get_bookshelf_entry_detail(
    db: &Database,
    requester: &Requester,
    entry_id: i64,
) -> Result<BookshelfEntryDetail> {
    let mut tx = db.pool().begin().await?;

    let entry = queries::find_owned_entry_with_book(&mut *tx, entry_id, requester.id).await?;
    let entry = policy::conceal_unowned(entry, "Bookshelf entry")?;

    let comments = queries::list_comments(&mut *tx, entry_id, SortOrder::Ascending).await?;
    let reading_logs = queries::list_reading_logs(&mut *tx, entry_id, SortOrder::Ascending).await?;
    let assigned_tags = queries::list_entry_tags(&mut *tx, entry_id).await?;
    let visible = policy::partition_tags(
        queries::list_visible_tags(&mut *tx, requester.id).await?,
        requester,
    );

    tx.commit().await?;

    tracing::debug!(
        entry_id,
        user_id = requester.id,
        comments = comments.len(),
        reading_logs = reading_logs.len(),
        "Loaded entry detail"
    );

    Ok(BookshelfEntryDetail {
        entry,
        comments,
        reading_logs,
        assigned_tags,
        owned_tags: visible.owned,
        system_tags: visible.system,
        all_tags: visible.all,
    })
}

/// Detail of a catalog book, with the requester's shelf state for it
pub async fn get_book_detail(db: &Database, requester: &Requester, book_id: i64) -> Result<BookDetail> {
    let mut tx = db.pool().begin().await?;

    let book = queries::find_book_by_id(&mut *tx, book_id)
        .await?
        .ok_or_else(|| ReshelveError::not_found("Book not found"))?;

    let entry = queries::find_entry_for_book(&mut *tx, requester.id, book_id).await?;
    let assigned_tags = match &entry {
        Some(entry) => queries::list_entry_tags(&mut *tx, entry.id).await?,
        None => Vec::new(),
    };
    let visible = policy::partition_tags(
        queries::list_visible_tags(&mut *tx, requester.id).await?,
        requester,
    );

    tx.commit().await?;

    Ok(BookDetail {
        book,
        bookshelf_id: entry.map(|e| e.id),
        assigned_tags,
        owned_tags: visible.owned,
        system_tags: visible.system,
        all_tags: visible.all,
    })
}
