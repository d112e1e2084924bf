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


//! Comments on shelf entries
//!
//! Mutations check that the parent entry belongs to the requester and fail
//! with Forbidden otherwise. Listing conceals foreign entries as NotFound.

use crate::auth::Requester;
use crate::error::{ReshelveError, Result};
use crate::policy;
use crate::storage::models::Comment;
use crate::storage::queries::{self, SortOrder};
use crate::storage::Database;
use chrono::Utc;

fn content(text: &str) -> Result<&str> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ReshelveError::missing_field("content"));
    }
    Ok(text)
}

/// Resolve a comment and check the requester owns its entry
async fn owned_comment(db: &Database, requester: &Requester, comment_id: i64) -> Result<Comment> {
    let comment = queries::find_comment(db.pool(), comment_id)
        .await?
        .ok_or_else(|| ReshelveError::not_found("Comment not found"))?;

    let entry = queries::find_owned_entry(db.pool(), comment.bookshelf_id, requester.id).await?;
    policy::require_owned(entry, requester, "Comment")?;
    Ok(comment)
}

pub async fn add_comment(
    db: &Database,
    requester: &Requester,
    entry_id: i64,
    text: &str,
) -> Result<Comment> {
    let entry = queries::find_owned_entry(db.pool(), entry_id, requester.id).await?;
    policy::require_owned(entry, requester, "Bookshelf entry")?;
    let text = content(text)?;

    let comment = queries::insert_comment(db.pool(), entry_id, text, Utc::now()).await?;
    tracing::info!(comment_id = comment.id, entry_id, "Added comment");
    Ok(comment)
}

/// Comments of an owned entry, newest first
pub async fn list_comments(db: &Database, requester: &Requester, entry_id: i64) -> Result<Vec<Comment>> {
    let entry = queries::find_owned_entry(db.pool(), entry_id, requester.id).await?;
    policy::conceal_unowned(entry, "Bookshelf entry")?;

    queries::list_comments(db.pool(), entry_id, SortOrder::Descending).await
}

/// Replace a comment's content and refresh its update time
pub async fn update_comment(
    db: &Database,
    requester: &Requester,
    comment_id: i64,
    text: &str,
) -> Result<Comment> {
    owned_comment(db, requester, comment_id).await?;
    let text = content(text)?;

    let updated = queries::update_comment(db.pool(), comment_id, text, Utc::now())
        .await?
        .ok_or_else(|| ReshelveError::not_found("Comment not found"))?;

    tracing::info!(comment_id, "Updated comment");
    Ok(updated)
}

pub async fn delete_comment(db: &Database, requester: &Requester, comment_id: i64) -> Result<()> {
    owned_comment(db, requester, comment_id).await?;

    if queries::delete_comment(db.pool(), comment_id).await? == 0 {
        return Err(ReshelveError::not_found("Comment not found"));
    }

    tracing::info!(comment_id, "Deleted comment");
    Ok(())
}
