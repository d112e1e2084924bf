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


//! Tag assignments on shelf entries
//!
//! # Replace Semantics
//! [`set_tags_for_entry`] swaps the whole assignment set inside one
//! transaction. Either every supplied tag ends up assigned and nothing
//! else, or the previous set is left untouched. The transaction opens
//! with a write so concurrent replaces queue on SQLite's busy timeout
//! instead of failing.

use crate::auth::Requester;
use crate::error::{ReshelveError, Result};
use crate::policy;
use crate::storage::models::Tag;
use crate::storage::{queries, Database};
use std::collections::BTreeSet;

/// Replace the entry's tags with `tag_ids`
///
/// An empty list clears the entry. Duplicate ids collapse. Every id must be
/// a tag the requester can see, otherwise nothing changes.
///
/// # Returns
/// The new assignment set, ordered by name
pub async fn set_tags_for_entry(
    db: &Database,
    requester: &Requester,
    entry_id: i64,
    tag_ids: &[i64],
) -> Result<Vec<Tag>> {
    let mut tx = db.pool().begin().await?;

    // Write first: the transaction must hold the write lock before any read,
    // or a concurrent commit leaves it on a snapshot it cannot upgrade.
    queries::clear_owned_assignments(&mut *tx, entry_id, requester.id).await?;

    let entry = queries::find_owned_entry(&mut *tx, entry_id, requester.id).await?;
    policy::require_owned(entry, requester, "Bookshelf entry")?;

    let wanted: BTreeSet<i64> = tag_ids.iter().copied().collect();
    for &tag_id in &wanted {
        let visible = queries::find_tag(&mut *tx, tag_id)
            .await?
            .is_some_and(|tag| policy::is_visible(tag.scope, requester));
        if !visible {
            // Dropping `tx` rolls back, restoring the cleared set
            return Err(ReshelveError::invalid_input(format!(
                "Tag {} does not exist",
                tag_id
            )));
        }
    }

    for &tag_id in &wanted {
        queries::insert_assignment(&mut *tx, entry_id, tag_id).await?;
    }
    let assigned = queries::list_entry_tags(&mut *tx, entry_id).await?;

    tx.commit().await?;

    tracing::info!(entry_id, user_id = requester.id, count = assigned.len(), "Replaced entry tags");
    Ok(assigned)
}

/// Tags assigned to an entry the requester owns, ordered by name
pub async fn list_entry_tags(db: &Database, requester: &Requester, entry_id: i64) -> Result<Vec<Tag>> {
    let entry = queries::find_owned_entry(db.pool(), entry_id, requester.id).await?;
    policy::conceal_unowned(entry, "Bookshelf entry")?;

    queries::list_entry_tags(db.pool(), entry_id).await
}

/// Unassign one tag; returns whether an assignment was removed
pub async fn remove_tag_from_entry(
    db: &Database,
    requester: &Requester,
    entry_id: i64,
    tag_id: i64,
) -> Result<bool> {
    let entry = queries::find_owned_entry(db.pool(), entry_id, requester.id).await?;
    policy::require_owned(entry, requester, "Bookshelf entry")?;

    let removed = queries::delete_assignment(db.pool(), entry_id, tag_id).await? > 0;
    if removed {
        tracing::info!(entry_id, tag_id, user_id = requester.id, "Removed tag from entry");
    }
    Ok(removed)
}
