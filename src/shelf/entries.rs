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


//! Shelf entry lifecycle

use crate::auth::Requester;
use crate::error::{constraint_of, translate_store_error, Constraint, ReshelveError, Result};
use crate::policy;
use crate::storage::models::{BookshelfEntry, ShelfItem};
use crate::storage::{queries, Database};

/// Put a catalog book on the requester's shelf
///
/// Conflict if it is already there; NotFound if the book does not exist.
pub async fn add_to_shelf(
    db: &Database,
    requester: &Requester,
    book_id: i64,
) -> Result<BookshelfEntry> {
    if queries::find_book_by_id(db.pool(), book_id).await?.is_none() {
        return Err(ReshelveError::not_found("Book not found"));
    }

    let entry_id = queries::insert_entry(db.pool(), requester.id, book_id)
        .await
        .map_err(shelf_insert_error)?;

    tracing::info!(entry_id, book_id, user_id = requester.id, "Added book to shelf");
    Ok(BookshelfEntry {
        id: entry_id,
        user_id: requester.id,
        book_id,
    })
}

/// The book can be deleted between the existence check and the insert
fn shelf_insert_error(err: sqlx::Error) -> ReshelveError {
    if constraint_of(&err) == Some(Constraint::ForeignKey) {
        return ReshelveError::not_found("Book not found");
    }
    translate_store_error(err)
}

/// Remove an entry the requester owns
///
/// Comments, reading logs and tag assignments are removed with it.
/// Someone else's entry is reported exactly like a missing one.
pub async fn remove_from_shelf(db: &Database, requester: &Requester, entry_id: i64) -> Result<()> {
    let deleted = queries::delete_owned_entry(db.pool(), entry_id, requester.id).await?;
    policy::conceal_unowned((deleted > 0).then_some(()), "Bookshelf entry")?;

    tracing::info!(entry_id, user_id = requester.id, "Removed book from shelf");
    Ok(())
}

/// The requester's shelf, newest entry first
pub async fn list_shelf(db: &Database, requester: &Requester) -> Result<Vec<ShelfItem>> {
    let items = queries::list_shelf_items(db.pool(), requester.id).await?;
    tracing::debug!(user_id = requester.id, count = items.len(), "Listed shelf");
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::shelf::test_support;
    use crate::storage::models::Role;

    #[tokio::test]
    async fn test_add_twice_is_conflict() {
        let db = Database::new_in_memory().await.unwrap();
        let alice = test_support::requester(&db, "alice", Role::User).await;
        let book = test_support::book(&db, "Dune").await;

        let entry = add_to_shelf(&db, &alice, book).await.unwrap();
        assert_eq!(entry.book_id, book);

        let err = add_to_shelf(&db, &alice, book).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.user_message(), "Book is already on the bookshelf");
    }

    #[tokio::test]
    async fn test_add_unknown_book() {
        let db = Database::new_in_memory().await.unwrap();
        let alice = test_support::requester(&db, "alice", Role::User).await;

        let err = add_to_shelf(&db, &alice, 999).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_book_deleted_before_insert_is_not_found() {
        let db = Database::new_in_memory().await.unwrap();
        let alice = test_support::requester(&db, "alice", Role::User).await;
        let book = test_support::book(&db, "Dune").await;
        queries::delete_book(db.pool(), book).await.unwrap();

        let raw = queries::insert_entry(db.pool(), alice.id, book).await.unwrap_err();
        let err = shelf_insert_error(raw);
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.user_message(), "Book not found");
    }

    #[tokio::test]
    async fn test_same_book_on_two_shelves() {
        let db = Database::new_in_memory().await.unwrap();
        let alice = test_support::requester(&db, "alice", Role::User).await;
        let bob = test_support::requester(&db, "bob", Role::User).await;
        let book = test_support::book(&db, "Dune").await;

        add_to_shelf(&db, &alice, book).await.unwrap();
        add_to_shelf(&db, &bob, book).await.unwrap();

        assert_eq!(list_shelf(&db, &alice).await.unwrap().len(), 1);
        assert_eq!(list_shelf(&db, &bob).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_remove_foreign_entry_looks_missing() {
        let db = Database::new_in_memory().await.unwrap();
        let alice = test_support::requester(&db, "alice", Role::User).await;
        let bob = test_support::requester(&db, "bob", Role::User).await;
        let book = test_support::book(&db, "Dune").await;
        let entry = add_to_shelf(&db, &alice, book).await.unwrap();

        let foreign = remove_from_shelf(&db, &bob, entry.id).await.unwrap_err();
        let missing = remove_from_shelf(&db, &bob, entry.id + 100).await.unwrap_err();
        assert_eq!(foreign.kind(), ErrorKind::NotFound);
        assert_eq!(foreign.user_message(), missing.user_message());

        remove_from_shelf(&db, &alice, entry.id).await.unwrap();
        assert!(list_shelf(&db, &alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_newest_first_with_tags() {
        let db = Database::new_in_memory().await.unwrap();
        let alice = test_support::requester(&db, "alice", Role::User).await;
        let first = test_support::book(&db, "Dune").await;
        let second = test_support::book(&db, "Emma").await;

        let older = add_to_shelf(&db, &alice, first).await.unwrap();
        add_to_shelf(&db, &alice, second).await.unwrap();
        queries::insert_assignment(db.pool(), older.id, 3).await.unwrap();
        queries::insert_assignment(db.pool(), older.id, 1).await.unwrap();

        let shelf = list_shelf(&db, &alice).await.unwrap();
        assert_eq!(shelf[0].title, "Emma");
        assert!(shelf[0].tag_ids.is_empty());
        assert_eq!(shelf[1].title, "Dune");
        assert_eq!(shelf[1].tag_ids, vec![1, 3]);
    }
}
