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


//! Catalog management
//!
//! The shared book catalog. Anyone may read it; only admins write it.
//! A book that sits on any shelf cannot be deleted.

use crate::auth::Requester;
use crate::error::{constraint_of, translate_store_error, Constraint, ReshelveError, Result};
use crate::policy;
use crate::storage::models::{Book, NewBook};
use crate::storage::{queries, Database};

/// Trim text fields and reject missing required ones
fn normalize(book: &NewBook) -> Result<NewBook> {
    let mut book = book.clone();
    for (field, value) in [
        ("title", &mut book.title),
        ("author", &mut book.author),
        ("genre", &mut book.genre),
    ] {
        *value = value.trim().to_string();
        if value.is_empty() {
            return Err(ReshelveError::missing_field(field));
        }
    }

    // Blank optional text is the same as absent
    book.cover_url = book.cover_url.filter(|v| !v.trim().is_empty());
    book.description = book.description.filter(|v| !v.trim().is_empty());
    Ok(book)
}

pub async fn list_books(db: &Database) -> Result<Vec<Book>> {
    queries::list_books(db.pool()).await
}

pub async fn get_book(db: &Database, book_id: i64) -> Result<Book> {
    queries::find_book_by_id(db.pool(), book_id)
        .await?
        .ok_or_else(|| ReshelveError::not_found("Book not found"))
}

/// Add a book to the catalog (admin only)
pub async fn create_book(db: &Database, requester: &Requester, book: &NewBook) -> Result<Book> {
    policy::require_admin(requester, "create book")?;
    let book = normalize(book)?;

    let book_id = queries::insert_book(db.pool(), &book)
        .await
        .map_err(translate_store_error)?;

    tracing::info!(book_id, title = %book.title, "Created book");
    get_book(db, book_id).await
}

/// Replace a book's fields (admin only)
pub async fn update_book(
    db: &Database,
    requester: &Requester,
    book_id: i64,
    book: &NewBook,
) -> Result<Book> {
    policy::require_admin(requester, "update book")?;
    let book = normalize(book)?;

    let updated = queries::update_book(db.pool(), book_id, &book)
        .await
        .map_err(translate_store_error)?;
    if updated == 0 {
        return Err(ReshelveError::not_found("Book not found"));
    }

    tracing::info!(book_id, "Updated book");
    get_book(db, book_id).await
}

/// Remove a book from the catalog (admin only)
///
/// Conflict while any user still has it shelved.
pub async fn delete_book(db: &Database, requester: &Requester, book_id: i64) -> Result<()> {
    policy::require_admin(requester, "delete book")?;

    let deleted = match queries::delete_book(db.pool(), book_id).await {
        Ok(rows) => rows,
        Err(err) if constraint_of(&err) == Some(Constraint::ForeignKey) => {
            return Err(ReshelveError::conflict("Book is on a bookshelf and cannot be deleted"));
        }
        Err(err) => return Err(translate_store_error(err)),
    };
    if deleted == 0 {
        return Err(ReshelveError::not_found("Book not found"));
    }

    tracing::info!(book_id, "Deleted book");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::storage::models::Role;

    fn admin() -> Requester {
        Requester {
            id: 1,
            username: "admin".into(),
            email: "admin@example.com".into(),
            role: Role::Admin,
        }
    }

    fn reader() -> Requester {
        Requester {
            id: 2,
            username: "reader".into(),
            email: "reader@example.com".into(),
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn test_admin_creates_and_updates() {
        let db = Database::new_in_memory().await.unwrap();

        let mut new_book = NewBook::new("  Dune ", "Frank Herbert", "SF");
        new_book.cover_url = Some("   ".into());
        let book = create_book(&db, &admin(), &new_book).await.unwrap();
        assert_eq!(book.title, "Dune");
        assert_eq!(book.cover_url, None);

        let mut changes = NewBook::new("Dune", "Frank Herbert", "Science Fiction");
        changes.published_year = Some(1965);
        let book = update_book(&db, &admin(), book.id, &changes).await.unwrap();
        assert_eq!(book.genre, "Science Fiction");
        assert_eq!(book.published_year, Some(1965));

        let err = update_book(&db, &admin(), book.id + 100, &changes).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_non_admin_is_forbidden() {
        let db = Database::new_in_memory().await.unwrap();
        let err = create_book(&db, &reader(), &NewBook::new("Dune", "Frank Herbert", "SF"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        assert!(list_books(&db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_title_conflict() {
        let db = Database::new_in_memory().await.unwrap();
        create_book(&db, &admin(), &NewBook::new("Dune", "Frank Herbert", "SF")).await.unwrap();

        let err = create_book(&db, &admin(), &NewBook::new("Dune", "Someone Else", "SF"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.user_message(), "Book with this title already exists");
    }

    #[tokio::test]
    async fn test_required_fields() {
        let db = Database::new_in_memory().await.unwrap();
        let err = create_book(&db, &admin(), &NewBook::new("Dune", "", "SF"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.user_message(), "author is required");
    }

    #[tokio::test]
    async fn test_delete_missing_book() {
        let db = Database::new_in_memory().await.unwrap();
        let err = delete_book(&db, &admin(), 42).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = get_book(&db, 42).await.unwrap_err();
        assert!(err.is_not_found());
    }
}
