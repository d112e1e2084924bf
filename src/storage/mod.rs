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


//! Database storage and models
//!
//! This module handles all database operations using SQLite via sqlx.
//!
//! # Database Schema
//! - roles, users: accounts and their single role
//! - books: the shared catalog
//! - bookshelf: one row per (user, book) pair
//! - comments, reading_logs: annotations hanging off a shelf entry
//! - tags: system tags (no owner) and user tags
//! - bookshelf_tags: tag assignments
//!
//! # Usage Example
//! ```no_run
//! use reshelve_core::storage::{queries, Database, NewBook};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::new("./reshelve.db").await?;
//!
//! let book_id = queries::insert_book(db.pool(), &NewBook::new("Dune", "Frank Herbert", "SF")).await?;
//! let book = queries::find_book_by_id(db.pool(), book_id).await?;
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;
pub mod users;

// Re-export commonly used types
pub use database::Database;
pub use models::{
    Book, BookshelfEntry, Comment, EntryWithBook, NewBook, NewReadingLog, NewUser, ReadingLog,
    Role, ShelfItem, Tag, TagScope, User, VisibleTags,
};
