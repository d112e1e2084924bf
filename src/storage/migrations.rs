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


//! Database migrations
//!
//! This module handles database schema creation and migrations.
//!
//! # Migration Strategy
//! sqlx's compile-time migration system requires a build-time database connection,
//! so migrations are runtime SQL execution tracked in `_migrations`.
//!
//! # Ownership Cascades
//! Every child table references its owner with `ON DELETE CASCADE`:
//! - users -> tags, bookshelf
//! - bookshelf -> comments, reading_logs, bookshelf_tags
//! - tags -> bookshelf_tags
//!
//! `bookshelf.book_id` is the one restricting reference: a catalog book
//! cannot disappear from under a user's shelf.

use crate::error::Result;
use sqlx::{Executor, SqlitePool};

/// Run all database migrations
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    create_migrations_table(pool).await?;

    run_migration(pool, 1, "initial_schema", create_initial_schema(pool)).await?;
    run_migration(pool, 2, "seed_roles_and_system_tags", seed_defaults(pool)).await?;

    Ok(())
}

/// Create migrations tracking table
async fn create_migrations_table(pool: &SqlitePool) -> Result<()> {
    pool.execute(
        r#"
        CREATE TABLE IF NOT EXISTS _migrations (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            applied_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .await?;

    Ok(())
}

/// Run a single migration if it hasn't been applied yet
async fn run_migration(
    pool: &SqlitePool,
    id: i32,
    name: &str,
    migration_fn: impl std::future::Future<Output = Result<()>>,
) -> Result<()> {
    let applied: Option<i32> = sqlx::query_scalar("SELECT id FROM _migrations WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    if applied.is_some() {
        return Ok(());
    }

    migration_fn.await?;

    sqlx::query("INSERT INTO _migrations (id, name) VALUES (?, ?)")
        .bind(id)
        .bind(name)
        .execute(pool)
        .await?;

    tracing::info!(id, name, "Applied migration");
    Ok(())
}

/// Create initial database schema
async fn create_initial_schema(pool: &SqlitePool) -> Result<()> {
    pool.execute(
        r#"
-- ============================================================================
-- ACCOUNTS
-- ============================================================================

CREATE TABLE IF NOT EXISTS roles (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    role_id INTEGER NOT NULL DEFAULT 1 REFERENCES roles(id)
);

-- ============================================================================
-- CATALOG
-- ============================================================================

CREATE TABLE IF NOT EXISTS books (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL UNIQUE,
    author TEXT NOT NULL,
    genre TEXT NOT NULL,
    cover_url TEXT,
    description TEXT,
    published_year INTEGER
);

-- ============================================================================
-- BOOKSHELF AND ANNOTATIONS
-- ============================================================================

CREATE TABLE IF NOT EXISTS bookshelf (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    book_id INTEGER NOT NULL REFERENCES books(id) ON DELETE RESTRICT,
    UNIQUE (user_id, book_id)
);

CREATE TABLE IF NOT EXISTS comments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    bookshelf_id INTEGER NOT NULL REFERENCES bookshelf(id) ON DELETE CASCADE,
    content TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS reading_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    bookshelf_id INTEGER NOT NULL REFERENCES bookshelf(id) ON DELETE CASCADE,
    start_page INTEGER NOT NULL,
    end_page INTEGER NOT NULL,
    duration_minutes INTEGER,
    date TEXT NOT NULL DEFAULT CURRENT_DATE
);

-- ============================================================================
-- TAGS
-- ============================================================================

-- user_id NULL = system tag
CREATE TABLE IF NOT EXISTS tags (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    user_id INTEGER REFERENCES users(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS bookshelf_tags (
    bookshelf_id INTEGER NOT NULL REFERENCES bookshelf(id) ON DELETE CASCADE,
    tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
    PRIMARY KEY (bookshelf_id, tag_id)
);

-- ============================================================================
-- INDEXES
-- ============================================================================

CREATE INDEX IF NOT EXISTS idx_bookshelf_book ON bookshelf(book_id);
CREATE INDEX IF NOT EXISTS idx_comments_bookshelf ON comments(bookshelf_id, created_at);
CREATE INDEX IF NOT EXISTS idx_reading_logs_bookshelf ON reading_logs(bookshelf_id, date);
CREATE INDEX IF NOT EXISTS idx_tags_user ON tags(user_id, name);
CREATE INDEX IF NOT EXISTS idx_bookshelf_tags_tag ON bookshelf_tags(tag_id);
        "#,
    )
    .await?;

    Ok(())
}

/// Seed the fixed roles and system tags
async fn seed_defaults(pool: &SqlitePool) -> Result<()> {
    pool.execute(
        r#"
INSERT OR IGNORE INTO roles (id, name) VALUES
    (1, 'user'),
    (2, 'admin');

INSERT OR IGNORE INTO tags (id, name, user_id) VALUES
    (1, 'Favorites', NULL),
    (2, 'Plan to Read', NULL),
    (3, 'Reading', NULL),
    (4, 'Finished', NULL),
    (5, 'Abandoned', NULL);
        "#,
    )
    .await?;

    Ok(())
}
