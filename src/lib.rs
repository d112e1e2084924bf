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


//! Reshelve core
//!
//! Ownership-scoped data model for a personal reading tracker: a shared
//! book catalog, per-user shelves, comments and reading logs on shelf
//! entries, and tags that are either system-wide or private to one user.
//!
//! Every operation takes the requester identity explicitly. Reads of
//! someone else's records look exactly like reads of missing records.
//!
//! ```no_run
//! use reshelve_core::{auth, shelf, Config, Database};
//!
//! # async fn example() -> reshelve_core::Result<()> {
//! let db = Database::from_config(&Config::load(None)?).await?;
//! let hasher = auth::Argon2Hasher::new();
//!
//! auth::register(&db, &hasher, "alice@example.com", "alice", "s3cret").await?;
//! let alice = auth::login(&db, &hasher, "alice@example.com", "s3cret").await?;
//!
//! let tags = shelf::list_visible_tags(&db, &alice).await?;
//! println!("{} system tags", tags.system.len());
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod catalog;
pub mod config;
pub mod error;
pub mod policy;
pub mod shelf;
pub mod storage;

pub use auth::Requester;
pub use config::Config;
pub use error::{ErrorKind, ReshelveError, Result};
pub use storage::Database;
