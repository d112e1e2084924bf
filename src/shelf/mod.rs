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


//! Bookshelf services
//!
//! Every operation takes the requester as an explicit parameter and asks
//! `policy` before touching storage.
//!
//! # Modules
//! - `tags` - tag visibility and scoped tag mutation
//! - `entries` - adding, listing and removing shelf entries
//! - `assignments` - tag assignments, including the atomic replace
//! - `comments`, `reading_logs` - annotations on an entry
//! - `detail` - single-snapshot detail views

pub mod assignments;
pub mod comments;
pub mod detail;
pub mod entries;
pub mod reading_logs;
pub mod tags;

pub use assignments::{list_entry_tags, remove_tag_from_entry, set_tags_for_entry};
pub use comments::{add_comment, delete_comment, list_comments, update_comment};
pub use detail::{get_book_detail, get_bookshelf_entry_detail, BookDetail, BookshelfEntryDetail};
pub use entries::{add_to_shelf, list_shelf, remove_from_shelf};
pub use reading_logs::{add_reading_log, delete_reading_log, list_reading_logs, update_reading_log};
pub use tags::{create_tag, delete_tag, list_visible_tags, update_tag};
