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


//! Accounts and requester identity
//!
//! Token issuance and verification live outside this crate. What the core
//! needs is the decoded identity ([`Requester`]) passed to every operation,
//! plus registration and login against the `users` table.

pub mod accounts;
pub mod identity;
pub mod password;

pub use accounts::{delete_user, login, register, set_role};
pub use identity::Requester;
pub use password::{Argon2Hasher, PasswordHasher};
