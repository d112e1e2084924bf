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


//! Error types for Reshelve
//!
//! This module defines error types using thiserror for ergonomic error handling.
//! Every variant belongs to one of a small set of caller-visible kinds
//! (see [`ErrorKind`]); the outer surface only ever needs the kind, the
//! status code and [`ReshelveError::user_message`].
//!
//! ## Kinds
//! - `Validation` - malformed input (missing field, bad page range)
//! - `Conflict` - uniqueness violation (duplicate title, duplicate shelf pair)
//! - `NotFound` - record absent, *or* present but not visible to the requester
//! - `Forbidden` - explicit authorization failure on owner-only mutations
//! - `Unauthorized` - login with bad credentials
//! - `Internal` - store or I/O failure; never shown to callers in detail

use thiserror::Error;

/// Result type alias using our ReshelveError type
pub type Result<T> = std::result::Result<T, ReshelveError>;

/// Caller-visible classification of an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    NotFound,
    Forbidden,
    Unauthorized,
    Internal,
}

/// Main error type for Reshelve
#[derive(Error, Debug)]
pub enum ReshelveError {
    // ===== Caller Errors =====

    /// Generic input validation error
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Required field is missing or blank
    #[error("Missing required field: {0}")]
    MissingRequiredField(String),

    /// Uniqueness or referential conflict with existing data
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Record not found, or not visible to the requester
    #[error("Record not found: {0}")]
    RecordNotFound(String),

    /// Requester does not own the record it tried to mutate
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Login failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    // ===== Database Errors =====

    /// Database schema migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database driver error from sqlx
    #[error("Database error: {0}")]
    SqlxError(#[source] sqlx::Error),

    // ===== Configuration Errors =====

    /// Configuration is invalid or incomplete
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Configuration file could not be parsed
    #[error("Configuration parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    // ===== General Errors =====

    /// Password hashing backend failure
    #[error("Password hashing failed: {0}")]
    PasswordHashing(String),

    /// Internal error that should not normally occur
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Every store failure that is not translated into a caller error passes
/// through here, so this is where it gets logged.
impl From<sqlx::Error> for ReshelveError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!(error = %err, "Unexpected store failure");
        ReshelveError::SqlxError(err)
    }
}

// Helper methods for creating common errors
impl ReshelveError {
    /// Create a RecordNotFound error with a resource name
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        ReshelveError::RecordNotFound(resource.into())
    }

    /// Create an InvalidInput error with a message
    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        ReshelveError::InvalidInput(message.into())
    }

    /// Create a MissingRequiredField error
    pub fn missing_field<S: Into<String>>(field: S) -> Self {
        ReshelveError::MissingRequiredField(field.into())
    }

    /// Create a Conflict error with a message
    pub fn conflict<S: Into<String>>(message: S) -> Self {
        ReshelveError::Conflict(message.into())
    }

    /// Create a Forbidden error with a message
    pub fn forbidden<S: Into<String>>(message: S) -> Self {
        ReshelveError::Forbidden(message.into())
    }

    /// Create an InternalError with a message
    pub fn internal<S: Into<String>>(message: S) -> Self {
        ReshelveError::InternalError(message.into())
    }

    /// Classify this error into the kind the caller sees
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReshelveError::InvalidInput(_) | ReshelveError::MissingRequiredField(_) => {
                ErrorKind::Validation
            }
            ReshelveError::Conflict(_) => ErrorKind::Conflict,
            ReshelveError::RecordNotFound(_) => ErrorKind::NotFound,
            ReshelveError::Forbidden(_) => ErrorKind::Forbidden,
            ReshelveError::AuthenticationFailed(_) => ErrorKind::Unauthorized,
            ReshelveError::MigrationFailed(_)
            | ReshelveError::SqlxError(_)
            | ReshelveError::InvalidConfiguration(_)
            | ReshelveError::TomlError(_)
            | ReshelveError::PasswordHashing(_)
            | ReshelveError::InternalError(_) => ErrorKind::Internal,
        }
    }

    /// Check if this is an unexpected failure rather than a caller error
    pub fn is_internal(&self) -> bool {
        self.kind() == ErrorKind::Internal
    }

    /// Check if the record was absent or concealed from the requester
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// HTTP-style status code for the error kind
    pub fn status_code(&self) -> u16 {
        match self.kind() {
            ErrorKind::Validation => 400,
            ErrorKind::Unauthorized => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::Internal => 500,
        }
    }

    /// Get message suitable for returning to a caller
    ///
    /// Caller errors carry their own message. Internal errors collapse to a
    /// generic message so storage details never leave the process.
    pub fn user_message(&self) -> String {
        match self {
            ReshelveError::InvalidInput(msg)
            | ReshelveError::Conflict(msg)
            | ReshelveError::RecordNotFound(msg)
            | ReshelveError::Forbidden(msg)
            | ReshelveError::AuthenticationFailed(msg) => msg.clone(),
            ReshelveError::MissingRequiredField(field) => format!("{} is required", field),
            _ => "Internal server error".to_string(),
        }
    }
}

// ============================================================================
// STORAGE CONSTRAINT TRANSLATION
// ============================================================================

/// Constraint violation reported by SQLite
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Constraint {
    /// UNIQUE/PRIMARY KEY violation; carries the `table.column` list from the message
    Unique(String),
    ForeignKey,
}

/// Classify a sqlx error as a constraint violation, if it is one
pub(crate) fn constraint_of(err: &sqlx::Error) -> Option<Constraint> {
    let sqlx::Error::Database(db_err) = err else {
        return None;
    };

    match db_err.kind() {
        sqlx::error::ErrorKind::UniqueViolation => {
            // "UNIQUE constraint failed: users.email"
            let target = db_err
                .message()
                .split_once(':')
                .map(|(_, columns)| columns.trim().to_string())
                .unwrap_or_default();
            Some(Constraint::Unique(target))
        }
        sqlx::error::ErrorKind::ForeignKeyViolation => Some(Constraint::ForeignKey),
        _ => None,
    }
}

/// Translate a store error into a caller-facing error
///
/// Uniqueness violations become `Conflict` with a field-specific message.
/// Everything else stays an internal error.
pub(crate) fn translate_store_error(err: sqlx::Error) -> ReshelveError {
    match constraint_of(&err) {
        Some(Constraint::Unique(target)) => {
            let message = match target.as_str() {
                "users.email" => "Email already exists",
                "users.username" => "Username already exists",
                "books.title" => "Book with this title already exists",
                "bookshelf.user_id, bookshelf.book_id" => "Book is already on the bookshelf",
                _ => "A record with this value already exists",
            };
            ReshelveError::conflict(message)
        }
        _ => ReshelveError::from(err),
    }
}
