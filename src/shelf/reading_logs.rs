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


//! Reading progress logs on shelf entries
//!
//! Same ownership rules as comments: mutations on a foreign entry are
//! Forbidden, listing one is NotFound.

use crate::auth::Requester;
use crate::error::{ReshelveError, Result};
use crate::policy;
use crate::storage::models::{NewReadingLog, ReadingLog};
use crate::storage::queries::{self, SortOrder};
use crate::storage::Database;
use chrono::Utc;

fn validate(log: &NewReadingLog) -> Result<()> {
    if log.start_page < 0 || log.end_page < 0 {
        return Err(ReshelveError::invalid_input("Page numbers must not be negative"));
    }
    if log.end_page < log.start_page {
        return Err(ReshelveError::invalid_input(
            "end_page must not be before start_page",
        ));
    }
    if log.duration_minutes.is_some_and(|minutes| minutes < 0) {
        return Err(ReshelveError::invalid_input("duration_minutes must not be negative"));
    }
    Ok(())
}

async fn owned_log(db: &Database, requester: &Requester, log_id: i64) -> Result<ReadingLog> {
    let log = queries::find_reading_log(db.pool(), log_id)
        .await?
        .ok_or_else(|| ReshelveError::not_found("Reading log not found"))?;

    let entry = queries::find_owned_entry(db.pool(), log.bookshelf_id, requester.id).await?;
    policy::require_owned(entry, requester, "Reading log")?;
    Ok(log)
}

/// Record a reading session; the date defaults to today (UTC)
pub async fn add_reading_log(
    db: &Database,
    requester: &Requester,
    entry_id: i64,
    log: &NewReadingLog,
) -> Result<ReadingLog> {
    let entry = queries::find_owned_entry(db.pool(), entry_id, requester.id).await?;
    policy::require_owned(entry, requester, "Bookshelf entry")?;
    validate(log)?;

    let date = log.date.unwrap_or_else(|| Utc::now().date_naive());
    let created = queries::insert_reading_log(db.pool(), entry_id, log, date).await?;

    tracing::info!(log_id = created.id, entry_id, pages = created.pages_read(), "Added reading log");
    Ok(created)
}

/// Logs of an owned entry, most recent date first
pub async fn list_reading_logs(
    db: &Database,
    requester: &Requester,
    entry_id: i64,
) -> Result<Vec<ReadingLog>> {
    let entry = queries::find_owned_entry(db.pool(), entry_id, requester.id).await?;
    policy::conceal_unowned(entry, "Bookshelf entry")?;

    queries::list_reading_logs(db.pool(), entry_id, SortOrder::Descending).await
}

/// Replace the page range and duration of a log; the date is kept
pub async fn update_reading_log(
    db: &Database,
    requester: &Requester,
    log_id: i64,
    log: &NewReadingLog,
) -> Result<ReadingLog> {
    owned_log(db, requester, log_id).await?;
    validate(log)?;

    let updated = queries::update_reading_log(db.pool(), log_id, log)
        .await?
        .ok_or_else(|| ReshelveError::not_found("Reading log not found"))?;

    tracing::info!(log_id, "Updated reading log");
    Ok(updated)
}

pub async fn delete_reading_log(db: &Database, requester: &Requester, log_id: i64) -> Result<()> {
    owned_log(db, requester, log_id).await?;

    if queries::delete_reading_log(db.pool(), log_id).await? == 0 {
        return Err(ReshelveError::not_found("Reading log not found"));
    }

    tracing::info!(log_id, "Deleted reading log");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::shelf::{add_to_shelf, test_support};
    use crate::storage::models::Role;
    use chrono::NaiveDate;

    fn dated(start: i32, end: i32, day: u32) -> NewReadingLog {
        NewReadingLog {
            date: NaiveDate::from_ymd_opt(2024, 3, day),
            ..NewReadingLog::new(start, end)
        }
    }

    #[tokio::test]
    async fn test_log_lifecycle() {
        let db = Database::new_in_memory().await.unwrap();
        let alice = test_support::requester(&db, "alice", Role::User).await;
        let book = test_support::book(&db, "Dune").await;
        let entry = add_to_shelf(&db, &alice, book).await.unwrap();

        let early = add_reading_log(&db, &alice, entry.id, &dated(0, 40, 1)).await.unwrap();
        add_reading_log(&db, &alice, entry.id, &dated(40, 90, 5)).await.unwrap();

        let listed = list_reading_logs(&db, &alice, entry.id).await.unwrap();
        assert_eq!(listed[0].start_page, 40);
        assert_eq!(listed[1].id, early.id);

        let mut changes = NewReadingLog::new(0, 55);
        changes.duration_minutes = Some(30);
        let updated = update_reading_log(&db, &alice, early.id, &changes).await.unwrap();
        assert_eq!(updated.pages_read(), 55);
        assert_eq!(updated.duration_minutes, Some(30));
        assert_eq!(updated.date, early.date);

        delete_reading_log(&db, &alice, early.id).await.unwrap();
        assert_eq!(list_reading_logs(&db, &alice, entry.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_date_defaults_to_today() {
        let db = Database::new_in_memory().await.unwrap();
        let alice = test_support::requester(&db, "alice", Role::User).await;
        let book = test_support::book(&db, "Dune").await;
        let entry = add_to_shelf(&db, &alice, book).await.unwrap();

        let before = Utc::now().date_naive();
        let log = add_reading_log(&db, &alice, entry.id, &NewReadingLog::new(1, 2)).await.unwrap();
        let after = Utc::now().date_naive();
        assert!(log.date == before || log.date == after);
    }

    #[tokio::test]
    async fn test_invalid_ranges() {
        let db = Database::new_in_memory().await.unwrap();
        let alice = test_support::requester(&db, "alice", Role::User).await;
        let book = test_support::book(&db, "Dune").await;
        let entry = add_to_shelf(&db, &alice, book).await.unwrap();

        for bad in [
            NewReadingLog::new(50, 10),
            NewReadingLog::new(-1, 10),
            NewReadingLog {
                duration_minutes: Some(-5),
                ..NewReadingLog::new(1, 2)
            },
        ] {
            let err = add_reading_log(&db, &alice, entry.id, &bad).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Validation);
        }
        assert!(list_reading_logs(&db, &alice, entry.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_foreign_log_mutations_forbidden() {
        let db = Database::new_in_memory().await.unwrap();
        let alice = test_support::requester(&db, "alice", Role::User).await;
        let bob = test_support::requester(&db, "bob", Role::User).await;
        let book = test_support::book(&db, "Dune").await;
        let entry = add_to_shelf(&db, &alice, book).await.unwrap();
        let log = add_reading_log(&db, &alice, entry.id, &dated(0, 10, 2)).await.unwrap();

        let err = add_reading_log(&db, &bob, entry.id, &dated(0, 10, 2)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        let err = update_reading_log(&db, &bob, log.id, &NewReadingLog::new(0, 99)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        let err = delete_reading_log(&db, &bob, log.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        let err = update_reading_log(&db, &alice, log.id + 50, &NewReadingLog::new(0, 1))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
