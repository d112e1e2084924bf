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


//! User account storage operations
//!
//! Functions for saving and retrieving user rows from SQLite. Password
//! hashing happens before anything reaches this module.

use crate::error::Result;
use crate::storage::models::{NewUser, Role, User};
use chrono::Utc;
use sqlx::SqlitePool;

/// Insert a new user
///
/// # Arguments
/// * `pool` - Database connection pool
/// * `user` - User fields with the password already hashed
///
/// # Returns
/// The new user id. Duplicate email or username surfaces as the raw
/// unique violation so the caller can name the field.
pub async fn insert_user(pool: &SqlitePool, user: &NewUser) -> std::result::Result<i64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO users (email, username, password_hash, created_at, role_id)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&user.email)
    .bind(&user.username)
    .bind(&user.password_hash)
    .bind(Utc::now())
    .bind(user.role.id())
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Get user by id
pub async fn find_user_by_id(pool: &SqlitePool, user_id: i64) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

/// Get user by email (login lookup)
pub async fn find_user_by_email(pool: &SqlitePool, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

/// Change a user's role; returns rows affected
pub async fn set_user_role(pool: &SqlitePool, user_id: i64, role: Role) -> Result<u64> {
    let result = sqlx::query("UPDATE users SET role_id = ? WHERE id = ?")
        .bind(role.id())
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Delete user; returns rows affected
///
/// The user's private tags and shelf entries (with everything hanging off
/// them) are removed by ON DELETE CASCADE.
pub async fn delete_user(pool: &SqlitePool, user_id: i64) -> Result<u64> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{constraint_of, Constraint};
    use crate::storage::database::Database;

    fn new_user(name: &str) -> NewUser {
        NewUser {
            email: format!("{}@example.com", name),
            username: name.to_string(),
            password_hash: "hash".to_string(),
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_user() {
        let db = Database::new_in_memory().await.unwrap();
        let id = insert_user(db.pool(), &new_user("alice")).await.unwrap();

        let user = find_user_by_email(db.pool(), "alice@example.com")
            .await
            .unwrap()
            .expect("user should exist");
        assert_eq!(user.id, id);
        assert_eq!(user.role(), Role::User);

        assert!(find_user_by_id(db.pool(), id + 1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_unique_violation() {
        let db = Database::new_in_memory().await.unwrap();
        insert_user(db.pool(), &new_user("alice")).await.unwrap();

        let mut dup = new_user("alice2");
        dup.email = "alice@example.com".to_string();
        let err = insert_user(db.pool(), &dup).await.unwrap_err();

        assert_eq!(
            constraint_of(&err),
            Some(Constraint::Unique("users.email".to_string()))
        );
    }

    #[tokio::test]
    async fn test_promote_and_delete() {
        let db = Database::new_in_memory().await.unwrap();
        let id = insert_user(db.pool(), &new_user("alice")).await.unwrap();

        assert_eq!(set_user_role(db.pool(), id, Role::Admin).await.unwrap(), 1);
        let user = find_user_by_id(db.pool(), id).await.unwrap().unwrap();
        assert!(user.role().is_admin());

        assert_eq!(delete_user(db.pool(), id).await.unwrap(), 1);
        assert_eq!(delete_user(db.pool(), id).await.unwrap(), 0);
        assert!(find_user_by_id(db.pool(), id).await.unwrap().is_none());
    }
}
