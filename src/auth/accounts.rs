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


//! Account operations: registration, login, deletion

use crate::auth::identity::Requester;
use crate::auth::password::PasswordHasher;
use crate::error::{translate_store_error, ReshelveError, Result};
use crate::policy;
use crate::storage::models::{NewUser, Role, User};
use crate::storage::{users, Database};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

fn required<'a>(value: &'a str, field: &str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ReshelveError::missing_field(field));
    }
    Ok(value)
}

/// Register a new account with the `user` role
///
/// Duplicate email or username is a Conflict naming the field.
pub async fn register(
    db: &Database,
    hasher: &dyn PasswordHasher,
    email: &str,
    username: &str,
    password: &str,
) -> Result<User> {
    let email = required(email, "email")?;
    let username = required(username, "username")?;
    if password.is_empty() {
        return Err(ReshelveError::missing_field("password"));
    }
    if !email.contains('@') {
        return Err(ReshelveError::invalid_input("Invalid email address"));
    }

    let new_user = NewUser {
        email: email.to_string(),
        username: username.to_string(),
        password_hash: hasher.hash(password)?,
        role: Role::User,
    };

    let user_id = users::insert_user(db.pool(), &new_user)
        .await
        .map_err(translate_store_error)?;

    tracing::info!(user_id, username, "Registered user");

    users::find_user_by_id(db.pool(), user_id)
        .await?
        .ok_or_else(|| ReshelveError::internal("User vanished after insert"))
}

/// Check credentials and return the requester identity
///
/// Unknown email and wrong password fail identically.
pub async fn login(
    db: &Database,
    hasher: &dyn PasswordHasher,
    email: &str,
    password: &str,
) -> Result<Requester> {
    let Some(user) = users::find_user_by_email(db.pool(), email.trim()).await? else {
        tracing::debug!("Login for unknown email");
        return Err(ReshelveError::AuthenticationFailed(INVALID_CREDENTIALS.to_string()));
    };

    if !hasher.verify(password, &user.password_hash)? {
        tracing::warn!(user_id = user.id, "Login with wrong password");
        return Err(ReshelveError::AuthenticationFailed(INVALID_CREDENTIALS.to_string()));
    }

    tracing::debug!(user_id = user.id, "Login succeeded");
    Ok(Requester::from(user))
}

/// Delete an account together with its tags and shelf
///
/// Allowed for the account itself and for admins; anyone else gets NotFound.
pub async fn delete_user(db: &Database, requester: &Requester, user_id: i64) -> Result<()> {
    let permitted = requester.id == user_id || requester.is_admin();
    if !permitted {
        return policy::conceal_unowned::<()>(None, "User");
    }

    let deleted = users::delete_user(db.pool(), user_id).await?;
    if deleted == 0 {
        return policy::conceal_unowned::<()>(None, "User");
    }

    tracing::info!(user_id, requester_id = requester.id, "Deleted user");
    Ok(())
}

/// Change a user's role (operator action, no requester)
pub async fn set_role(db: &Database, user_id: i64, role: Role) -> Result<User> {
    let updated = users::set_user_role(db.pool(), user_id, role).await?;
    if updated == 0 {
        return Err(ReshelveError::not_found("User not found"));
    }

    tracing::info!(user_id, role = role.as_str(), "Changed user role");
    users::find_user_by_id(db.pool(), user_id)
        .await?
        .ok_or_else(|| ReshelveError::not_found("User not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::Argon2Hasher;
    use crate::error::ErrorKind;

    fn hasher() -> Argon2Hasher {
        Argon2Hasher::with_params(8 * 1024, 1, 1).unwrap()
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let db = Database::new_in_memory().await.unwrap();
        let hasher = hasher();

        let user = register(&db, &hasher, "alice@example.com", "alice", "s3cret")
            .await
            .expect("Failed to register");
        assert_eq!(user.role(), Role::User);
        assert_ne!(user.password_hash, "s3cret");

        let requester = login(&db, &hasher, "alice@example.com", "s3cret").await.unwrap();
        assert_eq!(requester.id, user.id);
        assert_eq!(requester.username, "alice");
        assert!(!requester.is_admin());
    }

    #[tokio::test]
    async fn test_duplicate_fields_name_the_field() {
        let db = Database::new_in_memory().await.unwrap();
        let hasher = hasher();
        register(&db, &hasher, "alice@example.com", "alice", "pw").await.unwrap();

        let err = register(&db, &hasher, "alice@example.com", "other", "pw")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.user_message(), "Email already exists");

        let err = register(&db, &hasher, "other@example.com", "alice", "pw")
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Username already exists");
    }

    #[tokio::test]
    async fn test_bad_credentials_look_the_same() {
        let db = Database::new_in_memory().await.unwrap();
        let hasher = hasher();
        register(&db, &hasher, "alice@example.com", "alice", "pw").await.unwrap();

        let wrong_password = login(&db, &hasher, "alice@example.com", "nope").await.unwrap_err();
        let unknown_email = login(&db, &hasher, "bob@example.com", "pw").await.unwrap_err();

        assert_eq!(wrong_password.kind(), ErrorKind::Unauthorized);
        assert_eq!(wrong_password.user_message(), unknown_email.user_message());
    }

    #[tokio::test]
    async fn test_register_validation() {
        let db = Database::new_in_memory().await.unwrap();
        let hasher = hasher();

        let err = register(&db, &hasher, "  ", "alice", "pw").await.unwrap_err();
        assert_eq!(err.user_message(), "email is required");
        let err = register(&db, &hasher, "alice", "alice", "pw").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        let err = register(&db, &hasher, "a@example.com", "alice", "").await.unwrap_err();
        assert_eq!(err.user_message(), "password is required");
    }

    #[tokio::test]
    async fn test_delete_user_is_self_or_admin() {
        let db = Database::new_in_memory().await.unwrap();
        let hasher = hasher();
        let alice = Requester::from(register(&db, &hasher, "a@example.com", "alice", "pw").await.unwrap());
        let bob = Requester::from(register(&db, &hasher, "b@example.com", "bob", "pw").await.unwrap());

        let err = delete_user(&db, &bob, alice.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let admin = Requester::from(set_role(&db, bob.id, Role::Admin).await.unwrap());
        delete_user(&db, &admin, alice.id).await.expect("admin may delete");
        let err = delete_user(&db, &admin, alice.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        delete_user(&db, &admin, admin.id).await.expect("self delete");
    }
}
