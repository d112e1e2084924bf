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


//! Tag visibility and scoped mutation
//!
//! Updates and deletes are a single conditional statement whose predicate
//! is the requester's role path. A tag outside that path and a tag that
//! does not exist both come back as "nothing changed".

use crate::auth::Requester;
use crate::error::{ReshelveError, Result};
use crate::policy;
use crate::storage::models::{Tag, VisibleTags};
use crate::storage::{queries, Database};

fn tag_name(name: &str) -> Result<&str> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ReshelveError::missing_field("name"));
    }
    Ok(name)
}

/// System tags plus the requester's own, partitioned by scope
pub async fn list_visible_tags(db: &Database, requester: &Requester) -> Result<VisibleTags> {
    let tags = queries::list_visible_tags(db.pool(), requester.id).await?;
    tracing::debug!(requester_id = requester.id, count = tags.len(), "Listed visible tags");
    Ok(policy::partition_tags(tags, requester))
}

/// Create a tag; admins create system tags, everyone else private ones
///
/// Duplicate names are allowed.
pub async fn create_tag(db: &Database, requester: &Requester, name: &str) -> Result<Tag> {
    let name = tag_name(name)?;
    let scope = policy::mutation_scope(requester);

    let tag = queries::insert_tag(db.pool(), name, scope).await?;
    tracing::info!(tag_id = tag.id, requester_id = requester.id, system = scope.is_system(), "Created tag");
    Ok(tag)
}

/// Rename a tag within the requester's mutation scope
///
/// Returns `None` when nothing was updated.
pub async fn update_tag(
    db: &Database,
    requester: &Requester,
    tag_id: i64,
    name: &str,
) -> Result<Option<Tag>> {
    let name = tag_name(name)?;
    let scope = policy::mutation_scope(requester);

    let updated = queries::update_tag_in_scope(db.pool(), tag_id, scope, name).await?;
    match &updated {
        Some(_) => tracing::info!(tag_id, requester_id = requester.id, "Renamed tag"),
        None => tracing::debug!(tag_id, requester_id = requester.id, "Tag rename matched no rows"),
    }
    Ok(updated)
}

/// Delete a tag within the requester's mutation scope
///
/// Returns whether a tag was deleted. Its assignments go with it.
pub async fn delete_tag(db: &Database, requester: &Requester, tag_id: i64) -> Result<bool> {
    let scope = policy::mutation_scope(requester);

    let deleted = queries::delete_tag_in_scope(db.pool(), tag_id, scope).await? > 0;
    if deleted {
        tracing::info!(tag_id, requester_id = requester.id, "Deleted tag");
    } else {
        tracing::debug!(tag_id, requester_id = requester.id, "Tag delete matched no rows");
    }
    Ok(deleted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shelf::test_support;
    use crate::storage::models::{Role, TagScope};

    #[tokio::test]
    async fn test_new_user_sees_only_system_tags() {
        let db = Database::new_in_memory().await.unwrap();
        let alice = test_support::requester(&db, "alice", Role::User).await;

        let visible = list_visible_tags(&db, &alice).await.unwrap();
        let names: Vec<&str> = visible.system.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Abandoned", "Favorites", "Finished", "Plan to Read", "Reading"]
        );
        assert!(visible.owned.is_empty());
        assert_eq!(visible.all, visible.system);
    }

    #[tokio::test]
    async fn test_create_scope_follows_role() {
        let db = Database::new_in_memory().await.unwrap();
        let alice = test_support::requester(&db, "alice", Role::User).await;
        let admin = test_support::requester(&db, "root", Role::Admin).await;

        let private = create_tag(&db, &alice, " Holiday ").await.unwrap();
        assert_eq!(private.name, "Holiday");
        assert_eq!(private.scope, TagScope::OwnedBy(alice.id));

        let shared = create_tag(&db, &admin, "Classics").await.unwrap();
        assert_eq!(shared.scope, TagScope::System);

        // Duplicate names are fine
        create_tag(&db, &alice, "Holiday").await.unwrap();

        let visible = list_visible_tags(&db, &alice).await.unwrap();
        assert_eq!(visible.owned.len(), 2);
        assert_eq!(visible.system.len(), 6);
        assert_eq!(visible.all.len(), 8);
    }

    #[tokio::test]
    async fn test_blank_name_rejected() {
        let db = Database::new_in_memory().await.unwrap();
        let alice = test_support::requester(&db, "alice", Role::User).await;
        let err = create_tag(&db, &alice, "   ").await.unwrap_err();
        assert_eq!(err.user_message(), "name is required");
    }

    #[tokio::test]
    async fn test_same_name_tags_order_by_id() {
        let db = Database::new_in_memory().await.unwrap();
        let alice = test_support::requester(&db, "alice", Role::User).await;

        let first = create_tag(&db, &alice, "Shared").await.unwrap();
        let alpha = create_tag(&db, &alice, "Alpha").await.unwrap();
        let second = create_tag(&db, &alice, "Shared").await.unwrap();
        assert!(first.id < second.id);

        let visible = list_visible_tags(&db, &alice).await.unwrap();
        let owned: Vec<i64> = visible.owned.iter().map(|t| t.id).collect();
        assert_eq!(owned, vec![alpha.id, first.id, second.id]);

        let shared: Vec<i64> = visible
            .all
            .iter()
            .filter(|t| t.name == "Shared")
            .map(|t| t.id)
            .collect();
        assert_eq!(shared, vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn test_user_cannot_touch_system_tags() {
        let db = Database::new_in_memory().await.unwrap();
        let alice = test_support::requester(&db, "alice", Role::User).await;

        assert!(update_tag(&db, &alice, 1, "Mine").await.unwrap().is_none());
        assert!(!delete_tag(&db, &alice, 1).await.unwrap());

        let visible = list_visible_tags(&db, &alice).await.unwrap();
        assert!(visible.system.iter().any(|t| t.id == 1 && t.name == "Favorites"));
    }

    #[tokio::test]
    async fn test_admin_cannot_reach_own_private_tag() {
        let db = Database::new_in_memory().await.unwrap();
        let admin = test_support::requester(&db, "root", Role::Admin).await;

        // Admin tags are always created as system tags, so plant a private one directly
        let private = queries::insert_tag(db.pool(), "Admin Notes", TagScope::OwnedBy(admin.id))
            .await
            .unwrap();

        assert!(update_tag(&db, &admin, private.id, "Renamed").await.unwrap().is_none());
        assert!(!delete_tag(&db, &admin, private.id).await.unwrap());

        let renamed = update_tag(&db, &admin, 2, "Want to Read").await.unwrap().unwrap();
        assert_eq!(renamed.name, "Want to Read");
        assert!(delete_tag(&db, &admin, 5).await.unwrap());
    }
}
