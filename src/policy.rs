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


//! Ownership and visibility rules
//!
//! Every authorization decision in the crate goes through this module.
//!
//! # Rules
//! - A tag is visible to a requester when it is a system tag or their own
//! - A tag is mutable by admins when it is a system tag, and by its owner
//!   otherwise; an admin's own private tags are not reachable through the
//!   admin path
//! - Read paths conceal records the requester does not own as NotFound
//! - Annotation and assignment mutations on a non-owned entry are Forbidden

use crate::auth::Requester;
use crate::error::{ReshelveError, Result};
use crate::storage::models::{Tag, TagScope, VisibleTags};

/// Message returned for explicit ownership failures
pub const ACCESS_DENIED: &str = "Access denied";

/// Whether `requester` may see a tag in `scope`
pub fn is_visible(scope: TagScope, requester: &Requester) -> bool {
    match scope {
        TagScope::System => true,
        TagScope::OwnedBy(owner) => owner == requester.id,
    }
}

/// The one scope a requester's tag writes target
///
/// Admins create and edit system tags; everyone else works on their own.
pub fn mutation_scope(requester: &Requester) -> TagScope {
    if requester.is_admin() {
        TagScope::System
    } else {
        TagScope::OwnedBy(requester.id)
    }
}

/// Split visible tags by scope, keeping their order
///
/// Tags outside the requester's visibility are dropped.
pub fn partition_tags(tags: Vec<Tag>, requester: &Requester) -> VisibleTags {
    let all: Vec<Tag> = tags
        .into_iter()
        .filter(|tag| is_visible(tag.scope, requester))
        .collect();
    let (system, owned) = all.iter().cloned().partition(|tag| tag.scope.is_system());

    VisibleTags { system, owned, all }
}

/// Map "absent or not owned" to NotFound on a read path
///
/// Callers look records up with the ownership predicate already in the
/// query, so `None` covers both cases and the caller cannot tell them apart.
pub fn conceal_unowned<T>(found: Option<T>, what: &str) -> Result<T> {
    found.ok_or_else(|| {
        tracing::warn!(resource = what, "Record absent or not owned; reporting not found");
        ReshelveError::not_found(format!("{} not found", what))
    })
}

/// Require ownership on a mutation path; failure is Forbidden
pub fn require_owned<T>(found: Option<T>, requester: &Requester, what: &str) -> Result<T> {
    found.ok_or_else(|| {
        tracing::warn!(requester_id = requester.id, resource = what, "Ownership check failed");
        ReshelveError::forbidden(ACCESS_DENIED)
    })
}

/// Require the admin role for catalog writes
pub fn require_admin(requester: &Requester, action: &str) -> Result<()> {
    if requester.is_admin() {
        Ok(())
    } else {
        tracing::warn!(requester_id = requester.id, action, "Admin role required");
        Err(ReshelveError::forbidden(ACCESS_DENIED))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::storage::models::Role;

    fn requester(id: i64, role: Role) -> Requester {
        Requester {
            id,
            username: format!("user{}", id),
            email: format!("user{}@example.com", id),
            role,
        }
    }

    fn tag(id: i64, name: &str, scope: TagScope) -> Tag {
        Tag {
            id,
            name: name.to_string(),
            scope,
        }
    }

    #[test]
    fn test_visibility() {
        let alice = requester(1, Role::User);
        assert!(is_visible(TagScope::System, &alice));
        assert!(is_visible(TagScope::OwnedBy(1), &alice));
        assert!(!is_visible(TagScope::OwnedBy(2), &alice));
    }

    #[test]
    fn test_mutation_scope_is_visible_and_never_foreign() {
        let admin = requester(9, Role::Admin);
        let alice = requester(1, Role::User);

        for who in [&admin, &alice] {
            let scope = mutation_scope(who);
            assert!(is_visible(scope, who));
            // An admin's writes never land on a user's private tags
            assert_ne!(scope, TagScope::OwnedBy(2));
        }
        assert_ne!(mutation_scope(&alice), TagScope::System);
        assert_ne!(mutation_scope(&admin), TagScope::OwnedBy(9));
    }

    #[test]
    fn test_mutation_scope_follows_role() {
        assert_eq!(mutation_scope(&requester(9, Role::Admin)), TagScope::System);
        assert_eq!(mutation_scope(&requester(1, Role::User)), TagScope::OwnedBy(1));
    }

    #[test]
    fn test_partition_drops_foreign_tags() {
        let alice = requester(1, Role::User);
        let tags = vec![
            tag(1, "Favorites", TagScope::System),
            tag(6, "Holiday", TagScope::OwnedBy(1)),
            tag(7, "Secret", TagScope::OwnedBy(2)),
        ];

        let visible = partition_tags(tags, &alice);
        assert_eq!(visible.system.len(), 1);
        assert_eq!(visible.owned[0].name, "Holiday");
        assert_eq!(visible.all.len(), 2);
        assert!(visible.all.iter().all(|t| t.id != 7));
    }

    #[test]
    fn test_conceal_and_require() {
        let alice = requester(1, Role::User);

        assert_eq!(conceal_unowned(Some(5), "Entry").unwrap(), 5);
        let err = conceal_unowned::<i64>(None, "Entry").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.user_message(), "Entry not found");

        let err = require_owned::<i64>(None, &alice, "Entry").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Forbidden);
        assert_eq!(err.user_message(), ACCESS_DENIED);

        assert!(require_admin(&alice, "create book").is_err());
        assert!(require_admin(&requester(9, Role::Admin), "create book").is_ok());
    }
}
