//! In-memory repository implementation
//!
//! Tables are plain vectors behind a single `RwLock`, so listing without an
//! explicit order returns entities in insertion order.

use std::cmp::Ordering;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::api::{Direction, ListFilter};
use crate::iam::{Group, Policy, User};

use super::error::{StorageError, StorageResult};
use super::traits::{GroupRepo, PolicyRepo, UserRepo};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    groups: Vec<Group>,
    policies: Vec<Policy>,
    /// (group_id, user_id)
    members: Vec<(String, String)>,
    /// (group_id, policy_id)
    attachments: Vec<(String, String)>,
}

/// In-memory implementation of every repository trait
///
/// Uniqueness constraints are enforced under the write lock, so racing
/// inserts of the same key see exactly one success and `AlreadyExists` for
/// the rest.
#[derive(Debug, Default)]
pub struct MemoryRepo {
    tables: RwLock<Tables>,
}

impl MemoryRepo {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty repository wrapped in Arc.
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

/// Apply org/path filters, ordering and pagination
fn page<T: Clone>(
    items: &[T],
    filter: &ListFilter,
    keep: impl Fn(&T) -> bool,
    compare: impl Fn(&T, &T, &str) -> Ordering,
) -> (Vec<T>, usize) {
    let mut matched: Vec<T> = items.iter().filter(|item| keep(item)).cloned().collect();
    let total = matched.len();

    if let Some(order) = &filter.order_by {
        matched.sort_by(|a, b| {
            let ordering = compare(a, b, &order.column);
            match order.direction {
                Direction::Asc => ordering,
                Direction::Desc => ordering.reverse(),
            }
        });
    }

    let page = matched
        .into_iter()
        .skip(filter.offset)
        .take(filter.limit)
        .collect();
    (page, total)
}

fn org_matches(filter: &ListFilter, org: &str) -> bool {
    filter.org.as_deref().map_or(true, |wanted| wanted == org)
}

fn compare_users(a: &User, b: &User, column: &str) -> Ordering {
    match column {
        "externalID" => a.external_id.cmp(&b.external_id),
        "path" => a.path.cmp(&b.path),
        "urn" => a.urn.cmp(&b.urn),
        "updateAt" => a.update_at.cmp(&b.update_at),
        _ => a.create_at.cmp(&b.create_at),
    }
}

fn compare_groups(a: &Group, b: &Group, column: &str) -> Ordering {
    match column {
        "name" => a.name.cmp(&b.name),
        "path" => a.path.cmp(&b.path),
        "org" => a.org.cmp(&b.org),
        "urn" => a.urn.cmp(&b.urn),
        "updateAt" => a.update_at.cmp(&b.update_at),
        _ => a.create_at.cmp(&b.create_at),
    }
}

fn compare_policies(a: &Policy, b: &Policy, column: &str) -> Ordering {
    match column {
        "name" => a.name.cmp(&b.name),
        "path" => a.path.cmp(&b.path),
        "org" => a.org.cmp(&b.org),
        "urn" => a.urn.cmp(&b.urn),
        "updateAt" => a.update_at.cmp(&b.update_at),
        _ => a.create_at.cmp(&b.create_at),
    }
}

impl UserRepo for MemoryRepo {
    fn add_user(&self, user: User) -> StorageResult<User> {
        let mut tables = self.tables.write();
        if tables
            .users
            .iter()
            .any(|u| u.id == user.id || u.external_id == user.external_id)
        {
            return Err(StorageError::AlreadyExists {
                entity: "user",
                key: user.external_id,
            });
        }
        debug!("Storing user {}", user.external_id);
        tables.users.push(user.clone());
        Ok(user)
    }

    fn get_user_by_external_id(&self, external_id: &str) -> StorageResult<User> {
        self.tables
            .read()
            .users
            .iter()
            .find(|u| u.external_id == external_id)
            .cloned()
            .ok_or_else(|| StorageError::UserNotFound(external_id.to_string()))
    }

    fn get_user_by_id(&self, id: &str) -> StorageResult<User> {
        self.tables
            .read()
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| StorageError::UserNotFound(id.to_string()))
    }

    fn get_users_filtered(&self, filter: &ListFilter) -> StorageResult<(Vec<User>, usize)> {
        let tables = self.tables.read();
        Ok(page(
            &tables.users,
            filter,
            |u| u.path.starts_with(&filter.path_prefix),
            compare_users,
        ))
    }

    fn update_user(&self, user: User) -> StorageResult<User> {
        let mut tables = self.tables.write();
        let slot = tables
            .users
            .iter_mut()
            .find(|u| u.id == user.id)
            .ok_or_else(|| StorageError::UserNotFound(user.id.clone()))?;
        *slot = user.clone();
        Ok(user)
    }

    fn remove_user(&self, id: &str) -> StorageResult<()> {
        let mut tables = self.tables.write();
        let before = tables.users.len();
        tables.users.retain(|u| u.id != id);
        if tables.users.len() == before {
            return Err(StorageError::UserNotFound(id.to_string()));
        }
        tables.members.retain(|(_, user_id)| user_id != id);
        Ok(())
    }

    fn get_groups_by_user_id(&self, user_id: &str) -> StorageResult<Vec<Group>> {
        let tables = self.tables.read();
        Ok(tables
            .members
            .iter()
            .filter(|(_, member)| member == user_id)
            .filter_map(|(group_id, _)| tables.groups.iter().find(|g| &g.id == group_id))
            .cloned()
            .collect())
    }
}

impl GroupRepo for MemoryRepo {
    fn add_group(&self, group: Group) -> StorageResult<Group> {
        let mut tables = self.tables.write();
        if tables
            .groups
            .iter()
            .any(|g| g.id == group.id || (g.org == group.org && g.name == group.name))
        {
            return Err(StorageError::AlreadyExists {
                entity: "group",
                key: format!("{}/{}", group.org, group.name),
            });
        }
        debug!("Storing group {}", group.urn);
        tables.groups.push(group.clone());
        Ok(group)
    }

    fn get_group_by_name(&self, org: &str, name: &str) -> StorageResult<Group> {
        self.tables
            .read()
            .groups
            .iter()
            .find(|g| g.org == org && g.name == name)
            .cloned()
            .ok_or_else(|| StorageError::GroupNotFound(format!("{}/{}", org, name)))
    }

    fn get_group_by_id(&self, id: &str) -> StorageResult<Group> {
        self.tables
            .read()
            .groups
            .iter()
            .find(|g| g.id == id)
            .cloned()
            .ok_or_else(|| StorageError::GroupNotFound(id.to_string()))
    }

    fn get_groups_filtered(&self, filter: &ListFilter) -> StorageResult<(Vec<Group>, usize)> {
        let tables = self.tables.read();
        Ok(page(
            &tables.groups,
            filter,
            |g| org_matches(filter, &g.org) && g.path.starts_with(&filter.path_prefix),
            compare_groups,
        ))
    }

    fn update_group(&self, group: Group) -> StorageResult<Group> {
        let mut tables = self.tables.write();
        if tables
            .groups
            .iter()
            .any(|g| g.id != group.id && g.org == group.org && g.name == group.name)
        {
            return Err(StorageError::AlreadyExists {
                entity: "group",
                key: format!("{}/{}", group.org, group.name),
            });
        }
        let slot = tables
            .groups
            .iter_mut()
            .find(|g| g.id == group.id)
            .ok_or_else(|| StorageError::GroupNotFound(group.id.clone()))?;
        *slot = group.clone();
        Ok(group)
    }

    fn remove_group(&self, id: &str) -> StorageResult<()> {
        let mut tables = self.tables.write();
        let before = tables.groups.len();
        tables.groups.retain(|g| g.id != id);
        if tables.groups.len() == before {
            return Err(StorageError::GroupNotFound(id.to_string()));
        }
        tables.members.retain(|(group_id, _)| group_id != id);
        tables.attachments.retain(|(group_id, _)| group_id != id);
        Ok(())
    }

    fn add_member(&self, user_id: &str, group_id: &str) -> StorageResult<()> {
        let mut tables = self.tables.write();
        if tables
            .members
            .iter()
            .any(|(g, u)| g == group_id && u == user_id)
        {
            return Err(StorageError::AlreadyExists {
                entity: "membership",
                key: format!("{}/{}", group_id, user_id),
            });
        }
        tables
            .members
            .push((group_id.to_string(), user_id.to_string()));
        Ok(())
    }

    fn remove_member(&self, user_id: &str, group_id: &str) -> StorageResult<()> {
        let mut tables = self.tables.write();
        let before = tables.members.len();
        tables
            .members
            .retain(|(g, u)| !(g == group_id && u == user_id));
        if tables.members.len() == before {
            return Err(StorageError::MembershipNotFound {
                user_id: user_id.to_string(),
                group_id: group_id.to_string(),
            });
        }
        Ok(())
    }

    fn is_member_of_group(&self, user_id: &str, group_id: &str) -> StorageResult<bool> {
        Ok(self
            .tables
            .read()
            .members
            .iter()
            .any(|(g, u)| g == group_id && u == user_id))
    }

    fn get_group_members(&self, group_id: &str) -> StorageResult<Vec<User>> {
        let tables = self.tables.read();
        Ok(tables
            .members
            .iter()
            .filter(|(g, _)| g == group_id)
            .filter_map(|(_, user_id)| tables.users.iter().find(|u| &u.id == user_id))
            .cloned()
            .collect())
    }

    fn attach_policy(&self, group_id: &str, policy_id: &str) -> StorageResult<()> {
        let mut tables = self.tables.write();
        if tables
            .attachments
            .iter()
            .any(|(g, p)| g == group_id && p == policy_id)
        {
            return Err(StorageError::AlreadyExists {
                entity: "attachment",
                key: format!("{}/{}", group_id, policy_id),
            });
        }
        tables
            .attachments
            .push((group_id.to_string(), policy_id.to_string()));
        Ok(())
    }

    fn detach_policy(&self, group_id: &str, policy_id: &str) -> StorageResult<()> {
        let mut tables = self.tables.write();
        let before = tables.attachments.len();
        tables
            .attachments
            .retain(|(g, p)| !(g == group_id && p == policy_id));
        if tables.attachments.len() == before {
            return Err(StorageError::AttachmentNotFound {
                group_id: group_id.to_string(),
                policy_id: policy_id.to_string(),
            });
        }
        Ok(())
    }

    fn is_attached_to_group(&self, group_id: &str, policy_id: &str) -> StorageResult<bool> {
        Ok(self
            .tables
            .read()
            .attachments
            .iter()
            .any(|(g, p)| g == group_id && p == policy_id))
    }

    fn get_attached_policies(&self, group_id: &str) -> StorageResult<Vec<Policy>> {
        let tables = self.tables.read();
        Ok(tables
            .attachments
            .iter()
            .filter(|(g, _)| g == group_id)
            .filter_map(|(_, policy_id)| tables.policies.iter().find(|p| &p.id == policy_id))
            .cloned()
            .collect())
    }
}

impl PolicyRepo for MemoryRepo {
    fn add_policy(&self, policy: Policy) -> StorageResult<Policy> {
        let mut tables = self.tables.write();
        if tables
            .policies
            .iter()
            .any(|p| p.id == policy.id || (p.org == policy.org && p.name == policy.name))
        {
            return Err(StorageError::AlreadyExists {
                entity: "policy",
                key: format!("{}/{}", policy.org, policy.name),
            });
        }
        debug!(
            "Storing policy {} with {} statements",
            policy.urn,
            policy.statements.len()
        );
        tables.policies.push(policy.clone());
        Ok(policy)
    }

    fn get_policy_by_name(&self, org: &str, name: &str) -> StorageResult<Policy> {
        self.tables
            .read()
            .policies
            .iter()
            .find(|p| p.org == org && p.name == name)
            .cloned()
            .ok_or_else(|| StorageError::PolicyNotFound(format!("{}/{}", org, name)))
    }

    fn get_policy_by_id(&self, id: &str) -> StorageResult<Policy> {
        self.tables
            .read()
            .policies
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| StorageError::PolicyNotFound(id.to_string()))
    }

    fn get_policies_filtered(&self, filter: &ListFilter) -> StorageResult<(Vec<Policy>, usize)> {
        let tables = self.tables.read();
        Ok(page(
            &tables.policies,
            filter,
            |p| org_matches(filter, &p.org) && p.path.starts_with(&filter.path_prefix),
            compare_policies,
        ))
    }

    fn update_policy(&self, policy: Policy) -> StorageResult<Policy> {
        let mut tables = self.tables.write();
        if tables
            .policies
            .iter()
            .any(|p| p.id != policy.id && p.org == policy.org && p.name == policy.name)
        {
            return Err(StorageError::AlreadyExists {
                entity: "policy",
                key: format!("{}/{}", policy.org, policy.name),
            });
        }
        let slot = tables
            .policies
            .iter_mut()
            .find(|p| p.id == policy.id)
            .ok_or_else(|| StorageError::PolicyNotFound(policy.id.clone()))?;
        *slot = policy.clone();
        Ok(policy)
    }

    fn remove_policy(&self, id: &str) -> StorageResult<()> {
        let mut tables = self.tables.write();
        let before = tables.policies.len();
        tables.policies.retain(|p| p.id != id);
        if tables.policies.len() == before {
            return Err(StorageError::PolicyNotFound(id.to_string()));
        }
        tables.attachments.retain(|(_, policy_id)| policy_id != id);
        Ok(())
    }

    fn get_attached_groups(&self, policy_id: &str) -> StorageResult<Vec<Group>> {
        let tables = self.tables.read();
        Ok(tables
            .attachments
            .iter()
            .filter(|(_, p)| p == policy_id)
            .filter_map(|(group_id, _)| tables.groups.iter().find(|g| &g.id == group_id))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::OrderBy;
    use chrono::Utc;

    fn user(id: &str, external_id: &str, path: &str) -> User {
        let now = Utc::now();
        User {
            id: id.to_string(),
            external_id: external_id.to_string(),
            path: path.to_string(),
            urn: format!("urn:iws:iam::user{}{}", path, external_id),
            create_at: now,
            update_at: now,
        }
    }

    fn group(id: &str, org: &str, name: &str, path: &str) -> Group {
        let now = Utc::now();
        Group {
            id: id.to_string(),
            name: name.to_string(),
            path: path.to_string(),
            org: org.to_string(),
            urn: format!("urn:iws:iam:{}:group{}{}", org, path, name),
            create_at: now,
            update_at: now,
        }
    }

    fn policy(id: &str, org: &str, name: &str) -> Policy {
        let now = Utc::now();
        Policy {
            id: id.to_string(),
            name: name.to_string(),
            path: "/".to_string(),
            org: org.to_string(),
            urn: format!("urn:iws:iam:{}:policy/{}", org, name),
            create_at: now,
            update_at: now,
            statements: vec![],
        }
    }

    #[test]
    fn test_unique_external_id() {
        let repo = MemoryRepo::new();
        repo.add_user(user("1", "alice", "/")).unwrap();
        let err = repo.add_user(user("2", "alice", "/other/")).unwrap_err();
        assert!(matches!(err, StorageError::AlreadyExists { entity: "user", .. }));
    }

    #[test]
    fn test_group_name_unique_per_org() {
        let repo = MemoryRepo::new();
        repo.add_group(group("1", "org1", "devs", "/")).unwrap();
        repo.add_group(group("2", "org2", "devs", "/")).unwrap();
        assert!(repo.add_group(group("3", "org1", "devs", "/x/")).is_err());
    }

    #[test]
    fn test_duplicate_relations_rejected() {
        let repo = MemoryRepo::new();
        repo.add_member("u1", "g1").unwrap();
        assert!(matches!(
            repo.add_member("u1", "g1"),
            Err(StorageError::AlreadyExists { .. })
        ));
        repo.attach_policy("g1", "p1").unwrap();
        assert!(matches!(
            repo.attach_policy("g1", "p1"),
            Err(StorageError::AlreadyExists { .. })
        ));
    }

    #[test]
    fn test_remove_group_cascades_relations_only() {
        let repo = MemoryRepo::new();
        repo.add_user(user("u1", "alice", "/")).unwrap();
        repo.add_group(group("g1", "org1", "devs", "/")).unwrap();
        repo.add_policy(policy("p1", "org1", "readers")).unwrap();
        repo.add_member("u1", "g1").unwrap();
        repo.attach_policy("g1", "p1").unwrap();

        repo.remove_group("g1").unwrap();

        assert!(repo.get_groups_by_user_id("u1").unwrap().is_empty());
        assert!(repo.get_attached_groups("p1").unwrap().is_empty());
        assert!(repo.get_user_by_id("u1").is_ok());
        assert!(repo.get_policy_by_id("p1").is_ok());
    }

    #[test]
    fn test_remove_policy_cascades_attachments() {
        let repo = MemoryRepo::new();
        repo.add_group(group("g1", "org1", "devs", "/")).unwrap();
        repo.add_policy(policy("p1", "org1", "readers")).unwrap();
        repo.attach_policy("g1", "p1").unwrap();

        repo.remove_policy("p1").unwrap();
        assert!(!repo.is_attached_to_group("g1", "p1").unwrap());
        assert!(repo.get_group_by_id("g1").is_ok());
    }

    #[test]
    fn test_remove_missing_relation() {
        let repo = MemoryRepo::new();
        assert!(matches!(
            repo.remove_member("u1", "g1"),
            Err(StorageError::MembershipNotFound { .. })
        ));
        assert!(matches!(
            repo.detach_policy("g1", "p1"),
            Err(StorageError::AttachmentNotFound { .. })
        ));
    }

    #[test]
    fn test_filtered_listing() {
        let repo = MemoryRepo::new();
        repo.add_group(group("1", "org1", "c", "/dev/")).unwrap();
        repo.add_group(group("2", "org1", "a", "/dev/")).unwrap();
        repo.add_group(group("3", "org1", "b", "/ops/")).unwrap();
        repo.add_group(group("4", "org2", "d", "/dev/")).unwrap();

        let filter = ListFilter {
            org: Some("org1".to_string()),
            path_prefix: "/dev/".to_string(),
            ..Default::default()
        };
        let (groups, total) = repo.get_groups_filtered(&filter).unwrap();
        assert_eq!(total, 2);
        let names: Vec<_> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a"]);

        let filter = ListFilter {
            order_by: Some(OrderBy {
                column: "name".to_string(),
                direction: Direction::Desc,
            }),
            offset: 1,
            limit: 2,
            ..Default::default()
        };
        let (groups, total) = repo.get_groups_filtered(&filter).unwrap();
        assert_eq!(total, 4);
        let names: Vec<_> = groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["c", "b"]);
    }

    #[test]
    fn test_update_group_rename_conflict() {
        let repo = MemoryRepo::new();
        repo.add_group(group("1", "org1", "a", "/")).unwrap();
        repo.add_group(group("2", "org1", "b", "/")).unwrap();

        let mut renamed = repo.get_group_by_id("2").unwrap();
        renamed.name = "a".to_string();
        assert!(repo.update_group(renamed).is_err());

        let mut moved = repo.get_group_by_id("2").unwrap();
        moved.path = "/new/".to_string();
        assert_eq!(repo.update_group(moved).unwrap().path, "/new/");
    }
}
