//! Repository trait definitions

use std::sync::Arc;

use crate::api::ListFilter;
use crate::iam::{Group, Policy, User};

use super::error::StorageResult;
use super::MemoryRepo;

/// Storage for users
///
/// Implementations must be thread-safe. Each call is atomic on its own;
/// callers get no atomicity across calls.
pub trait UserRepo: Send + Sync {
    /// Stores a new user. External ids are unique.
    fn add_user(&self, user: User) -> StorageResult<User>;

    fn get_user_by_external_id(&self, external_id: &str) -> StorageResult<User>;

    fn get_user_by_id(&self, id: &str) -> StorageResult<User>;

    /// Lists users matching the filter, returning the page and the total count.
    fn get_users_filtered(&self, filter: &ListFilter) -> StorageResult<(Vec<User>, usize)>;

    /// Replaces the stored user with the same id.
    fn update_user(&self, user: User) -> StorageResult<User>;

    /// Removes a user and its group memberships.
    fn remove_user(&self, id: &str) -> StorageResult<()>;

    /// Groups the user is a member of.
    fn get_groups_by_user_id(&self, user_id: &str) -> StorageResult<Vec<Group>>;
}

/// Storage for groups, memberships and policy attachments
pub trait GroupRepo: Send + Sync {
    /// Stores a new group. `(org, name)` is unique.
    fn add_group(&self, group: Group) -> StorageResult<Group>;

    fn get_group_by_name(&self, org: &str, name: &str) -> StorageResult<Group>;

    fn get_group_by_id(&self, id: &str) -> StorageResult<Group>;

    fn get_groups_filtered(&self, filter: &ListFilter) -> StorageResult<(Vec<Group>, usize)>;

    /// Replaces the stored group with the same id.
    fn update_group(&self, group: Group) -> StorageResult<Group>;

    /// Removes a group, its memberships and its attachments.
    fn remove_group(&self, id: &str) -> StorageResult<()>;

    /// Adds a membership. Duplicates fail with `AlreadyExists`.
    fn add_member(&self, user_id: &str, group_id: &str) -> StorageResult<()>;

    fn remove_member(&self, user_id: &str, group_id: &str) -> StorageResult<()>;

    fn is_member_of_group(&self, user_id: &str, group_id: &str) -> StorageResult<bool>;

    fn get_group_members(&self, group_id: &str) -> StorageResult<Vec<User>>;

    /// Attaches a policy. Duplicates fail with `AlreadyExists`.
    fn attach_policy(&self, group_id: &str, policy_id: &str) -> StorageResult<()>;

    fn detach_policy(&self, group_id: &str, policy_id: &str) -> StorageResult<()>;

    fn is_attached_to_group(&self, group_id: &str, policy_id: &str) -> StorageResult<bool>;

    fn get_attached_policies(&self, group_id: &str) -> StorageResult<Vec<Policy>>;
}

/// Storage for policies
pub trait PolicyRepo: Send + Sync {
    /// Stores a new policy. `(org, name)` is unique.
    fn add_policy(&self, policy: Policy) -> StorageResult<Policy>;

    fn get_policy_by_name(&self, org: &str, name: &str) -> StorageResult<Policy>;

    fn get_policy_by_id(&self, id: &str) -> StorageResult<Policy>;

    fn get_policies_filtered(&self, filter: &ListFilter) -> StorageResult<(Vec<Policy>, usize)>;

    /// Replaces the stored policy (statements included) with the same id.
    fn update_policy(&self, policy: Policy) -> StorageResult<Policy>;

    /// Removes a policy and its attachments.
    fn remove_policy(&self, id: &str) -> StorageResult<()>;

    /// Groups the policy is attached to.
    fn get_attached_groups(&self, policy_id: &str) -> StorageResult<Vec<Group>>;
}

/// The set of repositories the APIs work against
#[derive(Clone)]
pub struct Repo {
    pub user_repo: Arc<dyn UserRepo>,
    pub group_repo: Arc<dyn GroupRepo>,
    pub policy_repo: Arc<dyn PolicyRepo>,
}

impl Repo {
    /// Use one backend for every repository
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: UserRepo + GroupRepo + PolicyRepo + 'static,
    {
        Repo {
            user_repo: backend.clone(),
            group_repo: backend.clone(),
            policy_repo: backend,
        }
    }

    /// Repositories backed by a fresh [`MemoryRepo`]
    pub fn in_memory() -> Self {
        Self::from_backend(MemoryRepo::new_shared())
    }
}
