//! User management

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use super::filter::{Filter, USER_COLUMNS};
use super::{log_operation, require, user_lookup, RequestInfo};
use crate::error::{IamError, Result};
use crate::iam::{User, UserGroups};
use crate::store::{Repo, StorageError};
use crate::urn::{build_urn, RESOURCE_USER};
use crate::validation::{valid_external_id, valid_path};

/// Create, read, update and delete users
#[derive(Clone)]
pub struct UsersApi {
    repo: Repo,
}

impl UsersApi {
    pub fn new(repo: Repo) -> Self {
        UsersApi { repo }
    }

    /// Register a user under `path`
    ///
    /// # Errors
    ///
    /// `InvalidParameter` for a malformed external id or path,
    /// `UserAlreadyExists` if the external id is taken.
    pub fn add_user(
        &self,
        request_info: &RequestInfo,
        external_id: &str,
        path: &str,
    ) -> Result<User> {
        require(valid_external_id(external_id), "externalId", external_id)?;
        require(valid_path(path), "path", path)?;

        match self.repo.user_repo.get_user_by_external_id(external_id) {
            Ok(_) => return Err(IamError::UserAlreadyExists(external_id.to_string())),
            Err(StorageError::UserNotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            external_id: external_id.to_string(),
            path: path.to_string(),
            urn: build_urn("", RESOURCE_USER, path, external_id),
            create_at: now,
            update_at: now,
        };

        let created = self.repo.user_repo.add_user(user).map_err(|e| match e {
            StorageError::AlreadyExists { .. } => {
                IamError::UserAlreadyExists(external_id.to_string())
            }
            other => other.into(),
        })?;

        log_operation(request_info, &format!("User created {}", created.urn));
        Ok(created)
    }

    pub fn get_user_by_external_id(&self, external_id: &str) -> Result<User> {
        require(valid_external_id(external_id), "externalId", external_id)?;
        debug!("Looking up user {}", external_id);
        self.repo
            .user_repo
            .get_user_by_external_id(external_id)
            .map_err(user_lookup(external_id))
    }

    /// List users, returning the requested page and the total match count
    pub fn list_users(&self, filter: Filter) -> Result<(Vec<User>, usize)> {
        let filter = filter.validate(USER_COLUMNS)?;
        Ok(self.repo.user_repo.get_users_filtered(&filter)?)
    }

    /// Move a user to `new_path`, recomputing its URN
    pub fn update_user(
        &self,
        request_info: &RequestInfo,
        external_id: &str,
        new_path: &str,
    ) -> Result<User> {
        require(valid_path(new_path), "path", new_path)?;
        let mut user = self.get_user_by_external_id(external_id)?;

        user.path = new_path.to_string();
        user.urn = build_urn("", RESOURCE_USER, new_path, external_id);
        user.update_at = Utc::now();

        let updated = self
            .repo
            .user_repo
            .update_user(user)
            .map_err(user_lookup(external_id))?;

        log_operation(request_info, &format!("User updated {}", updated.urn));
        Ok(updated)
    }

    /// Delete a user and drop it from every group
    pub fn remove_user(&self, request_info: &RequestInfo, external_id: &str) -> Result<()> {
        let user = self.get_user_by_external_id(external_id)?;
        self.repo
            .user_repo
            .remove_user(&user.id)
            .map_err(user_lookup(external_id))?;

        log_operation(request_info, &format!("User deleted {}", user.urn));
        Ok(())
    }

    /// Groups the user belongs to
    pub fn list_groups_by_user(&self, external_id: &str) -> Result<UserGroups> {
        let user = self.get_user_by_external_id(external_id)?;
        let groups = self.repo.user_repo.get_groups_by_user_id(&user.id)?;
        Ok(UserGroups { user, groups })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn api() -> (UsersApi, RequestInfo) {
        (UsersApi::new(Repo::in_memory()), RequestInfo::internal("admin"))
    }

    #[test]
    fn test_add_and_get_user() {
        let (users, info) = api();
        let user = users.add_user(&info, "alice", "/dev/").unwrap();
        assert_eq!(user.urn, "urn:iws:iam::user/dev/alice");
        assert_eq!(users.get_user_by_external_id("alice").unwrap(), user);
    }

    #[test]
    fn test_add_user_validation() {
        let (users, info) = api();
        let err = users.add_user(&info, "bad id", "/").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        let err = users.add_user(&info, "alice", "no-slash").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    fn test_duplicate_user() {
        let (users, info) = api();
        users.add_user(&info, "alice", "/").unwrap();
        let err = users.add_user(&info, "alice", "/other/").unwrap_err();
        assert!(matches!(err, IamError::UserAlreadyExists(_)));
    }

    #[test]
    fn test_update_user_moves_urn() {
        let (users, info) = api();
        users.add_user(&info, "alice", "/dev/").unwrap();
        let user = users.update_user(&info, "alice", "/ops/").unwrap();
        assert_eq!(user.path, "/ops/");
        assert_eq!(user.urn, "urn:iws:iam::user/ops/alice");
    }

    #[test]
    fn test_remove_missing_user() {
        let (users, info) = api();
        let err = users.remove_user(&info, "ghost").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_list_users_by_path() {
        let (users, info) = api();
        users.add_user(&info, "alice", "/dev/").unwrap();
        users.add_user(&info, "bob", "/ops/").unwrap();
        users.add_user(&info, "carol", "/dev/backend/").unwrap();

        let filter = Filter {
            path_prefix: Some("/dev/".to_string()),
            order_by: Some("externalID-desc".to_string()),
            ..Default::default()
        };
        let (page, total) = users.list_users(filter).unwrap();
        assert_eq!(total, 2);
        let ids: Vec<_> = page.iter().map(|u| u.external_id.as_str()).collect();
        assert_eq!(ids, vec!["carol", "alice"]);
    }
}
