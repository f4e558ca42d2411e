//! Group management, memberships and policy attachments

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use super::filter::{Filter, GROUP_COLUMNS};
use super::{group_lookup, log_operation, policy_lookup, require, user_lookup, RequestInfo};
use crate::error::{IamError, Result};
use crate::iam::{Group, GroupMembers, GroupPolicies, Policy, User};
use crate::store::{Repo, StorageError};
use crate::urn::{build_urn, RESOURCE_GROUP};
use crate::validation::{valid_external_id, valid_name, valid_org, valid_path};

/// Create, read, update and delete groups, and manage what hangs off them
#[derive(Clone)]
pub struct GroupsApi {
    repo: Repo,
}

impl GroupsApi {
    pub fn new(repo: Repo) -> Self {
        GroupsApi { repo }
    }

    pub fn add_group(
        &self,
        request_info: &RequestInfo,
        org: &str,
        name: &str,
        path: &str,
    ) -> Result<Group> {
        require(valid_org(org), "org", org)?;
        require(valid_name(name), "name", name)?;
        require(valid_path(path), "path", path)?;

        match self.repo.group_repo.get_group_by_name(org, name) {
            Ok(_) => return Err(already_exists(org, name)),
            Err(StorageError::GroupNotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }

        let now = Utc::now();
        let group = Group {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            path: path.to_string(),
            org: org.to_string(),
            urn: build_urn(org, RESOURCE_GROUP, path, name),
            create_at: now,
            update_at: now,
        };

        let created = self.repo.group_repo.add_group(group).map_err(|e| match e {
            StorageError::AlreadyExists { .. } => already_exists(org, name),
            other => other.into(),
        })?;

        log_operation(request_info, &format!("Group created {}", created.urn));
        Ok(created)
    }

    pub fn get_group_by_name(&self, org: &str, name: &str) -> Result<Group> {
        require(valid_org(org), "org", org)?;
        require(valid_name(name), "name", name)?;
        debug!("Looking up group {} in org {}", name, org);
        self.repo
            .group_repo
            .get_group_by_name(org, name)
            .map_err(group_lookup(org, name))
    }

    pub fn get_group_by_id(&self, id: &str) -> Result<Group> {
        self.repo.group_repo.get_group_by_id(id).map_err(|e| match e {
            StorageError::GroupNotFound(_) => IamError::GroupIdNotFound(id.to_string()),
            other => other.into(),
        })
    }

    /// List groups, returning the requested page and the total match count
    pub fn list_groups(&self, filter: Filter) -> Result<(Vec<Group>, usize)> {
        let filter = filter.validate(GROUP_COLUMNS)?;
        Ok(self.repo.group_repo.get_groups_filtered(&filter)?)
    }

    /// Rename and/or move a group
    ///
    /// Keeping the current name is not a conflict; taking another group's
    /// name is.
    pub fn update_group(
        &self,
        request_info: &RequestInfo,
        org: &str,
        name: &str,
        new_name: &str,
        new_path: &str,
    ) -> Result<Group> {
        require(valid_name(new_name), "name", new_name)?;
        require(valid_path(new_path), "path", new_path)?;
        let mut group = self.get_group_by_name(org, name)?;

        if new_name != name {
            match self.repo.group_repo.get_group_by_name(org, new_name) {
                Ok(_) => return Err(already_exists(org, new_name)),
                Err(StorageError::GroupNotFound(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }

        group.name = new_name.to_string();
        group.path = new_path.to_string();
        group.urn = build_urn(org, RESOURCE_GROUP, new_path, new_name);
        group.update_at = Utc::now();

        let updated = self.repo.group_repo.update_group(group).map_err(|e| match e {
            StorageError::AlreadyExists { .. } => already_exists(org, new_name),
            other => group_lookup(org, name)(other),
        })?;

        log_operation(request_info, &format!("Group updated {}", updated.urn));
        Ok(updated)
    }

    /// Delete a group together with its memberships and attachments
    pub fn remove_group(&self, request_info: &RequestInfo, org: &str, name: &str) -> Result<()> {
        let group = self.get_group_by_name(org, name)?;
        self.repo
            .group_repo
            .remove_group(&group.id)
            .map_err(group_lookup(org, name))?;

        log_operation(request_info, &format!("Group deleted {}", group.urn));
        Ok(())
    }

    pub fn add_member(
        &self,
        request_info: &RequestInfo,
        external_id: &str,
        group_name: &str,
        org: &str,
    ) -> Result<()> {
        let group = self.get_group_by_name(org, group_name)?;
        let user = self.get_user(external_id)?;

        let already_member = || IamError::UserAlreadyMemberOfGroup {
            user: external_id.to_string(),
            group: group.urn.clone(),
        };

        if self.repo.group_repo.is_member_of_group(&user.id, &group.id)? {
            return Err(already_member());
        }

        // A concurrent add may have won between the check and the insert
        self.repo
            .group_repo
            .add_member(&user.id, &group.id)
            .map_err(|e| match e {
                StorageError::AlreadyExists { .. } => already_member(),
                other => other.into(),
            })?;

        log_operation(
            request_info,
            &format!("Member {} added to group {}", user.urn, group.urn),
        );
        Ok(())
    }

    pub fn remove_member(
        &self,
        request_info: &RequestInfo,
        external_id: &str,
        group_name: &str,
        org: &str,
    ) -> Result<()> {
        let group = self.get_group_by_name(org, group_name)?;
        let user = self.get_user(external_id)?;

        let not_member = || IamError::UserNotMemberOfGroup {
            user: external_id.to_string(),
            group: group.urn.clone(),
        };

        if !self.repo.group_repo.is_member_of_group(&user.id, &group.id)? {
            return Err(not_member());
        }

        self.repo
            .group_repo
            .remove_member(&user.id, &group.id)
            .map_err(|e| match e {
                StorageError::MembershipNotFound { .. } => not_member(),
                other => other.into(),
            })?;

        log_operation(
            request_info,
            &format!("Member {} removed from group {}", user.urn, group.urn),
        );
        Ok(())
    }

    pub fn list_members(&self, org: &str, group_name: &str) -> Result<GroupMembers> {
        let group = self.get_group_by_name(org, group_name)?;
        let users = self.repo.group_repo.get_group_members(&group.id)?;
        Ok(GroupMembers { group, users })
    }

    /// Attach a policy of the same org to a group
    pub fn attach_policy_to_group(
        &self,
        request_info: &RequestInfo,
        org: &str,
        group_name: &str,
        policy_name: &str,
    ) -> Result<()> {
        let group = self.get_group_by_name(org, group_name)?;
        let policy = self.get_policy(org, policy_name)?;

        let already_attached = || IamError::PolicyAlreadyAttachedToGroup {
            policy: policy.urn.clone(),
            group: group.urn.clone(),
        };

        if self
            .repo
            .group_repo
            .is_attached_to_group(&group.id, &policy.id)?
        {
            return Err(already_attached());
        }

        // A concurrent attach may have won between the check and the insert
        self.repo
            .group_repo
            .attach_policy(&group.id, &policy.id)
            .map_err(|e| match e {
                StorageError::AlreadyExists { .. } => already_attached(),
                other => other.into(),
            })?;

        log_operation(
            request_info,
            &format!("Policy {} attached to group {}", policy.urn, group.urn),
        );
        Ok(())
    }

    pub fn detach_policy_to_group(
        &self,
        request_info: &RequestInfo,
        org: &str,
        group_name: &str,
        policy_name: &str,
    ) -> Result<()> {
        let group = self.get_group_by_name(org, group_name)?;
        let policy = self.get_policy(org, policy_name)?;

        let not_attached = || IamError::PolicyNotAttachedToGroup {
            policy: policy.urn.clone(),
            group: group.urn.clone(),
        };

        if !self
            .repo
            .group_repo
            .is_attached_to_group(&group.id, &policy.id)?
        {
            return Err(not_attached());
        }

        self.repo
            .group_repo
            .detach_policy(&group.id, &policy.id)
            .map_err(|e| match e {
                StorageError::AttachmentNotFound { .. } => not_attached(),
                other => other.into(),
            })?;

        log_operation(
            request_info,
            &format!("Policy {} detached from group {}", policy.urn, group.urn),
        );
        Ok(())
    }

    pub fn list_attached_group_policies(
        &self,
        org: &str,
        group_name: &str,
    ) -> Result<GroupPolicies> {
        let group = self.get_group_by_name(org, group_name)?;
        let policies = self.repo.group_repo.get_attached_policies(&group.id)?;
        Ok(GroupPolicies { group, policies })
    }

    fn get_user(&self, external_id: &str) -> Result<User> {
        require(valid_external_id(external_id), "externalId", external_id)?;
        self.repo
            .user_repo
            .get_user_by_external_id(external_id)
            .map_err(user_lookup(external_id))
    }

    fn get_policy(&self, org: &str, name: &str) -> Result<Policy> {
        require(valid_name(name), "name", name)?;
        self.repo
            .policy_repo
            .get_policy_by_name(org, name)
            .map_err(policy_lookup(org, name))
    }
}

fn already_exists(org: &str, name: &str) -> IamError {
    IamError::GroupAlreadyExists {
        org: org.to_string(),
        name: name.to_string(),
    }
}
