//! Policy management

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use super::filter::{Filter, POLICY_COLUMNS};
use super::{log_operation, policy_lookup, require, RequestInfo};
use crate::error::{IamError, Result};
use crate::iam::{Policy, PolicyGroups, Statement};
use crate::store::{Repo, StorageError};
use crate::urn::{build_urn, RESOURCE_POLICY};
use crate::validation::{valid_name, valid_org, valid_path, valid_statements};

/// Create, read, update and delete policies
#[derive(Clone)]
pub struct PoliciesApi {
    repo: Repo,
}

impl PoliciesApi {
    pub fn new(repo: Repo) -> Self {
        PoliciesApi { repo }
    }

    /// Store a new policy
    ///
    /// Statements are validated before anything is written.
    pub fn add_policy(
        &self,
        request_info: &RequestInfo,
        name: &str,
        path: &str,
        org: &str,
        statements: Vec<Statement>,
    ) -> Result<Policy> {
        require(valid_org(org), "org", org)?;
        require(valid_name(name), "name", name)?;
        require(valid_path(path), "path", path)?;
        valid_statements(&statements)?;

        match self.repo.policy_repo.get_policy_by_name(org, name) {
            Ok(_) => return Err(already_exists(org, name)),
            Err(StorageError::PolicyNotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }

        let now = Utc::now();
        let policy = Policy {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            path: path.to_string(),
            org: org.to_string(),
            urn: build_urn(org, RESOURCE_POLICY, path, name),
            create_at: now,
            update_at: now,
            statements,
        };

        let created = self.repo.policy_repo.add_policy(policy).map_err(|e| match e {
            StorageError::AlreadyExists { .. } => already_exists(org, name),
            other => other.into(),
        })?;

        log_operation(request_info, &format!("Policy created {}", created.urn));
        Ok(created)
    }

    pub fn get_policy_by_name(&self, org: &str, name: &str) -> Result<Policy> {
        require(valid_org(org), "org", org)?;
        require(valid_name(name), "name", name)?;
        debug!("Looking up policy {} in org {}", name, org);
        self.repo
            .policy_repo
            .get_policy_by_name(org, name)
            .map_err(policy_lookup(org, name))
    }

    pub fn get_policy_by_id(&self, id: &str) -> Result<Policy> {
        self.repo.policy_repo.get_policy_by_id(id).map_err(|e| match e {
            StorageError::PolicyNotFound(_) => IamError::PolicyIdNotFound(id.to_string()),
            other => other.into(),
        })
    }

    /// List policies, returning the requested page and the total match count
    pub fn list_policies(&self, filter: Filter) -> Result<(Vec<Policy>, usize)> {
        let filter = filter.validate(POLICY_COLUMNS)?;
        Ok(self.repo.policy_repo.get_policies_filtered(&filter)?)
    }

    /// Rename, move and replace the statements of a policy
    pub fn update_policy(
        &self,
        request_info: &RequestInfo,
        org: &str,
        name: &str,
        new_name: &str,
        new_path: &str,
        new_statements: Vec<Statement>,
    ) -> Result<Policy> {
        require(valid_name(new_name), "name", new_name)?;
        require(valid_path(new_path), "path", new_path)?;
        valid_statements(&new_statements)?;
        let mut policy = self.get_policy_by_name(org, name)?;

        if new_name != name {
            match self.repo.policy_repo.get_policy_by_name(org, new_name) {
                Ok(_) => return Err(already_exists(org, new_name)),
                Err(StorageError::PolicyNotFound(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }

        policy.name = new_name.to_string();
        policy.path = new_path.to_string();
        policy.urn = build_urn(org, RESOURCE_POLICY, new_path, new_name);
        policy.statements = new_statements;
        policy.update_at = Utc::now();

        let updated = self
            .repo
            .policy_repo
            .update_policy(policy)
            .map_err(|e| match e {
                StorageError::AlreadyExists { .. } => already_exists(org, new_name),
                other => policy_lookup(org, name)(other),
            })?;

        log_operation(request_info, &format!("Policy updated {}", updated.urn));
        Ok(updated)
    }

    /// Delete a policy and detach it from every group
    pub fn remove_policy(&self, request_info: &RequestInfo, org: &str, name: &str) -> Result<()> {
        let policy = self.get_policy_by_name(org, name)?;
        self.repo
            .policy_repo
            .remove_policy(&policy.id)
            .map_err(policy_lookup(org, name))?;

        log_operation(request_info, &format!("Policy deleted {}", policy.urn));
        Ok(())
    }

    /// Groups the policy is attached to
    pub fn list_attached_groups(&self, org: &str, name: &str) -> Result<PolicyGroups> {
        let policy = self.get_policy_by_name(org, name)?;
        let groups = self.repo.policy_repo.get_attached_groups(&policy.id)?;
        Ok(PolicyGroups { policy, groups })
    }
}

fn already_exists(org: &str, name: &str) -> IamError {
    IamError::PolicyAlreadyExists {
        org: org.to_string(),
        name: name.to_string(),
    }
}
