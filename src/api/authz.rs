//! Authorization queries for a principal
//!
//! Statements are gathered from repositories (user -> groups -> attached
//! policies) and handed to the [`PolicyEngine`], which never touches storage.

use std::collections::HashSet;

use tracing::debug;

use super::{require, user_lookup};
use crate::error::{IamError, Result};
use crate::iam::{PolicyEngine, Statement};
use crate::store::Repo;
use crate::validation::valid_external_id;

/// Largest candidate list accepted by one authorization request
pub const MAX_RESOURCE_NUMBER: usize = 50;

/// Answers "which of these resources may this user act on"
#[derive(Clone)]
pub struct AuthzApi {
    repo: Repo,
}

impl AuthzApi {
    pub fn new(repo: Repo) -> Self {
        AuthzApi { repo }
    }

    /// Collect every statement reachable from a user through its groups
    ///
    /// A policy attached to several of the user's groups contributes its
    /// statements once.
    pub fn resolve_effective_statements(&self, external_id: &str) -> Result<Vec<Statement>> {
        require(valid_external_id(external_id), "externalId", external_id)?;
        let user = self
            .repo
            .user_repo
            .get_user_by_external_id(external_id)
            .map_err(user_lookup(external_id))?;

        let groups = self.repo.user_repo.get_groups_by_user_id(&user.id)?;

        let mut seen = HashSet::new();
        let mut statements = Vec::new();
        for group in &groups {
            for policy in self.repo.group_repo.get_attached_policies(&group.id)? {
                if seen.insert(policy.id.clone()) {
                    statements.extend(policy.statements);
                }
            }
        }

        debug!(
            "Resolved {} statements for {} from {} groups",
            statements.len(),
            external_id,
            groups.len()
        );
        Ok(statements)
    }

    /// Filter `resources` down to those `action` is allowed on for the user
    ///
    /// Order of `resources` is preserved.
    ///
    /// # Errors
    ///
    /// - `InvalidParameter` for an empty list, more than
    ///   [`MAX_RESOURCE_NUMBER`] candidates, a malformed action or a
    ///   malformed candidate URN
    /// - `UserNotFound` if the principal does not exist
    pub fn get_authorized_external_resources<S: AsRef<str>>(
        &self,
        external_id: &str,
        action: &str,
        resources: &[S],
    ) -> Result<Vec<String>> {
        if resources.is_empty() {
            return Err(IamError::InvalidParameter(
                "Invalid parameter: resources, empty list".to_string(),
            ));
        }
        if resources.len() > MAX_RESOURCE_NUMBER {
            return Err(IamError::InvalidParameter(format!(
                "Invalid parameter: resources, max {} resources allowed, got {}",
                MAX_RESOURCE_NUMBER,
                resources.len()
            )));
        }

        let statements = self.resolve_effective_statements(external_id)?;
        PolicyEngine::evaluate(&statements, action, resources)
    }

    /// Require that the user may perform `action` on `resource`
    pub fn check_authorized(&self, external_id: &str, action: &str, resource: &str) -> Result<()> {
        let allowed = self.get_authorized_external_resources(external_id, action, &[resource])?;
        if allowed.is_empty() {
            return Err(IamError::Unauthorized(format!(
                "User {} is not allowed to perform {} on {}",
                external_id, action, resource
            )));
        }
        Ok(())
    }
}
