//! Orchestration APIs over the repositories
//!
//! Each API validates its input, checks that referenced entities exist
//! before touching relations, and translates [`StorageError`]s into domain
//! errors. Mutations are logged through [`log_operation`].

mod authz;
pub mod filter;
mod group;
mod policy;
mod user;

pub use authz::{AuthzApi, MAX_RESOURCE_NUMBER};
pub use filter::{
    Direction, Filter, ListFilter, OrderBy, DEFAULT_LIMIT_SIZE, GROUP_COLUMNS, MAX_LIMIT_SIZE,
    POLICY_COLUMNS, USER_COLUMNS,
};
pub use group::GroupsApi;
pub use policy::PoliciesApi;
pub use user::UsersApi;

use crate::error::{IamError, Result};
use crate::store::{Repo, StorageError};
use tracing::info;
use uuid::Uuid;

/// Who is calling, and under which request id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestInfo {
    pub request_id: String,
    /// External id of the calling user
    pub identifier: String,
}

impl RequestInfo {
    pub fn new(request_id: impl Into<String>, identifier: impl Into<String>) -> Self {
        RequestInfo {
            request_id: request_id.into(),
            identifier: identifier.into(),
        }
    }

    /// Request info for work not triggered by a request (seeding, tooling)
    pub fn internal(identifier: impl Into<String>) -> Self {
        Self::new(Uuid::new_v4().to_string(), identifier)
    }
}

/// Log a completed mutation with the request it belongs to
pub fn log_operation(request_info: &RequestInfo, message: &str) {
    info!(
        request_id = %request_info.request_id,
        user_id = %request_info.identifier,
        "{}",
        message
    );
}

/// Every API, sharing one set of repositories
#[derive(Clone)]
pub struct Apis {
    pub users: UsersApi,
    pub groups: GroupsApi,
    pub policies: PoliciesApi,
    pub authz: AuthzApi,
}

impl Apis {
    pub fn new(repo: Repo) -> Self {
        Apis {
            users: UsersApi::new(repo.clone()),
            groups: GroupsApi::new(repo.clone()),
            policies: PoliciesApi::new(repo.clone()),
            authz: AuthzApi::new(repo),
        }
    }
}

/// Fail with `InvalidParameter` naming the field when `valid` is false
pub(crate) fn require(valid: bool, field: &str, value: &str) -> Result<()> {
    if valid {
        Ok(())
    } else {
        Err(IamError::InvalidParameter(format!("{} {}", field, value)))
    }
}

/// Map a missing user to the domain error, anything else passes through
pub(crate) fn user_lookup(external_id: &str) -> impl FnOnce(StorageError) -> IamError + '_ {
    move |err| match err {
        StorageError::UserNotFound(_) => IamError::UserNotFound(external_id.to_string()),
        other => other.into(),
    }
}

/// Map a missing group to the domain error, anything else passes through
pub(crate) fn group_lookup<'a>(
    org: &'a str,
    name: &'a str,
) -> impl FnOnce(StorageError) -> IamError + 'a {
    move |err| match err {
        StorageError::GroupNotFound(_) => IamError::GroupNotFound {
            org: org.to_string(),
            name: name.to_string(),
        },
        other => other.into(),
    }
}

/// Map a missing policy to the domain error, anything else passes through
pub(crate) fn policy_lookup<'a>(
    org: &'a str,
    name: &'a str,
) -> impl FnOnce(StorageError) -> IamError + 'a {
    move |err| match err {
        StorageError::PolicyNotFound(_) => IamError::PolicyNotFound {
            org: org.to_string(),
            name: name.to_string(),
        },
        other => other.into(),
    }
}
