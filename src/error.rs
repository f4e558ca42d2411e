//! Error types for IAM operations

use crate::store::StorageError;
use thiserror::Error;

/// IAM operation result type
pub type Result<T> = std::result::Result<T, IamError>;

/// Coarse classification of an [`IamError`]
///
/// Callers (the HTTP layer in particular) branch on the kind instead of
/// inspecting individual variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidParameter,
    PatternSyntax,
    Unauthorized,
    NotFound,
    AlreadyExists,
    Internal,
}

/// IAM operation errors
#[derive(Error, Debug)]
pub enum IamError {
    /// Malformed org, name, path, external id, effect, filter or resource list
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// An action or resource pattern does not follow its grammar
    #[error("No regex match in {field}: {value}")]
    PatternSyntax { field: &'static str, value: String },

    /// The principal is not allowed to act on the resource
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("User with external id {0} not found")]
    UserNotFound(String),

    #[error("Group with org {org} and name {name} not found")]
    GroupNotFound { org: String, name: String },

    #[error("Group with id {0} not found")]
    GroupIdNotFound(String),

    #[error("Policy with org {org} and name {name} not found")]
    PolicyNotFound { org: String, name: String },

    #[error("Policy with id {0} not found")]
    PolicyIdNotFound(String),

    #[error("User {user} is not a member of group {group}")]
    UserNotMemberOfGroup { user: String, group: String },

    #[error("Policy {policy} is not attached to group {group}")]
    PolicyNotAttachedToGroup { policy: String, group: String },

    #[error("User with external id {0} already exists")]
    UserAlreadyExists(String),

    #[error("Group with org {org} and name {name} already exists")]
    GroupAlreadyExists { org: String, name: String },

    #[error("Policy with org {org} and name {name} already exists")]
    PolicyAlreadyExists { org: String, name: String },

    #[error("User {user} is already a member of group {group}")]
    UserAlreadyMemberOfGroup { user: String, group: String },

    #[error("Policy {policy} is already attached to group {group}")]
    PolicyAlreadyAttachedToGroup { policy: String, group: String },

    /// Unexpected repository failure
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl IamError {
    /// Build a pattern syntax error for an action
    pub(crate) fn action_syntax(action: &str) -> Self {
        IamError::PatternSyntax {
            field: "action",
            value: action.to_string(),
        }
    }

    /// Build a pattern syntax error for a resource
    pub(crate) fn resource_syntax(resource: &str) -> Self {
        IamError::PatternSyntax {
            field: "resource",
            value: resource.to_string(),
        }
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            IamError::InvalidParameter(_) => ErrorKind::InvalidParameter,
            IamError::PatternSyntax { .. } => ErrorKind::PatternSyntax,
            IamError::Unauthorized(_) => ErrorKind::Unauthorized,
            IamError::UserNotFound(_)
            | IamError::GroupNotFound { .. }
            | IamError::GroupIdNotFound(_)
            | IamError::PolicyNotFound { .. }
            | IamError::PolicyIdNotFound(_)
            | IamError::UserNotMemberOfGroup { .. }
            | IamError::PolicyNotAttachedToGroup { .. } => ErrorKind::NotFound,
            IamError::UserAlreadyExists(_)
            | IamError::GroupAlreadyExists { .. }
            | IamError::PolicyAlreadyExists { .. }
            | IamError::UserAlreadyMemberOfGroup { .. }
            | IamError::PolicyAlreadyAttachedToGroup { .. } => ErrorKind::AlreadyExists,
            IamError::Storage(_) => ErrorKind::Internal,
        }
    }

    /// Stable error code used in HTTP error bodies
    pub fn code(&self) -> &'static str {
        match self {
            IamError::InvalidParameter(_) => "InvalidParameterError",
            IamError::PatternSyntax { .. } => "RegexNoMatchError",
            IamError::Unauthorized(_) => "UnauthorizedResourcesError",
            IamError::UserNotFound(_) => "UserWithExternalIDNotFoundError",
            IamError::GroupNotFound { .. } => "GroupWithOrgAndNameNotFoundError",
            IamError::GroupIdNotFound(_) => "GroupWithIDNotFoundError",
            IamError::PolicyNotFound { .. } => "PolicyWithOrgAndNameNotFoundError",
            IamError::PolicyIdNotFound(_) => "PolicyWithIDNotFoundError",
            IamError::UserNotMemberOfGroup { .. } => "UserIsNotAMemberOfGroupError",
            IamError::PolicyNotAttachedToGroup { .. } => "PolicyIsNotAttachedToGroupError",
            IamError::UserAlreadyExists(_) => "UserAlreadyExistError",
            IamError::GroupAlreadyExists { .. } => "GroupAlreadyExistError",
            IamError::PolicyAlreadyExists { .. } => "PolicyAlreadyExistError",
            IamError::UserAlreadyMemberOfGroup { .. } => "UserIsAlreadyAMemberOfGroupError",
            IamError::PolicyAlreadyAttachedToGroup { .. } => "PolicyIsAlreadyAttachedToGroupError",
            IamError::Storage(_) => "UnknownApiError",
        }
    }
}
