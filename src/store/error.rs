//! Storage error types

use thiserror::Error;

/// Errors reported by repository implementations
///
/// Every backend maps its failures onto these variants so callers can
/// `match` on the outcome instead of inspecting backend-specific errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// No user with the given key
    #[error("user not found: {0}")]
    UserNotFound(String),

    /// No group with the given key
    #[error("group not found: {0}")]
    GroupNotFound(String),

    /// No policy with the given key
    #[error("policy not found: {0}")]
    PolicyNotFound(String),

    /// No user-group membership between the given ids
    #[error("user {user_id} is not a member of group {group_id}")]
    MembershipNotFound { user_id: String, group_id: String },

    /// No group-policy attachment between the given ids
    #[error("policy {policy_id} is not attached to group {group_id}")]
    AttachmentNotFound { group_id: String, policy_id: String },

    /// Uniqueness constraint violated
    #[error("{entity} already exists: {key}")]
    AlreadyExists { entity: &'static str, key: String },

    /// Backend failure
    #[error("internal storage error: {0}")]
    Internal(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
