//! Principals and their relations
//!
//! Users join groups; groups carry attached policies. Neither relation is
//! stored on the entities themselves, the repositories own them.

use super::Policy;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An authenticated principal, identified externally by `external_id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct User {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "ExternalID")]
    pub external_id: String,
    pub path: String,
    pub urn: String,
    pub create_at: DateTime<Utc>,
    pub update_at: DateTime<Utc>,
}

/// A named set of users within an organization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Group {
    #[serde(rename = "ID")]
    pub id: String,
    pub name: String,
    pub path: String,
    pub org: String,
    pub urn: String,
    pub create_at: DateTime<Utc>,
    pub update_at: DateTime<Utc>,
}

/// A group with its members
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GroupMembers {
    pub group: Group,
    pub users: Vec<User>,
}

/// A group with its attached policies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GroupPolicies {
    pub group: Group,
    pub policies: Vec<Policy>,
}

/// A policy with the groups it is attached to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyGroups {
    pub policy: Policy,
    pub groups: Vec<Group>,
}

/// A user with the groups it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserGroups {
    pub user: User,
    pub groups: Vec<Group>,
}
