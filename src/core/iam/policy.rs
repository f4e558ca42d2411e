//! IAM policy documents
//!
//! A policy is a named, ordered list of statements owned by an organization.
//! Policies reach principals only through groups they are attached to.

use crate::error::IamError;
use crate::validation::valid_effect;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Effect of a policy statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Effect {
    /// Allow the action
    Allow,
    /// Deny the action (takes precedence over Allow)
    Deny,
}

impl Effect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Effect::Allow => "allow",
            Effect::Deny => "deny",
        }
    }
}

impl FromStr for Effect {
    type Err = IamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        valid_effect(s)
    }
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single policy statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    /// Effect of this statement
    pub effect: Effect,

    /// Actions this statement applies to (a trailing `*` is a wildcard)
    pub actions: Vec<String>,

    /// Resource patterns this statement applies to
    pub resources: Vec<String>,
}

impl Statement {
    /// Create a new statement
    pub fn new(effect: Effect, actions: Vec<String>, resources: Vec<String>) -> Self {
        Statement {
            effect,
            actions,
            resources,
        }
    }

    /// Check if this statement covers the given action
    pub fn matches_action(&self, action: &str) -> bool {
        self.actions
            .iter()
            .any(|pattern| crate::iam::PatternMatcher::matches(pattern, action))
    }

    /// Check if any resource pattern of this statement matches the URN
    pub fn matches_resource(&self, urn: &str) -> bool {
        self.resources
            .iter()
            .any(|pattern| crate::iam::PatternMatcher::matches(pattern, urn))
    }

    /// Check if this statement applies to the given action and resource
    pub fn applies_to(&self, action: &str, urn: &str) -> bool {
        self.matches_action(action) && self.matches_resource(urn)
    }
}

/// Stored IAM policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Policy {
    #[serde(rename = "ID")]
    pub id: String,
    pub name: String,
    pub path: String,
    pub org: String,
    pub urn: String,
    pub create_at: DateTime<Utc>,
    pub update_at: DateTime<Utc>,
    pub statements: Vec<Statement>,
}

impl Policy {
    /// Parse a policy from its JSON representation
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize the policy to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
