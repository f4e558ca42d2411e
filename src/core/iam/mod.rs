//! Identity and Access Management (IAM) core
//!
//! Provides URN-based access control with:
//! - Policy documents made of allow/deny statements
//! - Explicit deny precedence, default deny
//! - Trailing-wildcard pattern matching for actions and resources

pub mod actions;
mod engine;
mod entity;
mod pattern;
mod policy;

pub use engine::{Decision, PolicyEngine};
pub use entity::{Group, GroupMembers, GroupPolicies, PolicyGroups, User, UserGroups};
pub use pattern::PatternMatcher;
pub use policy::{Effect, Policy, Statement};
