//! # Authorizr - Identity and Access Management
//!
//! `authorizr` manages users, groups and policies, and answers one question:
//! which of these resources may this user perform this action on?
//!
//! - **URNs** identify every user, group, policy and external resource
//! - **Policies** are lists of allow/deny statements over action and
//!   resource patterns with a single trailing `*`
//! - **Evaluation** is default deny, and an explicit deny always wins
//!
//! ## Quick Start
//!
//! ```rust
//! use authorizr::api::{Apis, RequestInfo};
//! use authorizr::iam::{Effect, Statement};
//! use authorizr::store::Repo;
//!
//! # fn main() -> authorizr::Result<()> {
//! let apis = Apis::new(Repo::in_memory());
//! let info = RequestInfo::internal("admin");
//!
//! apis.users.add_user(&info, "alice", "/")?;
//! apis.groups.add_group(&info, "acme", "readers", "/")?;
//! apis.policies.add_policy(
//!     &info,
//!     "read-users",
//!     "/",
//!     "acme",
//!     vec![Statement::new(
//!         Effect::Allow,
//!         vec!["iam:GetUser".to_string()],
//!         vec!["urn:iws:iam::user/path/*".to_string()],
//!     )],
//! )?;
//! apis.groups.add_member(&info, "alice", "readers", "acme")?;
//! apis.groups.attach_policy_to_group(&info, "acme", "readers", "read-users")?;
//!
//! let allowed = apis.authz.get_authorized_external_resources(
//!     "alice",
//!     "iam:GetUser",
//!     &["urn:iws:iam::user/path/bob", "urn:iws:iam::user/other/bob"],
//! )?;
//! assert_eq!(allowed, vec!["urn:iws:iam::user/path/bob"]);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod core;
pub mod error;
pub mod http;
pub mod store;

pub use crate::core::{iam, urn, validation};
pub use error::{ErrorKind, IamError, Result};
