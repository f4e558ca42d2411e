//! Server configuration and seed data
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8000
//!
//! [logger]
//! level = "debug"
//!
//! [[seed.users]]
//! external_id = "alice"
//! path = "/dev/"
//!
//! [[seed.policies]]
//! name = "readers"
//! org = "acme"
//!
//! [[seed.policies.statements]]
//! effect = "allow"
//! actions = ["iam:GetUser"]
//! resources = ["urn:iws:iam::user/dev/*"]
//!
//! [[seed.groups]]
//! name = "devs"
//! org = "acme"
//! members = ["alice"]
//! policies = ["readers"]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::api::{Apis, RequestInfo};
use crate::error::IamError;
use crate::iam::Statement;
use crate::validation::valid_effect;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("error reading \"{}\": {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("error parsing configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid seed data: {0}")]
    Seed(#[from] IamError),
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub logger: LoggerConfig,
    pub seed: Seed,
}

impl Config {
    /// Load a `Config` from the given TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Config, ConfigError> {
        Ok(toml::from_str(contents)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        LoggerConfig {
            level: "info".to_string(),
        }
    }
}

/// Users, policies and groups loaded at startup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Seed {
    pub users: Vec<SeedUser>,
    pub policies: Vec<SeedPolicy>,
    pub groups: Vec<SeedGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedUser {
    pub external_id: String,
    #[serde(default = "root_path")]
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedPolicy {
    pub name: String,
    pub org: String,
    #[serde(default = "root_path")]
    pub path: String,
    #[serde(default)]
    pub statements: Vec<SeedStatement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedStatement {
    pub effect: String,
    pub actions: Vec<String>,
    pub resources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedGroup {
    pub name: String,
    pub org: String,
    #[serde(default = "root_path")]
    pub path: String,
    /// External ids of the members
    #[serde(default)]
    pub members: Vec<String>,
    /// Names of policies in the same org
    #[serde(default)]
    pub policies: Vec<String>,
}

fn root_path() -> String {
    "/".to_string()
}

impl Seed {
    pub fn is_empty(&self) -> bool {
        self.users.is_empty() && self.policies.is_empty() && self.groups.is_empty()
    }

    /// Load the seed through the APIs, so it is validated like any other input
    ///
    /// Users and policies go first so groups can reference them. Stops at
    /// the first error.
    pub fn apply(&self, apis: &Apis) -> Result<(), ConfigError> {
        let request_info = RequestInfo::internal("seed");

        for user in &self.users {
            apis.users
                .add_user(&request_info, &user.external_id, &user.path)?;
        }

        for policy in &self.policies {
            let statements = policy
                .statements
                .iter()
                .map(|s| {
                    Ok(Statement::new(
                        valid_effect(&s.effect)?,
                        s.actions.clone(),
                        s.resources.clone(),
                    ))
                })
                .collect::<Result<Vec<_>, IamError>>()?;
            apis.policies.add_policy(
                &request_info,
                &policy.name,
                &policy.path,
                &policy.org,
                statements,
            )?;
        }

        for group in &self.groups {
            apis.groups
                .add_group(&request_info, &group.org, &group.name, &group.path)?;
            for member in &group.members {
                apis.groups
                    .add_member(&request_info, member, &group.name, &group.org)?;
            }
            for policy in &group.policies {
                apis.groups
                    .attach_policy_to_group(&request_info, &group.org, &group.name, policy)?;
            }
        }

        info!(
            "Seeded {} users, {} policies, {} groups",
            self.users.len(),
            self.policies.len(),
            self.groups.len()
        );
        Ok(())
    }
}
