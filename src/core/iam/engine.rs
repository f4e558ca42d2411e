//! Policy evaluation engine with deny precedence
//!
//! Evaluates a principal's effective statements to decide which of a set of
//! candidate resources an action may be performed on.
//! Key features:
//! - Only statements whose actions match the requested action take part
//! - Explicit deny takes precedence over allow
//! - No matching allow means deny
//! - Output keeps the order of the candidate list

use super::{Effect, Statement};
use crate::error::{IamError, Result};
use crate::validation::{valid_actions, valid_urn};
use tracing::debug;

/// Outcome of evaluating one resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// At least one allow statement matched and no deny statement did
    Allow,
    /// At least one deny statement matched
    Deny,
    /// No statement matched
    NotApplicable,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Policy evaluation engine
///
/// Stateless; safe to share and call concurrently.
pub struct PolicyEngine;

impl PolicyEngine {
    /// Compute the subset of `resources` that `action` is authorized on
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if the action does not follow the action grammar or
    /// any candidate is not a well-formed URN.
    ///
    /// # Examples
    ///
    /// ```
    /// use authorizr::iam::{Effect, PolicyEngine, Statement};
    ///
    /// let statements = vec![Statement::new(
    ///     Effect::Allow,
    ///     vec!["iam:GetUser".to_string()],
    ///     vec!["urn:iws:iam::user/path/*".to_string()],
    /// )];
    ///
    /// let allowed = PolicyEngine::evaluate(
    ///     &statements,
    ///     "iam:GetUser",
    ///     &["urn:iws:iam::user/path/bob", "urn:iws:iam::user/other/bob"],
    /// )
    /// .unwrap();
    /// assert_eq!(allowed, vec!["urn:iws:iam::user/path/bob".to_string()]);
    /// ```
    pub fn evaluate<S: AsRef<str>>(
        statements: &[Statement],
        action: &str,
        resources: &[S],
    ) -> Result<Vec<String>> {
        Self::check_request(action, resources)?;

        let applicable: Vec<&Statement> = statements
            .iter()
            .filter(|statement| statement.matches_action(action))
            .collect();

        debug!(
            "Evaluating action {} on {} resources with {} of {} statements",
            action,
            resources.len(),
            applicable.len(),
            statements.len()
        );

        let allowed = resources
            .iter()
            .map(|resource| resource.as_ref())
            .filter(|urn| Self::decide_with(&applicable, urn).is_allowed())
            .map(str::to_string)
            .collect();

        Ok(allowed)
    }

    /// Decide a single resource
    ///
    /// The URN is not validated here; use [`PolicyEngine::evaluate`] for
    /// untrusted input.
    pub fn decide(statements: &[Statement], action: &str, urn: &str) -> Decision {
        let applicable: Vec<&Statement> = statements
            .iter()
            .filter(|statement| statement.matches_action(action))
            .collect();
        Self::decide_with(&applicable, urn)
    }

    fn decide_with(applicable: &[&Statement], urn: &str) -> Decision {
        let mut has_allow = false;

        for statement in applicable {
            if !statement.matches_resource(urn) {
                continue;
            }
            match statement.effect {
                // Explicit deny - nothing can override it
                Effect::Deny => return Decision::Deny,
                Effect::Allow => has_allow = true,
            }
        }

        if has_allow {
            Decision::Allow
        } else {
            Decision::NotApplicable
        }
    }

    fn check_request<S: AsRef<str>>(action: &str, resources: &[S]) -> Result<()> {
        valid_actions(&[action]).map_err(|_| {
            IamError::InvalidParameter(format!("Invalid parameter: action {}", action))
        })?;

        if let Some(bad) = resources
            .iter()
            .map(|resource| resource.as_ref())
            .find(|urn| !valid_urn(urn))
        {
            return Err(IamError::InvalidParameter(format!(
                "Invalid parameter: resource {}",
                bad
            )));
        }
        Ok(())
    }
}
