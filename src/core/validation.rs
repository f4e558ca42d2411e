//! Syntax validation for IAM identifiers and policy statements
//!
//! Every name, path, action and resource pattern goes through this module
//! before it is persisted or evaluated, so the matcher and the engine can
//! assume well-formed input.
//!
//! # Resource patterns
//!
//! A pattern is split on `:` into at most five blocks:
//!
//! ```text
//! urn : iws : iam : <org> : <resource_type><path><name>
//!  0     1     2      3      4
//! ```
//!
//! - Block 0 is `urn`, or `*` when it is the only block
//! - Blocks 1-3 are words; the last block may be `*` or end in `*`
//! - Block 3 may be empty when block 4 follows (user URNs)
//! - Block 4 is a path whose last segment may end in `*`
//!
//! Word classes are ASCII (`[A-Za-z0-9_]` plus the listed punctuation).

use crate::error::{IamError, Result};
use crate::iam::{Effect, Statement};
use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum external id length (exclusive)
pub const MAX_EXTERNAL_ID_LENGTH: usize = 128;
/// Maximum org, group and policy name length (exclusive)
pub const MAX_NAME_LENGTH: usize = 128;
/// Maximum action length (inclusive)
pub const MAX_ACTION_LENGTH: usize = 128;
/// Maximum path length (exclusive)
pub const MAX_PATH_LENGTH: usize = 512;

/// Maximum number of `:` separated blocks in a resource pattern
const MAX_RESOURCE_BLOCKS: usize = 5;

// Patterns are compile-time constants, unwrapping cannot fail at runtime.
macro_rules! static_regex {
    ($name:ident, $re:expr) => {
        static $name: Lazy<Regex> = Lazy::new(|| Regex::new($re).unwrap());
    };
}

static_regex!(USER_EXTERNAL_ID, r"^[A-Za-z0-9_+.@=\-]+$");
static_regex!(NAME, r"^[A-Za-z0-9_\-]+$");
static_regex!(ORG, r"^[A-Za-z0-9_\-]+$");
static_regex!(ORDER, r"^[A-Za-z0-9_]+-(asc|desc)$");
static_regex!(PATH, r"^/$|^/[A-Za-z0-9_+/\-]+[A-Za-z0-9_]/$");
static_regex!(PATH_EXCLUDE, r"/{2,}");
static_regex!(ACTION, r"^[A-Za-z0-9_\-:]+[A-Za-z0-9_\-*]+$");
static_regex!(ACTION_EXCLUDE, r"\*{2,}|:{2,}");
static_regex!(WORD_RESOURCE, r"^[A-Za-z0-9_+\-.@]+$");
static_regex!(WORD_RESOURCE_PREFIX, r"^[A-Za-z0-9_+\-.@]+\*$");
static_regex!(
    URN_TAIL,
    r"^\*$|^[A-Za-z0-9_+\-@.]+\*?$|^[A-Za-z0-9_+\-@.]+(/?([A-Za-z0-9_+\-@.]+/)*([A-Za-z0-9_+\-@.]+\*?|\*))?$"
);
static_regex!(URN_TAIL_EXCLUDE, r"/{2,}|:{2,}|\*{2,}");

/// Validate a user external id
pub fn valid_external_id(external_id: &str) -> bool {
    USER_EXTERNAL_ID.is_match(external_id) && external_id.len() < MAX_EXTERNAL_ID_LENGTH
}

/// Validate an organization name
pub fn valid_org(org: &str) -> bool {
    ORG.is_match(org) && org.len() < MAX_NAME_LENGTH
}

/// Validate a group or policy name
pub fn valid_name(name: &str) -> bool {
    NAME.is_match(name) && name.len() < MAX_NAME_LENGTH
}

/// Validate a sort order of the form `column-asc` or `column-desc`
pub fn valid_order(order: &str) -> bool {
    ORDER.is_match(order) && order.len() < MAX_NAME_LENGTH
}

/// Validate a resource path
///
/// Paths start and end with `/` and never contain `//`.
///
/// ```
/// use authorizr::validation::valid_path;
///
/// assert!(valid_path("/"));
/// assert!(valid_path("/dev/backend/"));
/// assert!(!valid_path("/dev//backend/"));
/// assert!(!valid_path("dev/"));
/// ```
pub fn valid_path(path: &str) -> bool {
    PATH.is_match(path) && !PATH_EXCLUDE.is_match(path) && path.len() < MAX_PATH_LENGTH
}

/// Validate a statement effect, returning the typed effect
pub fn valid_effect(effect: &str) -> Result<Effect> {
    match effect {
        "allow" => Ok(Effect::Allow),
        "deny" => Ok(Effect::Deny),
        _ => Err(IamError::InvalidParameter(format!(
            "Invalid effect: {} - Only 'allow' and 'deny' accepted",
            effect
        ))),
    }
}

/// Validate a list of actions
///
/// Fails on the first action that does not match the grammar.
pub fn valid_actions<S: AsRef<str>>(actions: &[S]) -> Result<()> {
    for action in actions {
        let action = action.as_ref();
        if !ACTION.is_match(action)
            || ACTION_EXCLUDE.is_match(action)
            || action.len() > MAX_ACTION_LENGTH
        {
            return Err(IamError::action_syntax(action));
        }
    }
    Ok(())
}

/// Validate a list of resource patterns
///
/// ```
/// use authorizr::validation::valid_resource_patterns;
///
/// assert!(valid_resource_patterns(&["urn:iws:iam::user/path/*"]).is_ok());
/// assert!(valid_resource_patterns(&["urn:iam:*:*:*"]).is_ok());
/// assert!(valid_resource_patterns(&["urn::double::colon"]).is_err());
/// ```
pub fn valid_resource_patterns<S: AsRef<str>>(resources: &[S]) -> Result<()> {
    for resource in resources {
        valid_resource_pattern(resource.as_ref())?;
    }
    Ok(())
}

fn valid_resource_pattern(resource: &str) -> Result<()> {
    let blocks: Vec<&str> = resource.split(':').collect();
    if blocks.len() > MAX_RESOURCE_BLOCKS {
        return Err(IamError::InvalidParameter(format!(
            "Invalid resource definition: {}",
            resource
        )));
    }

    let last = blocks.len() - 1;
    for (n, block) in blocks.iter().enumerate() {
        let is_last = n == last;
        let ok = match n {
            0 if is_last => *block == "*",
            0 => *block == "urn",
            1..=3 if is_last => *block == "*" || WORD_RESOURCE_PREFIX.is_match(block),
            3 if block.is_empty() => true,
            1..=3 => *block == "*" || WORD_RESOURCE.is_match(block),
            _ => URN_TAIL.is_match(block) && !URN_TAIL_EXCLUDE.is_match(block),
        };
        if !ok {
            return Err(IamError::resource_syntax(resource));
        }
    }
    Ok(())
}

/// Validate a concrete resource URN (a pattern without wildcards)
pub fn valid_urn(urn: &str) -> bool {
    !urn.contains('*') && valid_resource_pattern(urn).is_ok()
}

/// Validate policy statements
///
/// Each statement needs at least one action and one resource; the first
/// violation is returned.
pub fn valid_statements(statements: &[Statement]) -> Result<()> {
    for statement in statements {
        if statement.actions.is_empty() {
            return Err(IamError::InvalidParameter("Empty actions".to_string()));
        }
        valid_actions(&statement.actions)?;

        if statement.resources.is_empty() {
            return Err(IamError::InvalidParameter("Empty resources".to_string()));
        }
        valid_resource_patterns(&statement.resources)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::urn::{build_pattern_prefix, build_urn, RESOURCE_POLICY, RESOURCE_USER};

    fn assert_resource_kind(resource: &str, kind: ErrorKind) {
        match valid_resource_patterns(&[resource]) {
            Err(e) => assert_eq!(e.kind(), kind, "resource {}", resource),
            Ok(()) => panic!("resource {} should be rejected", resource),
        }
    }

    #[test]
    fn test_valid_names_and_orgs() {
        assert!(valid_name("admins"));
        assert!(valid_name("dev-team_2"));
        assert!(!valid_name(""));
        assert!(!valid_name("dev team"));
        assert!(!valid_name("dev.team"));
        assert!(valid_org("tecsisa"));
        assert!(!valid_org("tec/sisa"));
    }

    #[test]
    fn test_length_limits_are_exclusive() {
        assert!(valid_name(&"a".repeat(MAX_NAME_LENGTH - 1)));
        assert!(!valid_name(&"a".repeat(MAX_NAME_LENGTH)));
        assert!(valid_external_id(&"a".repeat(MAX_EXTERNAL_ID_LENGTH - 1)));
        assert!(!valid_external_id(&"a".repeat(MAX_EXTERNAL_ID_LENGTH)));

        let long_path = format!("/{}/", "a".repeat(MAX_PATH_LENGTH - 2));
        assert_eq!(long_path.len(), MAX_PATH_LENGTH);
        assert!(!valid_path(&long_path));
    }

    #[test]
    fn test_valid_external_id() {
        assert!(valid_external_id("alice@example.com"));
        assert!(valid_external_id("user+tag=1"));
        assert!(!valid_external_id("alice smith"));
        assert!(!valid_external_id("alice/smith"));
    }

    #[test]
    fn test_non_ascii_words_rejected() {
        assert!(!valid_name("grüppe"));
        assert!(!valid_external_id("ålice"));
    }

    #[test]
    fn test_valid_paths() {
        assert!(valid_path("/"));
        assert!(valid_path("/path/"));
        assert!(valid_path("/a/b-c/d_e/"));
        assert!(!valid_path(""));
        assert!(!valid_path("/path"));
        assert!(!valid_path("path/"));
        assert!(!valid_path("//"));
        assert!(!valid_path("/a//b/"));
        assert!(!valid_path("/a/b*/"));
    }

    #[test]
    fn test_valid_order() {
        assert!(valid_order("name-asc"));
        assert!(valid_order("createAt-desc"));
        assert!(!valid_order("name"));
        assert!(!valid_order("name-up"));
        assert!(!valid_order("name asc"));
    }

    #[test]
    fn test_valid_effect() {
        assert_eq!(valid_effect("allow").unwrap(), Effect::Allow);
        assert_eq!(valid_effect("deny").unwrap(), Effect::Deny);
        let err = valid_effect("Allow").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        assert!(valid_effect("").is_err());
    }

    #[test]
    fn test_valid_actions() {
        assert!(valid_actions(&["iam:GetUser", "iam:*", "product:Get*"]).is_ok());
        assert!(valid_actions(&["ab"]).is_ok());

        for bad in ["*", "iam::GetUser", "iam:**", "iam:Get User", "iam:", ":"] {
            let err = valid_actions(&[bad]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::PatternSyntax, "action {}", bad);
        }

        assert!(valid_actions(&["a".repeat(MAX_ACTION_LENGTH)]).is_ok());
        assert!(valid_actions(&["a".repeat(MAX_ACTION_LENGTH + 1)]).is_err());
    }

    #[test]
    fn test_valid_actions_fails_on_first_violation() {
        let err = valid_actions(&["iam:GetUser", "bad action", "iam::x"]).unwrap_err();
        match err {
            IamError::PatternSyntax { value, .. } => assert_eq!(value, "bad action"),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_valid_resource_patterns_accepts() {
        let accepted = [
            "*",
            "urn:*",
            "urn:iw*",
            "urn:iws:*",
            "urn:iws:iam:*",
            "urn:iws:iam:org1*",
            "urn:iws:iam::user/path/*",
            "urn:iws:iam::user/path/bob",
            "urn:iws:iam:org1:group/*",
            "urn:iws:iam:org1:policy/p/name",
            "urn:iws:iam:org1:*",
            "urn:iws:iam:org1:user*",
            "urn:ews:product:instance:example/resource",
            "urn:iam:*:*:*",
        ];
        for resource in accepted {
            assert!(
                valid_resource_patterns(&[resource]).is_ok(),
                "resource {} should be accepted",
                resource
            );
        }
    }

    #[test]
    fn test_valid_resource_patterns_rejects() {
        let rejected = [
            "",
            "urn",
            "**",
            "arn:iws:*",
            "urn::double::colon",
            "urn:iws:iam:",
            "urn:iws:iam:org1:user//path/*",
            "urn:iws:iam:org1:user/path/**",
            "urn:iws:iam:org1:user/pa*th/bob",
            "urn:iws:iam:org1:user/path/",
            "urn:i*s:iam:org1:user/path/",
            "urn:iws:iam:org 1:user/path/bob",
        ];
        for resource in rejected {
            assert_resource_kind(resource, ErrorKind::PatternSyntax);
        }
    }

    #[test]
    fn test_too_many_blocks_is_invalid_parameter() {
        assert_resource_kind("urn:iws:iam:org1:group/a:b", ErrorKind::InvalidParameter);
        assert_resource_kind("urn:a:b:c:d:e:f", ErrorKind::InvalidParameter);
    }

    #[test]
    fn test_built_urns_are_valid_patterns() {
        let urn = build_urn("org1", RESOURCE_POLICY, "/p/", "name");
        let prefix = build_pattern_prefix("org1", RESOURCE_POLICY, "/p/");
        let user_prefix = build_pattern_prefix("", RESOURCE_USER, "/");
        assert!(valid_resource_patterns(&[urn.as_str()]).is_ok());
        assert!(valid_resource_patterns(&[prefix.as_str()]).is_ok());
        assert!(valid_resource_patterns(&[user_prefix.as_str()]).is_ok());
        assert!(valid_urn(&urn));
        assert!(!valid_urn(&prefix));
    }

    #[test]
    fn test_valid_statements() {
        let good = Statement::new(
            Effect::Allow,
            vec!["iam:GetUser".to_string()],
            vec!["urn:iws:iam::user/path/*".to_string()],
        );
        assert!(valid_statements(&[good.clone()]).is_ok());

        let no_actions = Statement::new(Effect::Allow, vec![], good.resources.clone());
        assert_eq!(
            valid_statements(&[no_actions]).unwrap_err().kind(),
            ErrorKind::InvalidParameter
        );

        let no_resources = Statement::new(Effect::Deny, good.actions.clone(), vec![]);
        assert_eq!(
            valid_statements(&[good.clone(), no_resources]).unwrap_err().kind(),
            ErrorKind::InvalidParameter
        );

        let bad_resource = Statement::new(
            Effect::Deny,
            good.actions.clone(),
            vec!["urn::double::colon".to_string()],
        );
        assert_eq!(
            valid_statements(&[bad_resource]).unwrap_err().kind(),
            ErrorKind::PatternSyntax
        );
    }
}
