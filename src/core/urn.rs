//! URN construction for IAM resources
//!
//! Every user, group and policy is stamped with a URN:
//! - Users: `urn:iws:iam::user<path><name>` (the organization block is always empty)
//! - Everything else: `urn:iws:iam:<org>:<resource_type><path><name>`
//!
//! The same template without a name and with a trailing `*` is the pattern
//! used in statements to cover everything under a path.

/// Resource type for groups
pub const RESOURCE_GROUP: &str = "group";
/// Resource type for users
pub const RESOURCE_USER: &str = "user";
/// Resource type for policies
pub const RESOURCE_POLICY: &str = "policy";

/// Build the URN of a resource
///
/// Components are expected to be validated already; this never fails.
/// For [`RESOURCE_USER`] the `org` argument is ignored.
///
/// # Examples
///
/// ```
/// use authorizr::urn::{build_urn, RESOURCE_POLICY, RESOURCE_USER};
///
/// assert_eq!(
///     build_urn("tecsisa", RESOURCE_POLICY, "/path/", "admins"),
///     "urn:iws:iam:tecsisa:policy/path/admins"
/// );
/// assert_eq!(
///     build_urn("ignored", RESOURCE_USER, "/path/", "bob"),
///     "urn:iws:iam::user/path/bob"
/// );
/// ```
pub fn build_urn(org: &str, resource_type: &str, path: &str, name: &str) -> String {
    match resource_type {
        RESOURCE_USER => format!("urn:iws:iam::user{}{}", path, name),
        _ => format!("urn:iws:iam:{}:{}{}{}", org, resource_type, path, name),
    }
}

/// Build the pattern that matches every resource of a type under `path`
///
/// # Examples
///
/// ```
/// use authorizr::urn::{build_pattern_prefix, RESOURCE_GROUP};
///
/// assert_eq!(
///     build_pattern_prefix("tecsisa", RESOURCE_GROUP, "/dev/"),
///     "urn:iws:iam:tecsisa:group/dev/*"
/// );
/// ```
pub fn build_pattern_prefix(org: &str, resource_type: &str, path: &str) -> String {
    match resource_type {
        RESOURCE_USER => format!("urn:iws:iam::user{}*", path),
        _ => format!("urn:iws:iam:{}:{}{}*", org, resource_type, path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_urn_drops_org() {
        assert_eq!(
            build_urn("org1", RESOURCE_USER, "/", "alice"),
            "urn:iws:iam::user/alice"
        );
        assert_eq!(
            build_urn("", RESOURCE_USER, "/a/b/", "alice"),
            "urn:iws:iam::user/a/b/alice"
        );
    }

    #[test]
    fn test_non_user_urn() {
        assert_eq!(
            build_urn("org1", RESOURCE_GROUP, "/", "devs"),
            "urn:iws:iam:org1:group/devs"
        );
        assert_eq!(
            build_urn("org1", "product", "/catalog/", "item-1"),
            "urn:iws:iam:org1:product/catalog/item-1"
        );
    }

    #[test]
    fn test_pattern_prefix() {
        assert_eq!(
            build_pattern_prefix("org1", RESOURCE_USER, "/path/"),
            "urn:iws:iam::user/path/*"
        );
        assert_eq!(
            build_pattern_prefix("org1", RESOURCE_POLICY, "/"),
            "urn:iws:iam:org1:policy/*"
        );
    }

    #[test]
    fn test_prefix_covers_built_urn() {
        let urn = build_urn("org1", RESOURCE_POLICY, "/p/", "name");
        let prefix = build_pattern_prefix("org1", RESOURCE_POLICY, "/p/");
        assert!(urn.starts_with(prefix.trim_end_matches('*')));
    }
}
