//! Pattern matching for IAM resource URNs
//!
//! Supports wildcards:
//! - trailing `*` - Matches every URN sharing the literal prefix before it
//!   (e.g., `urn:iws:iam::user/path/*`)
//! - `*` as a whole `:` block - Matches any single block (e.g., `urn:iam:*:*:*`)
//!
//! Patterns are checked by the validator before they reach the matcher, so a
//! `*` only ever appears at the end of a pattern or as a whole block.

/// Pattern matcher for resource URNs and actions
pub struct PatternMatcher;

impl PatternMatcher {
    /// Check if a URN matches a pattern
    ///
    /// # Examples
    /// ```
    /// use authorizr::iam::PatternMatcher;
    ///
    /// assert!(PatternMatcher::matches("urn:iws:iam::user/path/*", "urn:iws:iam::user/path/bob"));
    /// assert!(PatternMatcher::matches("urn:iws:iam::user/path/bob", "urn:iws:iam::user/path/bob"));
    /// assert!(!PatternMatcher::matches("urn:iws:iam::user/path/*", "urn:iws:iam::user/other/bob"));
    /// ```
    pub fn matches(pattern: &str, urn: &str) -> bool {
        // Exact match
        if !pattern.contains('*') {
            return pattern == urn;
        }

        let pattern_blocks: Vec<&str> = pattern.split(':').collect();
        // The final URN block absorbs any remaining colons so that a trailing
        // wildcard keeps plain prefix semantics.
        let urn_blocks: Vec<&str> = urn.splitn(pattern_blocks.len(), ':').collect();
        if urn_blocks.len() < pattern_blocks.len() {
            return false;
        }

        let last = pattern_blocks.len() - 1;
        pattern_blocks
            .iter()
            .zip(urn_blocks.iter())
            .enumerate()
            .all(|(i, (pat, block))| {
                if i == last {
                    Self::match_tail(pat, block)
                } else {
                    *pat == "*" || pat == block
                }
            })
    }

    /// Match the last block: literal, or prefix when it ends in `*`
    fn match_tail(pattern: &str, block: &str) -> bool {
        match pattern.strip_suffix('*') {
            Some(prefix) => block.starts_with(prefix),
            None => pattern == block,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert!(PatternMatcher::matches(
            "urn:iws:iam::user/path/alice",
            "urn:iws:iam::user/path/alice"
        ));
        assert!(!PatternMatcher::matches(
            "urn:iws:iam::user/path/alice",
            "urn:iws:iam::user/path/bob"
        ));
    }

    #[test]
    fn test_exact_match_is_not_prefix() {
        assert!(!PatternMatcher::matches(
            "urn:iws:iam::user/path/alice",
            "urn:iws:iam::user/path/alice2"
        ));
        assert!(!PatternMatcher::matches(
            "urn:iws:iam::user/path",
            "urn:iws:iam::user/path/alice"
        ));
    }

    #[test]
    fn test_case_sensitive() {
        assert!(!PatternMatcher::matches(
            "urn:iws:iam::user/path/alice",
            "urn:iws:iam::user/path/Alice"
        ));
        assert!(!PatternMatcher::matches(
            "urn:iws:iam::user/Path/*",
            "urn:iws:iam::user/path/alice"
        ));
    }

    #[test]
    fn test_trailing_wildcard() {
        let pattern = "urn:iws:iam::user/path/*";
        assert!(PatternMatcher::matches(pattern, "urn:iws:iam::user/path/bob"));
        assert!(PatternMatcher::matches(pattern, "urn:iws:iam::user/path/sub/bob"));
        assert!(!PatternMatcher::matches(pattern, "urn:iws:iam::user/other/bob"));
        assert!(!PatternMatcher::matches(pattern, "urn:iws:iam::user/pathology"));
    }

    #[test]
    fn test_wildcard_inside_name() {
        let pattern = "urn:iws:iam:org1:group/dev/back*";
        assert!(PatternMatcher::matches(pattern, "urn:iws:iam:org1:group/dev/backend"));
        assert!(PatternMatcher::matches(pattern, "urn:iws:iam:org1:group/dev/back"));
        assert!(!PatternMatcher::matches(pattern, "urn:iws:iam:org1:group/dev/front"));
    }

    #[test]
    fn test_short_prefix_patterns() {
        assert!(PatternMatcher::matches("*", "urn:iws:iam::user/path/bob"));
        assert!(PatternMatcher::matches("urn:*", "urn:iws:iam:org1:policy/p"));
        assert!(PatternMatcher::matches("urn:iws:*", "urn:iws:iam::user/bob"));
        assert!(PatternMatcher::matches("urn:iws:iam:org*", "urn:iws:iam:org1:group/g"));
        assert!(!PatternMatcher::matches("urn:ews:*", "urn:iws:iam::user/bob"));
        assert!(!PatternMatcher::matches("urn:iws:iam:org2*", "urn:iws:iam:org1:group/g"));
    }

    #[test]
    fn test_block_wildcards() {
        let pattern = "urn:iam:*:*:*";
        assert!(PatternMatcher::matches(pattern, "urn:iam:a:b:c/d"));
        assert!(PatternMatcher::matches(pattern, "urn:iam:x::user/bob"));
        assert!(!PatternMatcher::matches(pattern, "urn:iws:a:b:c"));
        assert!(!PatternMatcher::matches(pattern, "urn:iam:a:b"));
    }

    #[test]
    fn test_org_wildcard_block() {
        let pattern = "urn:iws:iam:*:group/*";
        assert!(PatternMatcher::matches(pattern, "urn:iws:iam:org1:group/devs"));
        assert!(PatternMatcher::matches(pattern, "urn:iws:iam:org2:group/a/ops"));
        assert!(!PatternMatcher::matches(pattern, "urn:iws:iam:org1:policy/devs"));
    }

    #[test]
    fn test_action_patterns() {
        assert!(PatternMatcher::matches("iam:*", "iam:GetUser"));
        assert!(PatternMatcher::matches("iam:Get*", "iam:GetUser"));
        assert!(PatternMatcher::matches("iam:GetUser", "iam:GetUser"));
        assert!(!PatternMatcher::matches("iam:Get*", "iam:ListUsers"));
        assert!(!PatternMatcher::matches("iam:*", "product:GetUser"));
    }
}
