use std::path::Path;

use regex::Regex;

/// A set of compiled ignore rules tested against root-relative paths.
///
/// Candidates are matched in the separator-prefixed form the rules are
/// written against (`/etc/app/conf`), and a rule hits if it matches
/// anywhere in that string.  Two independent instances exist per run:
/// one for the source tree, one for the destination tree.
#[derive(Debug, Default)]
pub struct PathMatcher {
    rules: Vec<Regex>,
}

impl PathMatcher {
    /// Wrap a compiled rule set.
    #[must_use]
    pub const fn new(rules: Vec<Regex>) -> Self {
        Self { rules }
    }

    /// Whether any rule matches the candidate string.
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        self.rules.iter().any(|rule| rule.is_match(candidate))
    }

    /// Whether any rule matches the root-relative path `rel`, checked in
    /// its separator-prefixed form.
    #[must_use]
    pub fn matches_rel(&self, rel: &Path) -> bool {
        self.matches(&format!("/{}", rel.display()))
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn matcher(patterns: &[&str]) -> PathMatcher {
        PathMatcher::new(
            patterns
                .iter()
                .map(|p| Regex::new(p).expect("test pattern should compile"))
                .collect(),
        )
    }

    #[test]
    fn empty_matcher_matches_nothing() {
        let m = PathMatcher::default();
        assert!(!m.matches("/anything"));
    }

    #[test]
    fn unanchored_match_anywhere_in_string() {
        let m = matcher(&["\\.swp$"]);
        assert!(m.matches_rel(Path::new("etc/app/conf.swp")));
        assert!(!m.matches_rel(Path::new("etc/app/conf.swp.bak")));
    }

    #[test]
    fn rules_see_the_leading_separator() {
        let m = matcher(&["^/build"]);
        assert!(m.matches_rel(Path::new("build/out.txt")));
        assert!(!m.matches_rel(Path::new("src/build/out.txt")));
    }

    #[test]
    fn any_rule_suffices() {
        let m = matcher(&["^/never", "b\\.txt$"]);
        assert!(m.matches_rel(Path::new("dir/b.txt")));
        assert!(!m.matches_rel(Path::new("dir/a.txt")));
    }

    #[test]
    fn directory_component_match() {
        let m = matcher(&["/\\.git/"]);
        assert!(m.matches_rel(Path::new(".git/config")));
        assert!(!m.matches_rel(Path::new(".gitignore")));
    }
}
