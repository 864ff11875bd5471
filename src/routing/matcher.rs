//! Route matching logic.
//!
//! # Responsibilities
//! - Match the request path against an anchored expression
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - Query strings are not part of the matched path

use axum::http::Uri;
use regex::Regex;

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request URI matches this condition.
    fn matches(&self, uri: &Uri) -> bool;
}

/// Matches the request path against a regular expression.
#[derive(Debug, Clone)]
pub struct PathPatternMatcher {
    pattern: Regex,
}

impl PathPatternMatcher {
    /// Compile a path matcher.
    pub fn new(pattern: &str) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
        })
    }

    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }
}

impl Matcher for PathPatternMatcher {
    fn matches(&self, uri: &Uri) -> bool {
        self.pattern.is_match(uri.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_matcher() {
        let matcher = PathPatternMatcher::new("^/content/(we-retail)/.*").unwrap();
        assert!(matcher.matches(&Uri::from_static("/content/we-retail/en.html")));
        assert!(matcher.matches(&Uri::from_static("http://example.com/content/we-retail/en.html?wcmmode=disabled")));
        assert!(!matcher.matches(&Uri::from_static("/content/other/en.html")));
        assert!(!matcher.matches(&Uri::from_static("/CONTENT/we-retail/en.html")));
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(PathPatternMatcher::new("^/(unclosed").is_err());
    }
}
