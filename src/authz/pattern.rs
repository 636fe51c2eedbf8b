use regex::Regex;

use crate::error::{AppResult, AuthError};

/// Path-matching expression with three wildcard tokens:
/// `?` matches exactly one character, `*` matches zero-or-more characters
/// within a path segment, `**` matches zero-or-more whole segments.
///
/// Compiled once to an anchored regex; matching is allocation-free.
#[derive(Debug, Clone)]
pub struct PathPattern {
    raw: String,
    regex: Regex,
}

impl PathPattern {
    pub fn compile(raw: &str) -> AppResult<Self> {
        if raw.is_empty() {
            return Err(AuthError::configuration("empty authorization pattern"));
        }
        if raw.contains("***") {
            return Err(AuthError::configuration(format!(
                "ambiguous wildcard run in pattern '{}'",
                raw
            )));
        }
        let mut re = String::with_capacity(raw.len() + 8);
        re.push('^');
        let chars: Vec<char> = raw.chars().collect();
        let mut i = 0usize;
        while i < chars.len() {
            let c = chars[i];
            if c == '/' && chars.get(i + 1) == Some(&'*') && chars.get(i + 2) == Some(&'*') {
                // `/x/**` also matches `/x` itself: the slash is optional
                // together with the swallowed segments.
                re.push_str("(?:/.*)?");
                i += 3;
            } else if c == '*' && chars.get(i + 1) == Some(&'*') {
                re.push_str(".*");
                i += 2;
            } else if c == '*' {
                re.push_str("[^/]*");
                i += 1;
            } else if c == '?' {
                re.push_str("[^/]");
                i += 1;
            } else {
                if "\\.+()[]{}|^$".contains(c) {
                    re.push('\\');
                }
                re.push(c);
                i += 1;
            }
        }
        re.push('$');
        let regex = Regex::new(&re)
            .map_err(|e| AuthError::configuration(format!("pattern '{}': {}", raw, e)))?;
        Ok(Self {
            raw: raw.to_string(),
            regex,
        })
    }

    pub fn matches(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pat(raw: &str) -> PathPattern {
        PathPattern::compile(raw).expect("compile")
    }

    #[test]
    fn literal_patterns_match_exactly() {
        let p = pat("/hello");
        assert!(p.matches("/hello"));
        assert!(!p.matches("/hello/there"));
        assert!(!p.matches("/hell"));
    }

    #[test]
    fn question_mark_matches_one_char() {
        let p = pat("/a?c");
        assert!(p.matches("/abc"));
        assert!(!p.matches("/abbc"));
        assert!(!p.matches("/ac"));
        assert!(!p.matches("/a/c"));
    }

    #[test]
    fn star_matches_within_a_segment() {
        let p = pat("/a*c");
        assert!(p.matches("/abc"));
        assert!(p.matches("/ac"));
        assert!(p.matches("/abbbc"));
        assert!(!p.matches("/a/c"));
    }

    #[test]
    fn double_star_crosses_segments() {
        let p = pat("/a/**");
        assert!(p.matches("/a/b/c"));
        assert!(p.matches("/a/b"));
        assert!(p.matches("/a"));
        assert!(!p.matches("/ab"));
    }

    #[test]
    fn bare_double_star_matches_everything() {
        let p = pat("**");
        assert!(p.matches("/hello"));
        assert!(p.matches("/a/b/c"));
        assert!(p.matches(""));
    }

    #[test]
    fn double_star_in_the_middle_spans_zero_or_more_segments() {
        let p = pat("/api/**/status");
        assert!(p.matches("/api/status"));
        assert!(p.matches("/api/v1/status"));
        assert!(p.matches("/api/v1/internal/status"));
        assert!(!p.matches("/api/v1/health"));
    }

    #[test]
    fn regex_metacharacters_are_literal() {
        let p = pat("/v1.0/items");
        assert!(p.matches("/v1.0/items"));
        assert!(!p.matches("/v1x0/items"));
    }

    #[test]
    fn malformed_patterns_fail_compilation() {
        assert!(PathPattern::compile("").is_err());
        assert!(PathPattern::compile("/a/***").is_err());
        let err = PathPattern::compile("").unwrap_err();
        assert_eq!(err.http_status(), 500);
    }
}
