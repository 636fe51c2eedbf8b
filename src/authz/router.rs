use std::collections::HashSet;

use serde::Deserialize;
use tracing::debug;

use crate::error::{AppResult, AuthError};
use crate::identity::AuthenticatedPrincipal;

use super::pattern::PathPattern;

/// One entry of the ordered policy list. Callers must place narrower
/// patterns before broader ones: evaluation is first-match-wins and the
/// router does not compute specificity, so a broad rule placed early
/// silently shadows every later rule it covers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AuthorizationRule {
    pub pattern: String,
    pub requires_authentication: bool,
}

impl AuthorizationRule {
    pub fn open<S: Into<String>>(pattern: S) -> Self {
        Self {
            pattern: pattern.into(),
            requires_authentication: false,
        }
    }

    pub fn protected<S: Into<String>>(pattern: S) -> Self {
        Self {
            pattern: pattern.into(),
            requires_authentication: true,
        }
    }
}

/// Authentication state of the request at authorization time.
#[derive(Debug, Clone)]
pub enum AuthState {
    Anonymous,
    Authenticated(AuthenticatedPrincipal),
    Rejected,
}

/// Outward decision signal for the transport layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Request proceeds to the downstream handler.
    Allow(Option<AuthenticatedPrincipal>),
    /// Maps to an unauthorized (401) response.
    RequireAuthentication,
    /// Maps to a forbidden (403) response.
    Deny,
}

impl Decision {
    /// Status to return when the request does not proceed; `None` for Allow.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Decision::Allow(_) => None,
            Decision::RequireAuthentication => Some(401),
            Decision::Deny => Some(403),
        }
    }
}

#[derive(Debug)]
struct CompiledRule {
    pattern: PathPattern,
    requires_authentication: bool,
}

/// Ordered first-match-wins path policy. Rules are compiled once at startup
/// and immutable afterwards; evaluation takes no locks.
#[derive(Debug)]
pub struct AuthorizationRouter {
    rules: Vec<CompiledRule>,
}

impl AuthorizationRouter {
    /// Compile the rule list. A malformed pattern or an exact duplicate
    /// (a fully shadowed, unreachable rule) fails construction so the
    /// process refuses to start under an ambiguous policy.
    pub fn new(rules: Vec<AuthorizationRule>) -> AppResult<Self> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            if !seen.insert(rule.pattern.clone()) {
                return Err(AuthError::configuration(format!(
                    "unreachable rule: pattern '{}' already listed",
                    rule.pattern
                )));
            }
            compiled.push(CompiledRule {
                pattern: PathPattern::compile(&rule.pattern)?,
                requires_authentication: rule.requires_authentication,
            });
        }
        debug!("authz: compiled {} rule(s)", compiled.len());
        Ok(Self { rules: compiled })
    }

    fn first_match(&self, path: &str) -> Option<&CompiledRule> {
        self.rules.iter().find(|r| r.pattern.matches(path))
    }

    /// Decide whether `path` may proceed given the request's authentication
    /// state. No rule matching the path is treated as requiring
    /// authentication (fail-closed).
    pub fn authorize(&self, path: &str, state: &AuthState) -> Decision {
        let requires_auth = match self.first_match(path) {
            Some(rule) => {
                debug!(
                    "authz: path={} matched pattern '{}' (requires_auth={})",
                    path,
                    rule.pattern.raw(),
                    rule.requires_authentication
                );
                rule.requires_authentication
            }
            None => {
                debug!("authz: path={} matched no rule, failing closed", path);
                true
            }
        };
        let principal = match state {
            AuthState::Authenticated(p) => Some(p.clone()),
            _ => None,
        };
        if !requires_auth {
            return Decision::Allow(principal);
        }
        match state {
            AuthState::Authenticated(_) => Decision::Allow(principal),
            AuthState::Anonymous => Decision::RequireAuthentication,
            AuthState::Rejected => Decision::Deny,
        }
    }

    /// Convenience for callers holding a principal-or-absent rather than a
    /// full authentication state.
    pub fn authorize_principal(
        &self,
        path: &str,
        principal: Option<&AuthenticatedPrincipal>,
    ) -> Decision {
        match principal {
            Some(p) => self.authorize(path, &AuthState::Authenticated(p.clone())),
            None => self.authorize(path, &AuthState::Anonymous),
        }
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    fn principal(name: &str) -> AuthenticatedPrincipal {
        AuthenticatedPrincipal {
            username: name.to_string(),
            capabilities: BTreeSet::from(["read".to_string()]),
        }
    }

    fn router(rules: Vec<AuthorizationRule>) -> AuthorizationRouter {
        AuthorizationRouter::new(rules).expect("router")
    }

    #[test]
    fn narrow_exemption_before_catch_all() {
        let r = router(vec![
            AuthorizationRule::open("/hello"),
            AuthorizationRule::protected("**"),
        ]);
        assert_eq!(
            r.authorize_principal("/hello", None),
            Decision::Allow(None)
        );
        assert_eq!(
            r.authorize_principal("/status", None),
            Decision::RequireAuthentication
        );
        let p = principal("mary");
        assert_eq!(
            r.authorize_principal("/status", Some(&p)),
            Decision::Allow(Some(p.clone()))
        );
    }

    #[test]
    fn broad_rule_first_shadows_the_exemption() {
        // Same rules, reordered: the catch-all wins for /hello too.
        let r = router(vec![
            AuthorizationRule::protected("**"),
            AuthorizationRule::open("/hello"),
        ]);
        assert_eq!(
            r.authorize_principal("/hello", None),
            Decision::RequireAuthentication
        );
    }

    #[test]
    fn no_matching_rule_fails_closed() {
        let r = router(vec![AuthorizationRule::open("/hello")]);
        assert_eq!(
            r.authorize_principal("/other", None),
            Decision::RequireAuthentication
        );
        let p = principal("mary");
        assert_eq!(
            r.authorize_principal("/other", Some(&p)),
            Decision::Allow(Some(p))
        );
    }

    #[test]
    fn open_rule_allows_regardless_of_state() {
        let r = router(vec![AuthorizationRule::open("/hello")]);
        assert_eq!(
            r.authorize("/hello", &AuthState::Rejected),
            Decision::Allow(None)
        );
        assert_eq!(
            r.authorize("/hello", &AuthState::Anonymous),
            Decision::Allow(None)
        );
    }

    #[test]
    fn rejected_state_on_protected_path_is_denied() {
        let r = router(vec![AuthorizationRule::protected("**")]);
        assert_eq!(r.authorize("/status", &AuthState::Rejected), Decision::Deny);
        assert_eq!(Decision::Deny.http_status(), Some(403));
        assert_eq!(Decision::RequireAuthentication.http_status(), Some(401));
    }

    #[test]
    fn duplicate_pattern_is_a_configuration_error() {
        let err = AuthorizationRouter::new(vec![
            AuthorizationRule::protected("/a/**"),
            AuthorizationRule::open("/a/**"),
        ])
        .unwrap_err();
        assert_eq!(err.code_str(), "configuration_error");
    }

    #[test]
    fn malformed_pattern_fails_construction() {
        assert!(AuthorizationRouter::new(vec![AuthorizationRule::open("")]).is_err());
        assert!(
            AuthorizationRouter::new(vec![AuthorizationRule::protected("/x/***")]).is_err()
        );
    }

    #[test]
    fn rule_deserializes_from_json() {
        let rule: AuthorizationRule =
            serde_json::from_str(r#"{"pattern": "/a/**", "requires_authentication": true}"#)
                .expect("parse");
        assert_eq!(rule, AuthorizationRule::protected("/a/**"));
    }
}
