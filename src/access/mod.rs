//! Role-based route authorization.
//!
//! Every rule is checked against the same request; a single matching rule
//! whose allowed set excludes the session role is enough to deny.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::types::{AuthenticatedSession, Role};

pub const DENIED_PATH: &str = "/denied";

/// How a rule prefix is compared against the request path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrefixMatch {
    /// `/admin` matches `/admin` and `/admin/...` only
    Segment,
    /// Plain string prefix, so `/administrator` also matches `/admin`
    Raw,
}

impl FromStr for PrefixMatch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "segment" => Ok(PrefixMatch::Segment),
            "raw" => Ok(PrefixMatch::Raw),
            other => Err(format!("unknown prefix match mode '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    pub prefix: String,
    pub allowed: Vec<Role>,
}

impl RouteRule {
    pub fn new(prefix: impl Into<String>, allowed: &[Role]) -> Self {
        Self {
            prefix: prefix.into(),
            allowed: allowed.to_vec(),
        }
    }

    fn matches(&self, path: &str, mode: PrefixMatch) -> bool {
        match mode {
            PrefixMatch::Raw => path.starts_with(&self.prefix),
            PrefixMatch::Segment => match path.strip_prefix(self.prefix.as_str()) {
                Some(rest) => rest.is_empty() || rest.starts_with('/'),
                None => false,
            },
        }
    }

    fn permits(&self, session: &AuthenticatedSession) -> bool {
        session.role.map_or(false, |role| self.allowed.contains(&role))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum AccessDecision {
    Allow,
    DenyRewrite { target: String },
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allow)
    }
}

#[derive(Debug, Clone)]
pub struct RouteGuard {
    rules: Vec<RouteRule>,
    mode: PrefixMatch,
    denied_path: String,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new(Self::default_rules(), PrefixMatch::Segment, DENIED_PATH)
    }
}

impl RouteGuard {
    pub fn new(rules: Vec<RouteRule>, mode: PrefixMatch, denied_path: impl Into<String>) -> Self {
        Self {
            rules,
            mode,
            denied_path: denied_path.into(),
        }
    }

    pub fn from_config(config: &crate::config::GuardConfig) -> Self {
        Self::new(Self::default_rules(), config.prefix_match, config.denied_path.clone())
    }

    pub fn default_rules() -> Vec<RouteRule> {
        vec![
            RouteRule::new("/admin", &[Role::Admin]),
            RouteRule::new("/staff", &[Role::Admin, Role::Staff]),
            RouteRule::new("/trainer", &[Role::Admin, Role::Trainer]),
        ]
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    pub fn denied_path(&self) -> &str {
        &self.denied_path
    }

    /// Whether any rule applies to the path at all
    pub fn is_guarded(&self, path: &str) -> bool {
        self.rules.iter().any(|rule| rule.matches(path, self.mode))
    }

    pub fn evaluate(&self, path: &str, session: &AuthenticatedSession) -> AccessDecision {
        let denied_by = self
            .rules
            .iter()
            .filter(|rule| rule.matches(path, self.mode))
            .find(|rule| !rule.permits(session));

        match denied_by {
            Some(rule) => {
                if session.has_claim() {
                    tracing::warn!(
                        "Route guard denied {} for role '{}' (rule {})",
                        path,
                        session.raw_role.as_deref().unwrap_or_default(),
                        rule.prefix
                    );
                } else {
                    tracing::warn!("Route guard denied {}: no session role claim", path);
                }
                AccessDecision::DenyRewrite {
                    target: self.denied_path.clone(),
                }
            }
            None => {
                tracing::debug!("Route guard allowed {}", path);
                AccessDecision::Allow
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deny() -> AccessDecision {
        AccessDecision::DenyRewrite {
            target: DENIED_PATH.to_string(),
        }
    }

    #[test]
    fn admin_pages_require_admin() {
        let guard = RouteGuard::default();
        assert_eq!(
            guard.evaluate("/admin/manage-staffs", &AuthenticatedSession::with_role(Role::Staff)),
            deny()
        );
        assert_eq!(
            guard.evaluate("/admin/manage-staffs", &AuthenticatedSession::with_role(Role::Admin)),
            AccessDecision::Allow
        );
    }

    #[test]
    fn role_matrix() {
        let guard = RouteGuard::default();
        let cases = [
            ("/admin", Role::Admin, true),
            ("/admin", Role::Staff, false),
            ("/admin", Role::Trainer, false),
            ("/staff/manage-cage", Role::Admin, true),
            ("/staff/manage-cage", Role::Staff, true),
            ("/staff/manage-cage", Role::Trainer, false),
            ("/trainer", Role::Admin, true),
            ("/trainer", Role::Staff, false),
            ("/trainer/schedule", Role::Trainer, true),
        ];

        for (path, role, allowed) in cases {
            let decision = guard.evaluate(path, &AuthenticatedSession::with_role(role));
            assert_eq!(decision.is_allowed(), allowed, "{} as {}", path, role);
        }
    }

    #[test]
    fn absent_claim_is_denied_under_every_guarded_prefix() {
        let guard = RouteGuard::default();
        for path in ["/admin", "/staff/manage-news/3", "/trainer"] {
            assert_eq!(guard.evaluate(path, &AuthenticatedSession::anonymous()), deny());
        }
    }

    #[test]
    fn unguarded_paths_always_pass() {
        let guard = RouteGuard::default();
        for path in ["/", "/denied", "/health", "/news"] {
            assert!(guard.evaluate(path, &AuthenticatedSession::anonymous()).is_allowed());
            assert!(!guard.is_guarded(path));
        }
    }

    #[test]
    fn unknown_role_is_not_in_any_allowed_set() {
        let guard = RouteGuard::default();
        let session = AuthenticatedSession::from_claim(None, Some("keeper".into()));
        assert_eq!(guard.evaluate("/staff", &session), deny());
        assert!(guard.evaluate("/", &session).is_allowed());
    }

    #[test]
    fn segment_matching_ignores_lookalike_paths() {
        let guard = RouteGuard::default();
        let staff = AuthenticatedSession::with_role(Role::Staff);
        assert!(guard.evaluate("/administrator", &staff).is_allowed());
        assert!(guard.evaluate("/staffroom", &AuthenticatedSession::anonymous()).is_allowed());
    }

    #[test]
    fn raw_matching_keeps_plain_prefix_semantics() {
        let guard = RouteGuard::new(RouteGuard::default_rules(), PrefixMatch::Raw, DENIED_PATH);
        let staff = AuthenticatedSession::with_role(Role::Staff);
        assert_eq!(guard.evaluate("/administrator", &staff), deny());
        assert!(guard.is_guarded("/trainers"));
    }

    #[test]
    fn every_matching_rule_is_checked() {
        // Overlapping rules: passing the first one does not short-circuit the second
        let rules = vec![
            RouteRule::new("/staff", &[Role::Admin, Role::Staff]),
            RouteRule::new("/staff/payroll", &[Role::Admin]),
        ];
        let guard = RouteGuard::new(rules, PrefixMatch::Segment, DENIED_PATH);
        let staff = AuthenticatedSession::with_role(Role::Staff);
        assert!(guard.evaluate("/staff/news", &staff).is_allowed());
        assert_eq!(guard.evaluate("/staff/payroll/2024", &staff), deny());
    }

    #[test]
    fn prefix_mode_parses_from_config_strings() {
        assert_eq!("Segment".parse::<PrefixMatch>(), Ok(PrefixMatch::Segment));
        assert_eq!("raw".parse::<PrefixMatch>(), Ok(PrefixMatch::Raw));
        assert!("regex".parse::<PrefixMatch>().is_err());
    }
}
