/// Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Dashboard roles carried in the session `role` claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
    Trainer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Staff => "staff",
            Role::Trainer => "trainer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "staff" => Ok(Role::Staff),
            "trainer" => Ok(Role::Trainer),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Session context for one request, read by the guard and never mutated.
///
/// `raw_role` keeps the claim string as received so that an unrecognised role
/// can be told apart from a missing claim in logs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthenticatedSession {
    pub subject: Option<String>,
    pub role: Option<Role>,
    pub raw_role: Option<String>,
}

impl AuthenticatedSession {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_role(role: Role) -> Self {
        Self {
            subject: None,
            role: Some(role),
            raw_role: Some(role.as_str().to_string()),
        }
    }

    /// Build a session from a raw claim value; unknown strings keep `role` empty.
    pub fn from_claim(subject: Option<String>, raw_role: Option<String>) -> Self {
        let role = raw_role.as_deref().and_then(|r| r.parse().ok());
        Self { subject, role, raw_role }
    }

    pub fn has_claim(&self) -> bool {
        self.raw_role.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_parsing_is_exact() {
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert!("Admin".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn unknown_claim_keeps_raw_value() {
        let session = AuthenticatedSession::from_claim(None, Some("guest".into()));
        assert_eq!(session.role, None);
        assert!(session.has_claim());
        assert!(!AuthenticatedSession::anonymous().has_claim());
    }
}
