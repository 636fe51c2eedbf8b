use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

fn default_true() -> bool {
    true
}

/// Account lifecycle flags. All default to the active state; a richer
/// lifecycle can flip individual flags without touching the principal shape.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountStatus {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub locked: bool,
    #[serde(default)]
    pub expired: bool,
    #[serde(default)]
    pub credentials_expired: bool,
}

impl Default for AccountStatus {
    fn default() -> Self {
        Self {
            enabled: true,
            locked: false,
            expired: false,
            credentials_expired: false,
        }
    }
}

impl AccountStatus {
    pub fn is_active(&self) -> bool {
        self.enabled && !self.locked && !self.expired && !self.credentials_expired
    }
}

/// A provisioned identity record. The secret is held only as a one-way
/// digest; plaintext is never stored. Immutable once provisioned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    pub secret_digest: String,
    #[serde(default)]
    pub capabilities: BTreeSet<String>,
    #[serde(default)]
    pub status: AccountStatus,
}

impl Principal {
    pub fn new<S: Into<String>>(username: S, secret_digest: S) -> Self {
        Self {
            username: username.into(),
            secret_digest: secret_digest.into(),
            capabilities: BTreeSet::new(),
            status: AccountStatus::default(),
        }
    }
}

/// What the gate hands out after a successful verification: the identity and
/// its capabilities, with the digest dropped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthenticatedPrincipal {
    pub username: String,
    #[serde(default)]
    pub capabilities: BTreeSet<String>,
}

impl AuthenticatedPrincipal {
    pub fn has_capability(&self, cap: &str) -> bool {
        self.capabilities.contains(cap)
    }
}

impl From<&Principal> for AuthenticatedPrincipal {
    fn from(p: &Principal) -> Self {
        Self {
            username: p.username.clone(),
            capabilities: p.capabilities.clone(),
        }
    }
}
