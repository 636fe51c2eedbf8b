//! Startup configuration surface: the ordered rule list plus seed users,
//! deserialized from JSON and validated before the process serves anything.

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::authz::{AuthorizationRouter, AuthorizationRule};
use crate::error::{AppResult, AuthError};
use crate::hash::SecretHasher;
use crate::store::MemoryCredentialStore;

/// Seed user declared in config. The secret is plaintext only here, in
/// transit to the hasher; it is digested before any store sees it.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedUser {
    pub username: String,
    pub secret: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AccessConfig {
    pub rules: Vec<AuthorizationRule>,
    #[serde(default)]
    pub users: Vec<SeedUser>,
}

impl AccessConfig {
    pub fn from_json(raw: &str) -> AppResult<Self> {
        serde_json::from_str(raw)
            .map_err(|e| AuthError::configuration(format!("invalid access config: {}", e)))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            AuthError::configuration(format!(
                "cannot read access config {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        Self::from_json(&raw)
    }

    /// Compile the rule list. Fatal on any malformed or unreachable rule.
    pub fn build_router(&self) -> AppResult<AuthorizationRouter> {
        AuthorizationRouter::new(self.rules.clone())
    }

    /// Provision every seed user into the store, hashing secrets on the way.
    pub fn seed_users(
        &self,
        store: &MemoryCredentialStore,
        hasher: &dyn SecretHasher,
    ) -> AppResult<()> {
        for user in &self.users {
            store.provision(
                hasher,
                &user.username,
                &user.secret,
                user.capabilities.iter().cloned(),
            )?;
        }
        info!("config: provisioned {} seed user(s)", self.users.len());
        Ok(())
    }
}
