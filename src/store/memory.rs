use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;

use crate::error::{AppResult, AuthError};
use crate::hash::SecretHasher;
use crate::identity::Principal;

use super::{CredentialStore, StoreError};

/// Process-lifetime user table. Provisioned at startup, read concurrently on
/// the request path.
#[derive(Default)]
pub struct MemoryCredentialStore {
    users: RwLock<HashMap<String, Principal>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an already-hashed record. Usernames must be non-empty and
    /// unique; violations are configuration defects, not runtime errors.
    pub fn insert(&self, principal: Principal) -> AppResult<()> {
        if principal.username.trim().is_empty() {
            return Err(AuthError::configuration("username must be non-empty"));
        }
        let mut users = self.users.write();
        if users.contains_key(&principal.username) {
            return Err(AuthError::configuration(format!(
                "duplicate user '{}'",
                principal.username
            )));
        }
        debug!("store: provisioned user={}", principal.username);
        users.insert(principal.username.clone(), principal);
        Ok(())
    }

    /// Hash the plaintext secret through the hasher and insert the record.
    /// Plaintext never reaches the table.
    pub fn provision<I>(
        &self,
        hasher: &dyn SecretHasher,
        username: &str,
        secret: &str,
        capabilities: I,
    ) -> AppResult<()>
    where
        I: IntoIterator<Item = String>,
    {
        let digest = hasher.hash(secret)?;
        let mut principal = Principal::new(username.to_string(), digest);
        principal.capabilities = capabilities.into_iter().collect();
        self.insert(principal)
    }

    pub fn len(&self) -> usize {
        self.users.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.read().is_empty()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn find_by_username(&self, username: &str) -> Result<Principal, StoreError> {
        self.users
            .read()
            .get(username)
            .cloned()
            .ok_or(StoreError::NotFound)
    }
}
