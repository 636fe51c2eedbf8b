use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::store::{CredentialStore, StoreError};

use super::principal::Principal;

/// Capability granted when a backing record carries none.
pub const DEFAULT_CAPABILITY: &str = "read";

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("unknown user")]
    UnknownUser,
    #[error("credential store unavailable: {0}")]
    StoreUnavailable(String),
}

/// Adapts heterogeneous store records into the canonical Principal shape.
/// Performs no hashing.
pub struct IdentityResolver {
    store: Arc<dyn CredentialStore>,
}

impl IdentityResolver {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    pub fn resolve(&self, username: &str) -> Result<Principal, ResolveError> {
        let mut principal = self.store.find_by_username(username).map_err(|e| match e {
            StoreError::NotFound => ResolveError::UnknownUser,
            StoreError::Unavailable(msg) => ResolveError::StoreUnavailable(msg),
        })?;
        if principal.capabilities.is_empty() {
            debug!("identity: user={} has no capabilities, granting default", username);
            principal
                .capabilities
                .insert(DEFAULT_CAPABILITY.to_string());
        }
        Ok(principal)
    }
}
