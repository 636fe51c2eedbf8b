use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{AppResult, AuthError};
use crate::hash::SecretHasher;

use super::principal::AuthenticatedPrincipal;
use super::resolver::{IdentityResolver, ResolveError};

/// Validates a presented credential pair against a resolved principal.
///
/// Unknown users, wrong secrets and inactive accounts all reject with the
/// same `InvalidCredentials`; only the log line differs. A store failure is
/// not a security decision and propagates as its own error.
pub struct AuthenticationGate {
    resolver: IdentityResolver,
    hasher: Arc<dyn SecretHasher>,
}

impl AuthenticationGate {
    pub fn new(resolver: IdentityResolver, hasher: Arc<dyn SecretHasher>) -> Self {
        Self { resolver, hasher }
    }

    pub fn authenticate(
        &self,
        username: &str,
        presented_secret: &str,
    ) -> AppResult<AuthenticatedPrincipal> {
        let principal = match self.resolver.resolve(username) {
            Ok(p) => p,
            Err(ResolveError::UnknownUser) => {
                debug!("auth: reject user={} (unknown)", username);
                return Err(AuthError::InvalidCredentials);
            }
            Err(ResolveError::StoreUnavailable(msg)) => {
                warn!("auth: credential store unavailable: {}", msg);
                return Err(AuthError::store_unavailable(msg));
            }
        };
        if !self
            .hasher
            .verify(presented_secret, &principal.secret_digest)
        {
            debug!("auth: reject user={} (secret mismatch)", username);
            return Err(AuthError::InvalidCredentials);
        }
        if !principal.status.is_active() {
            debug!("auth: reject user={} (account inactive)", username);
            return Err(AuthError::InvalidCredentials);
        }
        info!("auth: authenticated user={}", username);
        Ok(AuthenticatedPrincipal::from(&principal))
    }
}
