//! Composition root. Owns the gate and the router, built once at startup and
//! shared by reference with the serving environment; per-request state never
//! outlives the call.

use std::sync::Arc;

use tracing::debug;

use crate::authz::{AuthState, AuthorizationRouter, Decision};
use crate::error::{AppResult, AuthError};
use crate::hash::SecretHasher;
use crate::identity::{AccessRequest, AuthenticationGate, IdentityResolver};
use crate::store::CredentialStore;

pub struct AccessControl {
    gate: AuthenticationGate,
    router: AuthorizationRouter,
}

impl AccessControl {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: Arc<dyn SecretHasher>,
        router: AuthorizationRouter,
    ) -> Self {
        Self {
            gate: AuthenticationGate::new(IdentityResolver::new(store), hasher),
            router,
        }
    }

    pub fn gate(&self) -> &AuthenticationGate {
        &self.gate
    }

    pub fn router(&self) -> &AuthorizationRouter {
        &self.router
    }

    /// Run one request through the state machine: gate first when
    /// credentials are supplied (a bad pair becomes the Rejected state, so
    /// open paths still allow), then the router. A store fault aborts the
    /// pipeline instead of masquerading as a security decision.
    pub fn handle(&self, req: &AccessRequest) -> AppResult<Decision> {
        let state = match &req.credentials {
            None => AuthState::Anonymous,
            Some(creds) => match self.gate.authenticate(&creds.username, &creds.secret) {
                Ok(principal) => AuthState::Authenticated(principal),
                Err(AuthError::InvalidCredentials) => AuthState::Rejected,
                Err(e) => return Err(e),
            },
        };
        let decision = self.router.authorize(&req.path, &state);
        debug!("access: {} {} -> {:?}", req.method, req.path, decision);
        Ok(decision)
    }
}
