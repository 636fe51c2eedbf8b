//! Central identity handling: principal shapes, store-backed resolution and
//! the credential-verification gate.
//! Keep the public surface thin and split implementation across sub-modules.

mod gate;
mod principal;
mod request_context;
mod resolver;

pub use gate::AuthenticationGate;
pub use principal::{AccountStatus, AuthenticatedPrincipal, Principal};
pub use request_context::{AccessRequest, Credentials};
pub use resolver::{IdentityResolver, ResolveError, DEFAULT_CAPABILITY};
