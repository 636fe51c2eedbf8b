//! Credential stores: a single read contract over heterogeneous backings.
//! Provisioning is a startup concern on the concrete types, not part of the
//! hot-path trait.

mod memory;
mod parquet;

pub use memory::MemoryCredentialStore;
pub use parquet::ParquetCredentialStore;

use thiserror::Error;

use crate::identity::Principal;

/// Lookup failure taxonomy. `NotFound` is a normal outcome; `Unavailable` is
/// an infrastructure fault and must never be conflated with "no such user".
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no record for that username")]
    NotFound,
    #[error("credential store unavailable: {0}")]
    Unavailable(String),
}

pub trait CredentialStore: Send + Sync {
    fn find_by_username(&self, username: &str) -> Result<Principal, StoreError>;
}
