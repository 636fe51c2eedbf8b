//! Secret hashing seam. The digest format (PHC string) is opaque to every
//! other module; only this file knows the algorithm.

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use password_hash::{PasswordHash, SaltString};

use crate::error::{AppResult, AuthError};

/// One-way hashing/verification primitive. Implementations must be slow and
/// salted; plaintext never leaves the call.
pub trait SecretHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> AppResult<String>;
    fn verify(&self, plaintext: &str, digest: &str) -> bool;
}

/// Argon2id with default parameters and a random 16-byte salt.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2SecretHasher;

impl SecretHasher for Argon2SecretHasher {
    fn hash(&self, plaintext: &str) -> AppResult<String> {
        let mut salt_bytes = [0u8; 16];
        getrandom::getrandom(&mut salt_bytes)
            .map_err(|e| AuthError::configuration(e.to_string()))?;
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| AuthError::configuration(e.to_string()))?;
        let argon2 = Argon2::default();
        let phc = argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| AuthError::configuration(e.to_string()))?
            .to_string();
        Ok(phc)
    }

    fn verify(&self, plaintext: &str, digest: &str) -> bool {
        if let Ok(parsed) = PasswordHash::new(digest) {
            Argon2::default()
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok()
        } else {
            false
        }
    }
}
