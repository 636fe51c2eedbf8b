//! Unified error model for the authentication/authorization core.
//! External callers see exactly one credential failure shape; infrastructure
//! faults and configuration defects map to their own variants so transports
//! never render them as "invalid credentials".

use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown user or wrong secret. Deliberately carries no detail: the two
    /// cases must be indistinguishable to the caller.
    InvalidCredentials,
    /// The credential store could not be reached or read. Infrastructure
    /// fault, not a security decision.
    StoreUnavailable { message: String },
    /// Malformed or unreachable authorization rule, bad seed config. Detected
    /// at startup; the process must refuse to serve under an ambiguous policy.
    Configuration { message: String },
}

impl AuthError {
    pub fn store_unavailable<S: Into<String>>(msg: S) -> Self {
        AuthError::StoreUnavailable { message: msg.into() }
    }

    pub fn configuration<S: Into<String>>(msg: S) -> Self {
        AuthError::Configuration { message: msg.into() }
    }

    pub fn code_str(&self) -> &str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::StoreUnavailable { .. } => "store_unavailable",
            AuthError::Configuration { .. } => "configuration_error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AuthError::InvalidCredentials => "invalid credentials",
            AuthError::StoreUnavailable { message } | AuthError::Configuration { message } => {
                message.as_str()
            }
        }
    }

    /// Map to HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            AuthError::InvalidCredentials => 401,
            AuthError::StoreUnavailable { .. } => 503,
            AuthError::Configuration { .. } => 500,
        }
    }
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code_str(), self.message())
    }
}

impl std::error::Error for AuthError {}

pub type AppResult<T> = Result<T, AuthError>;

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        // Default mapping: treat as a configuration fault unless downcasted elsewhere
        AuthError::Configuration { message: err.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_mapping() {
        assert_eq!(AuthError::InvalidCredentials.http_status(), 401);
        assert_eq!(AuthError::store_unavailable("down").http_status(), 503);
        assert_eq!(AuthError::configuration("bad rule").http_status(), 500);
    }

    #[test]
    fn invalid_credentials_carries_no_detail() {
        let e = AuthError::InvalidCredentials;
        assert_eq!(e.code_str(), "invalid_credentials");
        assert_eq!(e.message(), "invalid credentials");
        assert_eq!(e.to_string(), "invalid_credentials: invalid credentials");
    }

    #[test]
    fn anyhow_maps_to_configuration() {
        let e: AuthError = anyhow::anyhow!("seed user missing secret").into();
        assert_eq!(e.http_status(), 500);
        assert_eq!(e.message(), "seed user missing secret");
    }
}
