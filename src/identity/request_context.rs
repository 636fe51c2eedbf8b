/// Presented credential pair, as handed over by the transport layer.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub secret: String,
}

/// Incoming request descriptor from the transport layer. The core never sees
/// headers or bodies; method, target path and optional credentials are the
/// whole boundary.
#[derive(Debug, Clone)]
pub struct AccessRequest {
    pub method: String,
    pub path: String,
    pub credentials: Option<Credentials>,
}

impl AccessRequest {
    pub fn anonymous<S: Into<String>>(method: S, path: S) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            credentials: None,
        }
    }

    pub fn with_credentials<S: Into<String>>(method: S, path: S, username: S, secret: S) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            credentials: Some(Credentials {
                username: username.into(),
                secret: secret.into(),
            }),
        }
    }
}
