use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use polars::prelude::*;
use tracing::{debug, info};

use crate::error::{AppResult, AuthError};
use crate::hash::SecretHasher;
use crate::identity::{AccountStatus, Principal};

use super::{CredentialStore, StoreError};

/// Parquet-backed user table. Columns: username, password_hash, capabilities
/// (comma-joined), enabled, locked. A missing file reads as an empty table;
/// an unreadable one is an infrastructure fault.
pub struct ParquetCredentialStore {
    path: PathBuf,
    // Serializes provisioning writes; lookups re-read the file and need no lock.
    write_lock: Mutex<()>,
}

fn mk_schema_df() -> DataFrame {
    let usernames: Series = Series::new("username".into(), Vec::<String>::new());
    let hashes: Series = Series::new("password_hash".into(), Vec::<String>::new());
    let capabilities: Series = Series::new("capabilities".into(), Vec::<String>::new());
    let enabled: Series = Series::new("enabled".into(), Vec::<bool>::new());
    let locked: Series = Series::new("locked".into(), Vec::<bool>::new());
    DataFrame::new(vec![
        usernames.into(),
        hashes.into(),
        capabilities.into(),
        enabled.into(),
        locked.into(),
    ])
    .unwrap()
}

fn unavailable(e: PolarsError) -> StoreError {
    StoreError::Unavailable(e.to_string())
}

fn any_str(av: &AnyValue) -> Option<String> {
    match av {
        AnyValue::String(s) => Some((*s).to_string()),
        AnyValue::StringOwned(s) => Some(s.to_string()),
        _ => None,
    }
}

fn parse_capabilities(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(|c| c.to_string())
        .collect()
}

impl ParquetCredentialStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    fn read_df(&self) -> Result<DataFrame, StoreError> {
        if !self.path.exists() {
            return Ok(mk_schema_df());
        }
        let file = std::fs::File::open(&self.path)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        ParquetReader::new(file)
            .finish()
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    fn write_df(&self, mut df: DataFrame) -> AppResult<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir).ok();
        }
        let mut f = std::fs::File::create(&self.path)
            .map_err(|e| AuthError::store_unavailable(e.to_string()))?;
        ParquetWriter::new(&mut f)
            .finish(&mut df)
            .map_err(|e| AuthError::store_unavailable(e.to_string()))?;
        Ok(())
    }

    fn str_cell(df: &DataFrame, name: &str, i: usize) -> Result<Option<String>, StoreError> {
        let av = df
            .column(name)
            .map_err(unavailable)?
            .get(i)
            .map_err(unavailable)?;
        Ok(any_str(&av))
    }

    fn bool_cell(df: &DataFrame, name: &str, i: usize, default: bool) -> Result<bool, StoreError> {
        Ok(df
            .column(name)
            .map_err(unavailable)?
            .bool()
            .map_err(unavailable)?
            .get(i)
            .unwrap_or(default))
    }

    fn row_principal(df: &DataFrame, i: usize) -> Result<Principal, StoreError> {
        let username = Self::str_cell(df, "username", i)?
            .ok_or_else(|| StoreError::Unavailable("username column malformed".into()))?;
        let digest = Self::str_cell(df, "password_hash", i)?
            .ok_or_else(|| StoreError::Unavailable("password_hash column malformed".into()))?;
        let caps_raw = Self::str_cell(df, "capabilities", i)?.unwrap_or_default();
        let enabled = Self::bool_cell(df, "enabled", i, true)?;
        let locked = Self::bool_cell(df, "locked", i, false)?;
        Ok(Principal {
            username,
            secret_digest: digest,
            capabilities: parse_capabilities(&caps_raw),
            status: AccountStatus {
                enabled,
                locked,
                ..AccountStatus::default()
            },
        })
    }

    /// Hash the secret and append a row. Duplicate usernames are rejected;
    /// provisioning is a startup concern, so violations are configuration
    /// errors.
    pub fn provision(
        &self,
        hasher: &dyn SecretHasher,
        username: &str,
        secret: &str,
        capabilities: &[String],
    ) -> AppResult<()> {
        if username.trim().is_empty() {
            return Err(AuthError::configuration("username must be non-empty"));
        }
        let _guard = self.write_lock.lock();
        let df = self
            .read_df()
            .map_err(|e| AuthError::store_unavailable(e.to_string()))?;
        for i in 0..df.height() {
            let p = Self::row_principal(&df, i)
                .map_err(|e| AuthError::store_unavailable(e.to_string()))?;
            if p.username == username {
                return Err(AuthError::configuration(format!(
                    "duplicate user '{}'",
                    username
                )));
            }
        }
        let digest = hasher.hash(secret)?;
        let caps = capabilities.join(",");
        let new = DataFrame::new(vec![
            Series::new("username".into(), vec![username.to_string()]).into(),
            Series::new("password_hash".into(), vec![digest]).into(),
            Series::new("capabilities".into(), vec![caps]).into(),
            Series::new("enabled".into(), vec![true]).into(),
            Series::new("locked".into(), vec![false]).into(),
        ])
        .map_err(|e| AuthError::store_unavailable(e.to_string()))?;
        let out = if df.height() == 0 {
            new
        } else {
            df.vstack(&new)
                .map_err(|e| AuthError::store_unavailable(e.to_string()))?
        };
        self.write_df(out)?;
        info!("store: provisioned user={} into {}", username, self.path.display());
        Ok(())
    }
}

impl CredentialStore for ParquetCredentialStore {
    fn find_by_username(&self, username: &str) -> Result<Principal, StoreError> {
        let df = self.read_df()?;
        for i in 0..df.height() {
            let matches = Self::str_cell(&df, "username", i)?.as_deref() == Some(username);
            if matches {
                debug!("store: hit user={} in {}", username, self.path.display());
                return Self::row_principal(&df, i);
            }
        }
        Err(StoreError::NotFound)
    }
}
