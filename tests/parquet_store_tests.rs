//! Parquet-backed credential store tests: provisioning, lookup and
//! authentication end to end over a real file.

use std::sync::Arc;

use tempfile::tempdir;

use palisade::error::AuthError;
use palisade::hash::{Argon2SecretHasher, SecretHasher};
use palisade::identity::{AuthenticationGate, IdentityResolver};
use palisade::store::{CredentialStore, ParquetCredentialStore, StoreError};

fn store_in(dir: &tempfile::TempDir) -> ParquetCredentialStore {
    ParquetCredentialStore::open(dir.path().join("user.parquet"))
}

#[test]
fn provision_then_find() {
    let tmp = tempdir().expect("tempdir");
    let store = store_in(&tmp);
    let hasher = Argon2SecretHasher;
    store
        .provision(&hasher, "mary", "test", &["read".to_string(), "write".to_string()])
        .expect("provision");

    let principal = store.find_by_username("mary").expect("find");
    assert_eq!(principal.username, "mary");
    assert!(principal.capabilities.contains("read"));
    assert!(principal.capabilities.contains("write"));
    assert!(principal.status.is_active());
    assert!(principal.secret_digest.starts_with("$argon2"));
    assert!(hasher.verify("test", &principal.secret_digest));
}

#[test]
fn several_users_share_one_table() {
    let tmp = tempdir().expect("tempdir");
    let store = store_in(&tmp);
    let hasher = Argon2SecretHasher;
    store.provision(&hasher, "mary", "test", &[]).expect("provision mary");
    store
        .provision(&hasher, "alice", "other", &["admin".to_string()])
        .expect("provision alice");

    assert_eq!(store.find_by_username("mary").expect("find").username, "mary");
    let alice = store.find_by_username("alice").expect("find");
    assert!(alice.capabilities.contains("admin"));
}

#[test]
fn missing_user_is_not_found_not_unavailable() {
    let tmp = tempdir().expect("tempdir");
    let store = store_in(&tmp);
    store
        .provision(&Argon2SecretHasher, "mary", "test", &[])
        .expect("provision");
    assert!(matches!(
        store.find_by_username("bob"),
        Err(StoreError::NotFound)
    ));
}

#[test]
fn duplicate_provisioning_is_rejected() {
    let tmp = tempdir().expect("tempdir");
    let store = store_in(&tmp);
    let hasher = Argon2SecretHasher;
    store.provision(&hasher, "mary", "test", &[]).expect("provision");
    let err = store.provision(&hasher, "mary", "again", &[]).unwrap_err();
    assert_eq!(err.code_str(), "configuration_error");
}

#[test]
fn gate_authenticates_against_the_parquet_table() {
    let tmp = tempdir().expect("tempdir");
    let store = store_in(&tmp);
    let hasher = Arc::new(Argon2SecretHasher);
    store
        .provision(&*hasher, "mary", "test", &[])
        .expect("provision");

    let gate = AuthenticationGate::new(IdentityResolver::new(Arc::new(store)), hasher);
    let principal = gate.authenticate("mary", "test").expect("authenticate");
    // No capabilities in the table: the resolver grants the default.
    assert!(principal.has_capability("read"));
    assert_eq!(
        gate.authenticate("mary", "wrong").unwrap_err(),
        AuthError::InvalidCredentials
    );
    assert_eq!(
        gate.authenticate("bob", "test").unwrap_err(),
        AuthError::InvalidCredentials
    );
}

#[test]
fn unreadable_table_is_unavailable() {
    let tmp = tempdir().expect("tempdir");
    let path = tmp.path().join("user.parquet");
    std::fs::write(&path, b"this is not parquet").expect("write");
    let store = ParquetCredentialStore::open(&path);
    match store.find_by_username("mary") {
        Err(StoreError::Unavailable(_)) => {}
        other => panic!(
            "expected Unavailable, got {:?}",
            other.map(|p| p.username)
        ),
    }
}
