// Unit tests for the credential store
// Tests durability, idempotence, and the corrupt-file-reads-as-absent rule

use crate::credentials::paths::{DATA_DIR_ENV_VAR, PathSource, detect_taskline_paths};
use crate::credentials::{CredentialStore, TasklinePaths};

use common::RedactedToken;

use serial_test::serial;
use tempfile::TempDir;

fn paths_in(dir: &TempDir) -> TasklinePaths {
    TasklinePaths {
        data_dir: dir.path().to_path_buf(),
        credential_file: dir.path().join("credentials.json"),
        source: PathSource::EnvVar,
    }
}

/// **VALUE**: Verifies a fresh store reports no credential.
#[test]
fn given_empty_store_when_getting_then_absent() {
    let dir = TempDir::new().unwrap();
    let store = CredentialStore::with_paths(paths_in(&dir));

    assert!(store.get().is_none());
}

/// **VALUE**: Verifies set -> get round-trips and survives a "restart".
///
/// **WHY THIS MATTERS**: Durability across process restarts on one device is
/// the store's whole contract; an in-memory-only implementation would pass
/// every other test and still sign the user out on every launch.
///
/// **BUG THIS CATCHES**: Would catch the file write silently failing or the
/// cache being populated without persisting.
#[test]
fn given_stored_token_when_reopening_store_then_still_present() {
    let dir = TempDir::new().unwrap();
    let store = CredentialStore::with_paths(paths_in(&dir));

    store
        .set(RedactedToken::new(String::from("aaa.bbb.ccc")))
        .expect("set should succeed");

    // Same files, new store - a process restart in miniature.
    let reopened = CredentialStore::with_paths(paths_in(&dir));
    let token = reopened.get().expect("token should survive reopen");
    assert_eq!(token.as_str(), "aaa.bbb.ccc");
}

/// **VALUE**: Verifies set replaces rather than merges.
#[test]
fn given_existing_token_when_setting_again_then_replaced() {
    let dir = TempDir::new().unwrap();
    let store = CredentialStore::with_paths(paths_in(&dir));

    store.set(RedactedToken::new(String::from("first"))).unwrap();
    store.set(RedactedToken::new(String::from("second"))).unwrap();

    assert_eq!(store.get().unwrap().as_str(), "second");
}

/// **VALUE**: Verifies clear is idempotent and removes the file.
///
/// **BUG THIS CATCHES**: Would catch `clear` erroring on an already-empty
/// store (sign-out must always succeed locally).
#[test]
fn given_cleared_store_when_clearing_again_then_still_ok() {
    let dir = TempDir::new().unwrap();
    let store = CredentialStore::with_paths(paths_in(&dir));

    store.set(RedactedToken::new(String::from("tok"))).unwrap();
    store.clear().expect("first clear should succeed");
    store.clear().expect("second clear should also succeed");

    assert!(store.get().is_none());
    assert!(!dir.path().join("credentials.json").exists());
}

/// **VALUE**: Verifies a corrupt credential file reads as signed-out.
///
/// **WHY THIS MATTERS**: A half-written or hand-edited file must never brick
/// startup; signing in again rewrites it.
#[test]
fn given_corrupt_credential_file_when_opening_then_absent() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("credentials.json"), b"{ not json").unwrap();

    let store = CredentialStore::with_paths(paths_in(&dir));

    assert!(store.get().is_none());
}

/// **VALUE**: Verifies an empty token in the file reads as signed-out.
#[test]
fn given_empty_token_in_file_when_opening_then_absent() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("credentials.json"),
        br#"{ "access_token": "" }"#,
    )
    .unwrap();

    let store = CredentialStore::with_paths(paths_in(&dir));

    assert!(store.get().is_none());
}

/// **VALUE**: Verifies the env-var override wins path detection.
///
/// **WHY THIS MATTERS**: Tests and portable installs rely on pinning the
/// data directory; falling through to the platform path would scatter
/// credentials across machines.
#[test]
#[serial]
fn given_env_override_when_detecting_paths_then_env_source_used() {
    let dir = TempDir::new().unwrap();
    // SAFETY: #[serial] guards concurrent env mutation across tests.
    unsafe { std::env::set_var(DATA_DIR_ENV_VAR, dir.path()) };

    let paths = detect_taskline_paths().expect("detection should succeed");

    unsafe { std::env::remove_var(DATA_DIR_ENV_VAR) };

    assert_eq!(paths.source, PathSource::EnvVar);
    assert_eq!(paths.data_dir, dir.path());
    assert_eq!(paths.credential_file, dir.path().join("credentials.json"));
}
