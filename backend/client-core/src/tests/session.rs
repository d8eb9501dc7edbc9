// Unit tests for the session controller's local state machine
// Network-facing transitions (sign-in/sign-up) are covered in the
// integration tests; everything here resolves without a server.

use crate::api::{ApiClient, SigninRedirect};
use crate::credentials::paths::PathSource;
use crate::credentials::{CredentialStore, TasklinePaths};
use crate::session::{SessionController, SessionState};

use common::RedactedToken;

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use serde_json::json;
use tempfile::TempDir;

fn forge_token(exp_offset_secs: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(
        json!({
            "sub": "user-42",
            "email": "ada@example.com",
            "iat": Utc::now().timestamp(),
            "exp": Utc::now().timestamp() + exp_offset_secs
        })
        .to_string()
        .as_bytes(),
    );
    format!("{header}.{payload}.forged-signature")
}

struct Fixture {
    controller: SessionController,
    credentials: CredentialStore,
    redirect: SigninRedirect,
    _data_dir: TempDir,
}

fn fixture() -> Fixture {
    let data_dir = TempDir::new().unwrap();
    let credentials = CredentialStore::with_paths(TasklinePaths {
        data_dir: data_dir.path().to_path_buf(),
        credential_file: data_dir.path().join("credentials.json"),
        source: PathSource::EnvVar,
    });
    let redirect = SigninRedirect::new();
    // Nothing in these tests sends a request; the port just has to parse.
    let api = ApiClient::new(
        "http://127.0.0.1:9",
        Duration::from_secs(1),
        credentials.clone(),
        redirect.clone(),
    )
    .expect("client should build");
    let controller = SessionController::new(api, credentials.clone());

    Fixture {
        controller,
        credentials,
        redirect,
        _data_dir: data_dir,
    }
}

/// **VALUE**: Verifies a fresh controller is `Initializing` with a loading
/// snapshot.
///
/// **WHY THIS MATTERS**: Shells gate protected content on this snapshot; if
/// the initial state claimed "not loading", a protected page could flash
/// before the credential is examined.
#[test]
fn given_new_controller_when_inspecting_then_initializing_and_loading() {
    let fx = fixture();

    assert_eq!(fx.controller.state(), SessionState::Initializing);
    let snapshot = fx.controller.snapshot();
    assert!(snapshot.is_loading);
    assert!(!snapshot.is_authenticated);
    assert!(snapshot.user.is_none());
}

/// **VALUE**: Verifies initialize with no credential lands Unauthenticated.
#[test]
fn given_empty_store_when_initializing_then_unauthenticated() {
    let fx = fixture();

    let snapshot = fx.controller.initialize();

    assert_eq!(fx.controller.state(), SessionState::Unauthenticated);
    assert!(!snapshot.is_loading);
    assert!(!snapshot.is_authenticated);
}

/// **VALUE**: Verifies initialize restores a session from an unexpired
/// stored token, synchronously and without a server.
///
/// **WHY THIS MATTERS**: This is the multi-restart path: the token alone
/// must rebuild the user identity.
#[test]
fn given_unexpired_stored_token_when_initializing_then_authenticated() {
    let fx = fixture();
    fx.credentials
        .set(RedactedToken::new(forge_token(3600)))
        .unwrap();

    let snapshot = fx.controller.initialize();

    assert!(snapshot.is_authenticated);
    let user = snapshot.user.expect("user should be derived from claims");
    assert_eq!(user.id, "user-42");
    assert_eq!(user.email.as_deref(), Some("ada@example.com"));
}

/// **VALUE**: Verifies an expired stored token starts the process signed
/// out.
///
/// **BUG THIS CATCHES**: Would catch `initialize` skipping the expiry check
/// and treating any stored token as a live session.
#[test]
fn given_expired_stored_token_when_initializing_then_unauthenticated() {
    let fx = fixture();
    fx.credentials
        .set(RedactedToken::new(forge_token(-3600)))
        .unwrap();

    let snapshot = fx.controller.initialize();

    assert_eq!(fx.controller.state(), SessionState::Unauthenticated);
    assert!(!snapshot.is_authenticated);
}

/// **VALUE**: Verifies `Initializing` is left exactly once.
#[test]
fn given_resolved_controller_when_initializing_again_then_state_unchanged() {
    let fx = fixture();
    fx.credentials
        .set(RedactedToken::new(forge_token(3600)))
        .unwrap();
    fx.controller.initialize();

    // A second credential appearing later must not re-run initialization.
    fx.credentials.clear().unwrap();
    let snapshot = fx.controller.initialize();

    assert!(snapshot.is_authenticated);
}

/// **VALUE**: Verifies sign-out clears the credential, publishes
/// Unauthenticated, and requests navigation to sign-in.
///
/// **WHY THIS MATTERS**: These three effects are the whole sign-out
/// contract; missing any one leaves either a live token on disk or a shell
/// showing protected content to a signed-out user.
#[tokio::test]
async fn given_authenticated_session_when_signing_out_then_cleared_and_redirected() {
    let fx = fixture();
    fx.credentials
        .set(RedactedToken::new(forge_token(3600)))
        .unwrap();
    fx.controller.initialize();
    let mut snapshots = fx.controller.subscribe();

    fx.controller.sign_out().expect("sign out should succeed");

    assert_eq!(fx.controller.state(), SessionState::Unauthenticated);
    assert!(fx.credentials.get().is_none());
    assert!(fx.redirect.is_pending());

    snapshots.changed().await.expect("sender alive");
    assert!(!snapshots.borrow().is_authenticated);
}

/// **VALUE**: Verifies every transition reaches subscribers as an immutable
/// snapshot.
#[tokio::test]
async fn given_subscriber_when_initializing_then_snapshot_published() {
    let fx = fixture();
    let mut snapshots = fx.controller.subscribe();

    fx.controller.initialize();

    snapshots.changed().await.expect("sender alive");
    let published = snapshots.borrow().clone();
    assert!(!published.is_loading);
    assert!(!published.is_authenticated);
}
