//! Shared fixtures for the integration tests: a wiremock backend, a
//! tempdir-backed credential store, and forged (unsigned) bearer tokens.

use client_core::api::{ApiClient, SigninRedirect};
use client_core::credentials::paths::PathSource;
use client_core::credentials::{CredentialStore, TasklinePaths};

use common::RedactedToken;

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use serde_json::json;
use tempfile::TempDir;
use wiremock::MockServer;

/// Everything a test needs to drive the client against a mock backend.
pub struct Harness {
    pub server: MockServer,
    pub api: ApiClient,
    pub credentials: CredentialStore,
    pub redirect: SigninRedirect,
    _data_dir: TempDir,
}

/// Start a mock backend and a client pointed at it.
pub async fn harness() -> Harness {
    harness_with_timeout(Duration::from_secs(5)).await
}

/// Same as [`harness`], with an explicit request timeout (for timeout tests).
pub async fn harness_with_timeout(timeout: Duration) -> Harness {
    let server = MockServer::start().await;
    let data_dir = TempDir::new().expect("tempdir");
    let credentials = CredentialStore::with_paths(TasklinePaths {
        data_dir: data_dir.path().to_path_buf(),
        credential_file: data_dir.path().join("credentials.json"),
        source: PathSource::EnvVar,
    });
    let redirect = SigninRedirect::new();
    let api = ApiClient::new(&server.uri(), timeout, credentials.clone(), redirect.clone())
        .expect("client should build");

    Harness {
        server,
        api,
        credentials,
        redirect,
        _data_dir: data_dir,
    }
}

/// Forge a three-segment token whose `exp` is `exp_offset_secs` from now.
///
/// Unsigned on purpose: the client never verifies signatures, it only reads
/// claims.
pub fn forge_token(exp_offset_secs: i64) -> String {
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

/// Store an unexpired credential and return its raw value for header
/// matching.
pub fn sign_in_locally(harness: &Harness) -> String {
    let token = forge_token(3600);
    harness
        .credentials
        .set(RedactedToken::new(token.clone()))
        .expect("set credential");
    token
}

/// A task body as the backend would return it.
pub fn task_json(id: &str, description: &str, is_completed: bool) -> serde_json::Value {
    json!({
        "id": id,
        "description": description,
        "is_completed": is_completed,
        "created_at": "2026-01-05T09:30:00Z",
        "updated_at": "2026-01-05T09:30:00Z"
    })
}

/// A message body as the backend would return it.
pub fn message_json(id: &str, role: &str, content: &str, at: &str) -> serde_json::Value {
    json!({
        "id": id,
        "role": role,
        "content": content,
        "created_at": at
    })
}
