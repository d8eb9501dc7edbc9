// Integration tests for sign-in/sign-up against a mock backend

use crate::helpers::{forge_token, harness};

use client_core::error::session::SessionError;
use client_core::session::{SessionController, SessionState};

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn auth_body(token: &str) -> serde_json::Value {
    json!({
        "access_token": token,
        "token_type": "bearer",
        "user": {
            "id": "user-42",
            "email": "ada@example.com",
            "created_at": "2025-11-01T00:00:00Z"
        }
    })
}

/// **VALUE**: Verifies sign-in stores the credential, transitions to
/// `Authenticated`, and publishes the snapshot.
///
/// **WHY THIS MATTERS**: This is the one path that creates a session; every
/// protected feature downstream depends on all three effects happening.
#[tokio::test]
async fn given_valid_credentials_when_signing_in_then_authenticated_and_persisted() {
    let fx = harness().await;
    let controller = SessionController::new(fx.api.clone(), fx.credentials.clone());
    controller.initialize();
    let mut snapshots = controller.subscribe();
    let token = forge_token(3600);

    Mock::given(method("POST"))
        .and(path("/auth/signin"))
        .and(body_partial_json(json!({ "email": "ada@example.com" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body(&token)))
        .expect(1)
        .mount(&fx.server)
        .await;

    let user = controller
        .sign_in("ada@example.com", "hunter2!")
        .await
        .expect("sign in should succeed");

    assert_eq!(user.id, "user-42");
    assert_eq!(
        controller.state(),
        SessionState::Authenticated(user.clone())
    );
    assert_eq!(fx.credentials.get().expect("persisted").as_str(), token);

    snapshots.changed().await.expect("sender alive");
    let published = snapshots.borrow().clone();
    assert!(published.is_authenticated);
    assert_eq!(published.user, Some(user));
}

/// **VALUE**: Verifies a rejected sign-in surfaces the server detail and
/// leaves the session signed out.
#[tokio::test]
async fn given_wrong_password_when_signing_in_then_error_and_unauthenticated() {
    let fx = harness().await;
    let controller = SessionController::new(fx.api.clone(), fx.credentials.clone());
    controller.initialize();

    Mock::given(method("POST"))
        .and(path("/auth/signin"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "detail": "Invalid credentials" })),
        )
        .mount(&fx.server)
        .await;

    let result = controller.sign_in("ada@example.com", "wrong").await;

    match result {
        Err(SessionError::Api(api)) => assert_eq!(api.user_message(), "Invalid credentials"),
        other => panic!("expected Api error, got {other:?}"),
    }
    assert_eq!(controller.state(), SessionState::Unauthenticated);
    assert!(fx.credentials.get().is_none());
}

/// **VALUE**: Verifies sign-up behaves like sign-in (store + transition).
#[tokio::test]
async fn given_new_account_when_signing_up_then_authenticated() {
    let fx = harness().await;
    let controller = SessionController::new(fx.api.clone(), fx.credentials.clone());
    controller.initialize();
    let token = forge_token(3600);

    Mock::given(method("POST"))
        .and(path("/auth/signup"))
        .and(body_partial_json(json!({ "email": "new@example.com" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(auth_body(&token)))
        .expect(1)
        .mount(&fx.server)
        .await;

    let user = controller
        .sign_up("new@example.com", "hunter2!")
        .await
        .expect("sign up should succeed");

    assert!(matches!(controller.state(), SessionState::Authenticated(_)));
    assert_eq!(user.id, "user-42");
}

/// **VALUE**: Verifies sign-in re-arms the escape hatch.
///
/// **WHY THIS MATTERS**: The hatch fires once per redirect-worthy event. A
/// fresh session starts a fresh event window; without re-arming, the *next*
/// expiry would be silently swallowed.
#[tokio::test]
async fn given_previous_redirect_when_signing_in_then_hatch_rearmed() {
    let fx = harness().await;
    let controller = SessionController::new(fx.api.clone(), fx.credentials.clone());
    controller.initialize();
    fx.redirect.trigger();
    assert!(fx.redirect.is_pending());

    Mock::given(method("POST"))
        .and(path("/auth/signin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body(&forge_token(3600))))
        .mount(&fx.server)
        .await;

    controller
        .sign_in("ada@example.com", "hunter2!")
        .await
        .expect("sign in should succeed");

    assert!(!fx.redirect.is_pending());
}

/// **VALUE**: Verifies the credential from sign-in authenticates later calls.
#[tokio::test]
async fn given_signed_in_session_when_calling_protected_endpoint_then_new_token_used() {
    let fx = harness().await;
    let controller = SessionController::new(fx.api.clone(), fx.credentials.clone());
    controller.initialize();
    let token = forge_token(3600);

    Mock::given(method("POST"))
        .and(path("/auth/signin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(auth_body(&token)))
        .mount(&fx.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .and(header("authorization", format!("Bearer {token}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&fx.server)
        .await;

    controller
        .sign_in("ada@example.com", "hunter2!")
        .await
        .expect("sign in should succeed");
    let tasks: Vec<models::Task> = fx.api.get("/api/tasks").await.expect("should succeed");

    assert!(tasks.is_empty());
}
