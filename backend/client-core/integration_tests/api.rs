// Integration tests for the request pipeline against a mock backend
// Covers credential attachment, the 401 escape hatch, the local expiry
// short-circuit, timeout classification, and error-detail parsing

use crate::helpers::{forge_token, harness, harness_with_timeout, sign_in_locally, task_json};

use client_core::api::NavigationSignal;
use client_core::error::api::{ApiError, ErrorDetail};

use common::RedactedToken;
use models::Task;

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

/// **VALUE**: Verifies the stored credential is attached as a bearer header.
///
/// **WHY THIS MATTERS**: Every protected endpoint authenticates with this
/// header; attaching it wrong signs the user out of every view at once.
#[tokio::test]
async fn given_stored_credential_when_calling_then_bearer_header_attached() {
    let fx = harness().await;
    let token = sign_in_locally(&fx);

    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .and(header("authorization", format!("Bearer {token}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&fx.server)
        .await;

    let tasks: Vec<Task> = fx.api.get("/api/tasks").await.expect("call should succeed");
    assert!(tasks.is_empty());
}

/// **VALUE**: Verifies a server 401 maps to `Unauthorized` and fires the
/// escape hatch exactly once, even across two failing calls.
///
/// **WHY THIS MATTERS**: Concurrent 401s must yield
/// a single navigation signal, not a redirect loop.
#[tokio::test]
async fn given_two_401_responses_when_calling_then_single_redirect_signal() {
    let fx = harness().await;
    sign_in_locally(&fx);
    fx.redirect.set_location("/dashboard");
    let mut signals = fx.redirect.subscribe();

    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "detail": "expired" })))
        .mount(&fx.server)
        .await;

    let first: Result<Vec<Task>, ApiError> = fx.api.get("/api/tasks").await;
    let second: Result<Vec<Task>, ApiError> = fx.api.get("/api/tasks").await;

    assert!(matches!(first, Err(ApiError::Unauthorized { .. })));
    assert!(matches!(second, Err(ApiError::Unauthorized { .. })));

    // One signal, one remembered location - the second 401 was absorbed.
    signals.changed().await.expect("sender alive");
    assert_eq!(*signals.borrow_and_update(), NavigationSignal::SigninRequired);
    assert!(!signals.has_changed().expect("sender alive"));
    assert_eq!(fx.redirect.take_return_location().as_deref(), Some("/dashboard"));
}

/// **VALUE**: Verifies a locally-expired token never reaches the wire.
///
/// **WHY THIS MATTERS**: The short-circuit is the token inspector's whole
/// purpose; if the request went out anyway, the optimization would be
/// silently dead and every expiry would cost a round trip.
///
/// **BUG THIS CATCHES**: Would catch the expiry check running after the
/// request is sent, or not at all.
#[tokio::test]
async fn given_expired_stored_token_when_calling_then_no_request_sent() {
    let fx = harness().await;
    fx.credentials
        .set(RedactedToken::new(forge_token(-3600)))
        .expect("set credential");

    // No mocks mounted: any request reaching the server would be recorded.
    let result: Result<Vec<Task>, ApiError> = fx.api.get("/api/tasks").await;

    assert!(matches!(result, Err(ApiError::Unauthorized { .. })));
    assert!(fx.redirect.is_pending());

    let received = fx.server.received_requests().await.expect("recording on");
    assert!(received.is_empty(), "expired token must short-circuit locally");
}

/// **VALUE**: Verifies an explicit override token beats the stored one.
#[tokio::test]
async fn given_token_override_when_calling_then_override_wins() {
    let fx = harness().await;
    sign_in_locally(&fx);
    let override_token = forge_token(7200);
    fx.api
        .set_token_override(Some(RedactedToken::new(override_token.clone())));

    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .and(header("authorization", format!("Bearer {override_token}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&fx.server)
        .await;

    let result: Result<Vec<Task>, ApiError> = fx.api.get("/api/tasks").await;
    assert!(result.is_ok());
}

/// **VALUE**: Verifies 204 means success-with-empty-result.
#[tokio::test]
async fn given_204_response_when_deleting_then_empty_success() {
    let fx = harness().await;
    sign_in_locally(&fx);

    Mock::given(method("DELETE"))
        .and(path("/api/tasks/5f6b2c1e-8b0a-4c9d-9d6e-1f2a3b4c5d6e"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&fx.server)
        .await;

    fx.api
        .delete("/api/tasks/5f6b2c1e-8b0a-4c9d-9d6e-1f2a3b4c5d6e")
        .await
        .expect("204 should be success");
}

/// **VALUE**: Verifies non-2xx detail parsing, with the explicit
/// unparseable fallback.
///
/// **WHY THIS MATTERS**: The detail string is what users see; the fallback
/// keeps HTML error pages and proxy garbage from leaking into the UI.
#[tokio::test]
async fn given_error_bodies_when_calling_then_detail_tagged_correctly() {
    let fx = harness().await;
    sign_in_locally(&fx);

    Mock::given(method("GET"))
        .and(path("/api/tasks/readable"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({ "detail": "Description too long" })),
        )
        .mount(&fx.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/tasks/garbage"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<html>boom</html>"))
        .mount(&fx.server)
        .await;

    let readable: Result<Task, ApiError> = fx.api.get("/api/tasks/readable").await;
    match readable {
        Err(ApiError::Http { status, detail, .. }) => {
            assert_eq!(status.0, 422);
            assert_eq!(detail, ErrorDetail::Message(String::from("Description too long")));
        }
        other => panic!("expected Http error, got {other:?}"),
    }

    let garbage: Result<Task, ApiError> = fx.api.get("/api/tasks/garbage").await;
    match garbage {
        Err(ApiError::Http { status, detail, .. }) => {
            assert_eq!(status.0, 500);
            assert_eq!(detail, ErrorDetail::Unparseable);
        }
        other => panic!("expected Http error, got {other:?}"),
    }
}

/// **VALUE**: Verifies the fixed timeout classifies as `Timeout`.
///
/// **BUG THIS CATCHES**: Would catch timeouts surfacing as generic network
/// errors, which would lose the "try again" framing the UI gives them.
#[tokio::test]
async fn given_slow_server_when_calling_then_timeout_error() {
    let fx = harness_with_timeout(Duration::from_millis(200)).await;
    sign_in_locally(&fx);

    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&fx.server)
        .await;

    let result: Result<Vec<Task>, ApiError> = fx.api.get("/api/tasks").await;

    assert!(matches!(result, Err(ApiError::Timeout { .. })));
}

/// **VALUE**: Verifies an unreachable backend classifies as `Network`.
#[tokio::test]
async fn given_unreachable_backend_when_calling_then_network_error() {
    let fx = harness().await;
    sign_in_locally(&fx);
    // Reset to a port nothing listens on.
    drop(fx.server);

    let result: Result<Vec<Task>, ApiError> = fx.api.get("/api/tasks").await;

    match result {
        Err(error @ ApiError::Network { .. }) => {
            assert_eq!(error.user_message(), "Network error. Please try again.");
        }
        other => panic!("expected Network error, got {other:?}"),
    }
}

/// **VALUE**: Verifies a 401 on an anonymous auth call is an ordinary
/// server error - no escape hatch, no redirect.
///
/// **WHY THIS MATTERS**: A wrong password must show "Invalid credentials"
/// on the sign-in form, not bounce the user through a redirect to the page
/// they are already on.
#[tokio::test]
async fn given_wrong_password_when_signing_in_anonymously_then_http_error_without_redirect() {
    let fx = harness().await;

    Mock::given(method("POST"))
        .and(path("/auth/signin"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({ "detail": "Invalid credentials" })),
        )
        .expect(1)
        .mount(&fx.server)
        .await;

    let result: Result<serde_json::Value, ApiError> = fx
        .api
        .post_anonymous("/auth/signin", &json!({ "email": "a@b.c", "password": "nope" }))
        .await;

    match result {
        Err(error @ ApiError::Http { .. }) => {
            assert_eq!(error.status_code(), Some(401));
            assert_eq!(error.user_message(), "Invalid credentials");
        }
        other => panic!("expected Http error, got {other:?}"),
    }
    assert!(!fx.redirect.is_pending());
}

/// **VALUE**: Verifies a successful body parses into the typed model.
#[tokio::test]
async fn given_2xx_with_body_when_calling_then_typed_result() {
    let fx = harness().await;
    sign_in_locally(&fx);

    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            task_json("5f6b2c1e-8b0a-4c9d-9d6e-1f2a3b4c5d6e", "Buy milk", false)
        ])))
        .mount(&fx.server)
        .await;

    let tasks: Vec<Task> = fx.api.get("/api/tasks").await.expect("should parse");

    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].description, "Buy milk");
}
