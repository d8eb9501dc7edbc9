// Integration tests for the task synchronizer
// Covers the optimistic-then-reconcile contract for every operation

use crate::helpers::{harness, sign_in_locally, task_json};

use client_core::error::sync::SyncError;
use client_core::sync::{TaskSync, UpdateOutcome};

use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, ResponseTemplate};

const TASK_A: &str = "5f6b2c1e-8b0a-4c9d-9d6e-1f2a3b4c5d6e";
const TASK_B: &str = "0d4deaf5-6a49-4b8d-9d75-b2c4a1e7f3aa";

fn task_a_id() -> Uuid {
    TASK_A.parse().expect("valid uuid")
}

async fn loaded_sync(fx: &crate::helpers::Harness) -> TaskSync {
    Mock::given(method("GET"))
        .and(path("/api/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            task_json(TASK_A, "Buy milk", false),
            task_json(TASK_B, "Water plants", true)
        ])))
        .mount(&fx.server)
        .await;

    let sync = TaskSync::new(fx.api.clone());
    sync.load().await.expect("load should succeed");
    sync
}

/// **VALUE**: Verifies load replaces the cache with the server's list.
#[tokio::test]
async fn given_server_tasks_when_loading_then_cache_matches() {
    let fx = harness().await;
    sign_in_locally(&fx);

    let sync = loaded_sync(&fx).await;

    let tasks = sync.tasks().await;
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].description, "Buy milk");

    let summary = sync.summary().await;
    assert_eq!((summary.total, summary.completed, summary.pending), (2, 1, 1));
}

/// **VALUE**: Verifies create puts exactly one new entry at the
/// front, not completed.
///
/// **WHY THIS MATTERS**: Creation is server-first (nothing to roll back);
/// the cache may only change once the server has assigned identity.
#[tokio::test]
async fn given_valid_description_when_creating_then_entry_prepended() {
    let fx = harness().await;
    sign_in_locally(&fx);
    let sync = loaded_sync(&fx).await;
    let new_id = "77777777-7777-4777-8777-777777777777";

    Mock::given(method("POST"))
        .and(path("/api/tasks"))
        .and(body_partial_json(json!({ "description": "Buy milk" })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(task_json(new_id, "Buy milk", false)),
        )
        .expect(1)
        .mount(&fx.server)
        .await;

    let created = sync.create("  Buy milk  ").await.expect("create should succeed");

    assert!(!created.is_completed);
    let tasks = sync.tasks().await;
    assert_eq!(tasks.len(), 3);
    assert_eq!(tasks[0].id.to_string(), new_id);
}

/// **VALUE**: Verifies validation failures never reach the network.
///
/// **WHY THIS MATTERS**: `Validation` is
/// resolved locally, the pipeline never sees it.
#[tokio::test]
async fn given_invalid_descriptions_when_creating_then_no_request_sent() {
    let fx = harness().await;
    sign_in_locally(&fx);
    let sync = TaskSync::new(fx.api.clone());

    let empty = sync.create("   ").await;
    let too_long = sync.create(&"x".repeat(501)).await;

    assert!(matches!(empty, Err(ref e) if e.is_local()));
    assert!(matches!(too_long, Err(ref e) if e.is_local()));
    let received = fx.server.received_requests().await.expect("recording on");
    assert!(received.is_empty(), "validation must fail before the pipeline");
}

/// **VALUE**: Verifies toggle applies optimistically and adopts the
/// server's returned entity on success.
///
/// **BUG THIS CATCHES**: Would catch the cache keeping its locally-flipped
/// copy instead of the server's (whose timestamps drift from ours).
#[tokio::test]
async fn given_toggle_confirmed_when_reconciling_then_server_entity_wins() {
    let fx = harness().await;
    sign_in_locally(&fx);
    let sync = loaded_sync(&fx).await;

    let mut confirmed = task_json(TASK_A, "Buy milk", true);
    confirmed["updated_at"] = json!("2026-01-06T12:00:00Z");
    Mock::given(method("PATCH"))
        .and(path(format!("/api/tasks/{TASK_A}/toggle")))
        .respond_with(ResponseTemplate::new(200).set_body_json(confirmed))
        .expect(1)
        .mount(&fx.server)
        .await;

    let updated = sync.toggle(task_a_id()).await.expect("toggle should succeed");

    assert!(updated.is_completed);
    let cached = sync.tasks().await;
    let cached_a = cached.iter().find(|t| t.id == task_a_id()).unwrap();
    assert!(cached_a.is_completed);
    assert_eq!(
        cached_a.updated_at.to_rfc3339(),
        updated.updated_at.to_rfc3339()
    );
}

/// **VALUE**: Verifies the rollback contract for toggle.
///
/// **WHY THIS MATTERS**: After a failed toggle the cached `is_completed`
/// must equal the pre-flip value exactly - a double-flip bug or a missed
/// revert both leave the UI lying about server state.
#[tokio::test]
async fn given_toggle_rejected_when_rolling_back_then_value_restored() {
    let fx = harness().await;
    sign_in_locally(&fx);
    let sync = loaded_sync(&fx).await;
    let before = sync.tasks().await;
    let before_a = before.iter().find(|t| t.id == task_a_id()).unwrap().is_completed;

    Mock::given(method("PATCH"))
        .and(path(format!("/api/tasks/{TASK_A}/toggle")))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&fx.server)
        .await;

    let result = sync.toggle(task_a_id()).await;

    assert!(result.is_err());
    let after = sync.tasks().await;
    let after_a = after.iter().find(|t| t.id == task_a_id()).unwrap().is_completed;
    assert_eq!(after_a, before_a);
}

/// **VALUE**: Verifies toggling an id not in the cache is a local error.
#[tokio::test]
async fn given_unknown_id_when_toggling_then_local_error() {
    let fx = harness().await;
    sign_in_locally(&fx);
    let sync = TaskSync::new(fx.api.clone());

    let result = sync.toggle(Uuid::new_v4()).await;

    assert!(matches!(result, Err(SyncError::UnknownEntity { .. })));
}

/// **VALUE**: Verifies that an unchanged description
/// issues no call and sets no pending state.
#[tokio::test]
async fn given_unchanged_description_when_updating_then_no_call_issued() {
    let fx = harness().await;
    sign_in_locally(&fx);
    let sync = loaded_sync(&fx).await;
    let loads = fx.server.received_requests().await.expect("recording on").len();

    // Same text modulo whitespace: trims equal, so nothing to do.
    let outcome = sync
        .update(task_a_id(), "  Buy milk ")
        .await
        .expect("no-op update should succeed");

    assert_eq!(outcome, UpdateOutcome::Unchanged);
    let requests = fx.server.received_requests().await.expect("recording on");
    assert_eq!(requests.len(), loads, "no-op must not touch the network");
}

/// **VALUE**: Verifies update is server-first: cache only changes on
/// confirmation.
#[tokio::test]
async fn given_changed_description_when_updating_then_cache_replaced_on_confirm() {
    let fx = harness().await;
    sign_in_locally(&fx);
    let sync = loaded_sync(&fx).await;

    Mock::given(method("PUT"))
        .and(path(format!("/api/tasks/{TASK_A}")))
        .and(body_partial_json(json!({ "description": "Buy oat milk" })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(task_json(TASK_A, "Buy oat milk", false)),
        )
        .expect(1)
        .mount(&fx.server)
        .await;

    let outcome = sync
        .update(task_a_id(), "Buy oat milk")
        .await
        .expect("update should succeed");

    assert!(matches!(outcome, UpdateOutcome::Updated(_)));
    let cached = sync.tasks().await;
    assert_eq!(
        cached.iter().find(|t| t.id == task_a_id()).unwrap().description,
        "Buy oat milk"
    );
}

/// **VALUE**: Verifies a failed update leaves the cached description
/// untouched (there was no optimistic write to revert).
#[tokio::test]
async fn given_update_rejected_when_inspecting_cache_then_old_value_kept() {
    let fx = harness().await;
    sign_in_locally(&fx);
    let sync = loaded_sync(&fx).await;

    Mock::given(method("PUT"))
        .and(path(format!("/api/tasks/{TASK_A}")))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&fx.server)
        .await;

    let result = sync.update(task_a_id(), "Buy oat milk").await;

    assert!(result.is_err());
    let cached = sync.tasks().await;
    assert_eq!(
        cached.iter().find(|t| t.id == task_a_id()).unwrap().description,
        "Buy milk"
    );
}

/// **VALUE**: Verifies the two-step delete: request hands back a token, only
/// confirm touches the server, and success removes the entry.
#[tokio::test]
async fn given_confirmed_delete_when_executing_then_entry_removed() {
    let fx = harness().await;
    sign_in_locally(&fx);
    let sync = loaded_sync(&fx).await;

    let pending = sync
        .request_delete(task_a_id())
        .await
        .expect("request should find the task");
    assert_eq!(pending.description, "Buy milk");

    // Requesting is free: nothing has hit the server beyond the load.
    Mock::given(method("DELETE"))
        .and(path(format!("/api/tasks/{TASK_A}")))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&fx.server)
        .await;

    sync.confirm_delete(pending).await.expect("delete should succeed");

    assert!(sync.tasks().await.iter().all(|t| t.id != task_a_id()));
}

/// **VALUE**: Verifies delete idempotence: a delete that finds the
/// task already gone succeeds from the caller's perspective.
#[tokio::test]
async fn given_task_already_gone_when_deleting_then_treated_as_success() {
    let fx = harness().await;
    sign_in_locally(&fx);
    let sync = loaded_sync(&fx).await;

    Mock::given(method("DELETE"))
        .and(path(format!("/api/tasks/{TASK_A}")))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "detail": "Task not found" })),
        )
        .expect(1)
        .mount(&fx.server)
        .await;

    let pending = sync.request_delete(task_a_id()).await.expect("request ok");
    sync.confirm_delete(pending)
        .await
        .expect("404 delete should count as success");

    assert!(sync.tasks().await.iter().all(|t| t.id != task_a_id()));
}

/// **VALUE**: Verifies a failed delete retains the entry and surfaces the
/// error without retrying.
#[tokio::test]
async fn given_delete_rejected_when_inspecting_cache_then_entry_retained() {
    let fx = harness().await;
    sign_in_locally(&fx);
    let sync = loaded_sync(&fx).await;

    Mock::given(method("DELETE"))
        .and(path(format!("/api/tasks/{TASK_A}")))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&fx.server)
        .await;

    let pending = sync.request_delete(task_a_id()).await.expect("request ok");
    let result = sync.confirm_delete(pending).await;

    assert!(result.is_err());
    assert!(sync.tasks().await.iter().any(|t| t.id == task_a_id()));
}
