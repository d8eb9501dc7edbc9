// Integration tests for the conversation synchronizer
// Covers provisional append/rollback, conversation-id adoption, full
// overwrite on load, and the idempotent-delete/list-resync contract

use crate::helpers::{harness, message_json, sign_in_locally};

use client_core::sync::ChatSync;

use models::MessageRole;

use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

const CONVERSATION: &str = "7c9e6679-7425-40de-944b-e07fc1f90ae7";

fn conversation_id() -> Uuid {
    CONVERSATION.parse().expect("valid uuid")
}

fn chat_reply(text: &str) -> serde_json::Value {
    json!({
        "conversation_id": CONVERSATION,
        "message": text,
        "tool_calls": [
            {
                "tool_name": "create_task",
                "parameters": { "description": "buy milk" },
                "result": { "created": true }
            }
        ]
    })
}

/// **VALUE**: Verifies the first send appends user + reply and adopts the
/// server-assigned conversation id.
///
/// **WHY THIS MATTERS**: The id handed back on the first round-trip is the
/// session's only handle for resumption; losing it forks every later
/// message into a fresh conversation.
#[tokio::test]
async fn given_first_message_when_sending_then_conversation_adopted() {
    let fx = harness().await;
    sign_in_locally(&fx);
    let sync = ChatSync::new(fx.api.clone());

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("Added milk.")))
        .expect(1)
        .mount(&fx.server)
        .await;

    let outcome = sync.send("add a task to buy milk").await.expect("send ok");

    assert!(outcome.started_conversation);
    assert_eq!(outcome.conversation_id, conversation_id());
    assert_eq!(sync.conversation_id().await, Some(conversation_id()));
    assert_eq!(outcome.tool_calls.len(), 1);

    let transcript = sync.transcript().await;
    assert_eq!(transcript.len(), 2);
    assert_eq!(transcript[0].role, MessageRole::User);
    assert_eq!(transcript[0].content, "add a task to buy milk");
    assert_eq!(transcript[1].role, MessageRole::Assistant);
    assert_eq!(transcript[1].content, "Added milk.");
}

/// **VALUE**: Verifies later sends carry the adopted conversation id.
#[tokio::test]
async fn given_adopted_conversation_when_sending_again_then_id_sent() {
    let fx = harness().await;
    sign_in_locally(&fx);
    let sync = ChatSync::new(fx.api.clone());

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("Added milk.")))
        .up_to_n_times(1)
        .mount(&fx.server)
        .await;
    sync.send("add a task to buy milk").await.expect("first send ok");

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({ "conversation_id": CONVERSATION })))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("Marked it done.")))
        .expect(1)
        .mount(&fx.server)
        .await;

    let outcome = sync.send("mark it done").await.expect("second send ok");

    assert!(!outcome.started_conversation);
    assert_eq!(sync.transcript().await.len(), 4);
}

/// **VALUE**: Verifies full rollback on a failed send: afterwards the
/// transcript holds exactly the messages present before the call.
///
/// **BUG THIS CATCHES**: Would catch a partial rollback (e.g. blanking the
/// provisional message's content but leaving the entry).
#[tokio::test]
async fn given_send_rejected_when_rolling_back_then_transcript_restored() {
    let fx = harness().await;
    sign_in_locally(&fx);
    let sync = ChatSync::new(fx.api.clone());

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("Added milk.")))
        .up_to_n_times(1)
        .expect(1)
        .mount(&fx.server)
        .await;
    sync.send("add a task to buy milk").await.expect("send ok");
    let before = sync.transcript().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({ "message": "and eggs" })))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&fx.server)
        .await;

    let result = sync.send("and eggs").await;

    assert!(result.is_err());
    assert_eq!(sync.transcript().await, before);
}

/// **VALUE**: Verifies an empty message fails locally without a request.
#[tokio::test]
async fn given_blank_message_when_sending_then_no_request_sent() {
    let fx = harness().await;
    sign_in_locally(&fx);
    let sync = ChatSync::new(fx.api.clone());

    let result = sync.send("   ").await;

    assert!(matches!(result, Err(ref e) if e.is_local()));
    assert!(sync.transcript().await.is_empty());
    let received = fx.server.received_requests().await.expect("recording on");
    assert!(received.is_empty());
}

/// **VALUE**: Verifies load is a full overwrite that filters tool messages
/// and discards everything client-local.
///
/// **WHY THIS MATTERS**: After a load, the
/// transcript is exactly the server's renderable history; provisional
/// entries and client-generated reply ids must all be gone.
#[tokio::test]
async fn given_local_transcript_when_loading_then_server_history_replaces_it() {
    let fx = harness().await;
    sign_in_locally(&fx);
    let sync = ChatSync::new(fx.api.clone());

    // Build up client-local state first.
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("Added milk.")))
        .mount(&fx.server)
        .await;
    sync.send("add a task to buy milk").await.expect("send ok");
    let local_ids: Vec<Uuid> = sync.transcript().await.iter().map(|m| m.id).collect();

    Mock::given(method("GET"))
        .and(path(format!("/api/conversations/{CONVERSATION}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": CONVERSATION,
            "title": "groceries",
            "created_at": "2026-01-05T09:00:00Z",
            "updated_at": "2026-01-05T09:05:00Z",
            "messages": [
                message_json("11111111-1111-4111-8111-111111111111", "user", "add a task to buy milk", "2026-01-05T09:00:00Z"),
                message_json("22222222-2222-4222-8222-222222222222", "tool", "{\"created\":true}", "2026-01-05T09:00:01Z"),
                message_json("33333333-3333-4333-8333-333333333333", "assistant", "Added milk.", "2026-01-05T09:00:02Z"),
                message_json("44444444-4444-4444-8444-444444444444", "user", "mark it done", "2026-01-05T09:01:00Z"),
                message_json("55555555-5555-4555-8555-555555555555", "assistant", "Marked it done.", "2026-01-05T09:01:02Z")
            ]
        })))
        .expect(1)
        .mount(&fx.server)
        .await;

    let messages = sync.load(conversation_id()).await.expect("load ok");

    // Tool message filtered; everything else is the server's order.
    assert_eq!(messages.len(), 4);
    assert!(messages.iter().all(|m| m.role.is_renderable()));

    let transcript = sync.transcript().await;
    assert_eq!(transcript, messages);
    assert!(transcript.iter().all(|m| !local_ids.contains(&m.id)));
}

/// **VALUE**: Verifies listing pages through the query contract and caches
/// the result.
#[tokio::test]
async fn given_conversations_when_listing_then_page_cached() {
    let fx = harness().await;
    sign_in_locally(&fx);
    let sync = ChatSync::new(fx.api.clone());

    Mock::given(method("GET"))
        .and(path("/api/conversations"))
        .and(query_param("limit", "20"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "conversations": [{
                "id": CONVERSATION,
                "title": "groceries",
                "created_at": "2026-01-05T09:00:00Z",
                "updated_at": "2026-01-05T09:05:00Z",
                "message_count": 5
            }],
            "total": 1
        })))
        .expect(1)
        .mount(&fx.server)
        .await;

    let listing = sync.list(20, 0).await.expect("list ok");

    assert_eq!(listing.total, 1);
    assert_eq!(sync.conversations().await.len(), 1);
}

/// **VALUE**: Verifies the idempotent delete: "not found" counts as
/// success and the optimistic removal stands.
#[tokio::test]
async fn given_conversation_already_gone_when_deleting_then_success() {
    let fx = harness().await;
    sign_in_locally(&fx);
    let sync = ChatSync::new(fx.api.clone());
    seed_listing(&fx, &sync).await;

    Mock::given(method("DELETE"))
        .and(path(format!("/api/conversations/{CONVERSATION}")))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "detail": "Conversation not found" })),
        )
        .expect(1)
        .mount(&fx.server)
        .await;

    sync.delete(conversation_id()).await.expect("404 delete is success");

    assert!(sync.conversations().await.is_empty());
}

/// **VALUE**: Verifies a non-404 delete failure reloads the list to
/// resynchronize and surfaces the error.
///
/// **WHY THIS MATTERS**: The optimistic removal has already lied to the UI;
/// the reload is what makes the lie temporary.
#[tokio::test]
async fn given_delete_rejected_when_resyncing_then_list_reloaded() {
    let fx = harness().await;
    sign_in_locally(&fx);
    let sync = ChatSync::new(fx.api.clone());
    seed_listing(&fx, &sync).await;

    Mock::given(method("DELETE"))
        .and(path(format!("/api/conversations/{CONVERSATION}")))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&fx.server)
        .await;

    let result = sync.delete(conversation_id()).await;

    assert!(result.is_err());
    // The reload hit the same page again and restored the server's truth.
    assert_eq!(sync.conversations().await.len(), 1);
}

/// **VALUE**: Verifies deleting the active conversation resets the
/// transcript for a fresh start.
#[tokio::test]
async fn given_active_conversation_when_deleted_then_transcript_reset() {
    let fx = harness().await;
    sign_in_locally(&fx);
    let sync = ChatSync::new(fx.api.clone());

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(chat_reply("Added milk.")))
        .mount(&fx.server)
        .await;
    sync.send("add a task to buy milk").await.expect("send ok");

    Mock::given(method("DELETE"))
        .and(path(format!("/api/conversations/{CONVERSATION}")))
        .respond_with(ResponseTemplate::new(204))
        .mount(&fx.server)
        .await;

    sync.delete(conversation_id()).await.expect("delete ok");

    assert!(sync.transcript().await.is_empty());
    assert_eq!(sync.conversation_id().await, None);
}

/// Mount a one-conversation listing and prime the cache with it.
async fn seed_listing(fx: &crate::helpers::Harness, sync: &ChatSync) {
    Mock::given(method("GET"))
        .and(path("/api/conversations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "conversations": [{
                "id": CONVERSATION,
                "title": "groceries",
                "created_at": "2026-01-05T09:00:00Z",
                "updated_at": "2026-01-05T09:05:00Z",
                "message_count": 5
            }],
            "total": 1
        })))
        .mount(&fx.server)
        .await;

    sync.list(20, 0).await.expect("seed list ok");
    assert_eq!(sync.conversations().await.len(), 1);
}
