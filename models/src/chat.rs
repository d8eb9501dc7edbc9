//! Conversation and message wire types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
    Tool,
}

impl MessageRole {
    /// Tool-role messages are protocol plumbing and never shown in a
    /// transcript.
    pub fn is_renderable(&self) -> bool {
        matches!(self, MessageRole::User | MessageRole::Assistant)
    }
}

/// A single transcript entry.
///
/// A provisional message (locally authored, awaiting the server round-trip)
/// carries a client-generated id. That id is never sent to the server and
/// the whole entry is replaced, not merged, once the server confirms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// A provisional user message with a client-local id and timestamp.
    pub fn provisional(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: MessageRole::User,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// `POST /api/chat` request body.
///
/// `conversation_id` is absent for the first message of a conversation; the
/// server assigns one and returns it in [`ChatResponse`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<Uuid>,
}

/// One tool invocation the assistant made while answering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub tool_name: String,
    pub parameters: serde_json::Value,
    pub result: Option<serde_json::Value>,
}

/// `POST /api/chat` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub conversation_id: Uuid,
    pub message: String,
    #[serde(default)]
    pub tool_calls: Vec<ToolCallRecord>,
}

/// One row of `GET /api/conversations`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: Uuid,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub message_count: u32,
}

/// `GET /api/conversations` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationListing {
    pub conversations: Vec<ConversationSummary>,
    pub total: u64,
}

/// `GET /api/conversations/{id}` response body — the authoritative,
/// server-ordered message history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationDetail {
    pub id: Uuid,
    pub title: Option<String>,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
