//! Conversation transcript synchronization: append-then-reconcile.

use crate::api::ApiClient;
use crate::error::api::ApiError;
use crate::error::sync::SyncError;
use crate::sync::validate_text;

use models::{
    ChatRequest, ChatResponse, ConversationDetail, ConversationListing, ConversationSummary,
    Message, MessageRole, ToolCallRecord,
};

use std::sync::Arc;

use chrono::Utc;
use log::{debug, info, warn};
use tokio::sync::RwLock;
use uuid::Uuid;

const CHAT_ENDPOINT: &str = "/api/chat";
const CONVERSATIONS_ENDPOINT: &str = "/api/conversations";

/// Default page when listing conversations.
pub const DEFAULT_LIST_LIMIT: u32 = 50;

/// What a successful `send` produced.
#[derive(Debug, Clone)]
pub struct SendOutcome {
    /// The conversation this exchange now belongs to.
    pub conversation_id: Uuid,
    /// True when the server assigned the id on this call; the caller should
    /// remember it for resumption.
    pub started_conversation: bool,
    /// The assistant's reply, already appended to the transcript.
    pub reply: Message,
    /// Tools the assistant invoked while answering (not rendered in the
    /// transcript).
    pub tool_calls: Vec<ToolCallRecord>,
}

/// Synchronizer for the active conversation and the conversation list.
///
/// Cheap to clone; all clones share the same transcript and listing cache.
#[derive(Clone)]
pub struct ChatSync {
    inner: Arc<ChatSyncInner>,
}

struct ChatSyncInner {
    api: ApiClient,
    transcript: RwLock<Vec<Message>>,
    conversation_id: RwLock<Option<Uuid>>,
    listing: RwLock<Vec<ConversationSummary>>,
    last_page: RwLock<(u32, u32)>,
}

impl ChatSync {
    pub fn new(api: ApiClient) -> Self {
        Self {
            inner: Arc::new(ChatSyncInner {
                api,
                transcript: RwLock::new(Vec::new()),
                conversation_id: RwLock::new(None),
                listing: RwLock::new(Vec::new()),
                last_page: RwLock::new((DEFAULT_LIST_LIMIT, 0)),
            }),
        }
    }

    /// Snapshot of the current transcript.
    pub async fn transcript(&self) -> Vec<Message> {
        self.inner.transcript.read().await.clone()
    }

    /// The conversation the transcript belongs to, once the server has
    /// assigned one.
    pub async fn conversation_id(&self) -> Option<Uuid> {
        *self.inner.conversation_id.read().await
    }

    /// Snapshot of the cached conversation listing.
    pub async fn conversations(&self) -> Vec<ConversationSummary> {
        self.inner.listing.read().await.clone()
    }

    /// Start a new conversation: empty transcript, no id.
    ///
    /// Any unsent provisional message is discarded with the rest.
    pub async fn reset(&self) {
        let mut transcript = self.inner.transcript.write().await;
        let mut conversation_id = self.inner.conversation_id.write().await;
        transcript.clear();
        *conversation_id = None;
        debug!("Transcript reset for a new conversation");
    }

    /// Send a message: provisional append, then reconcile.
    ///
    /// The provisional user message (client-local id, never sent to the
    /// server) appears in the transcript immediately. On success the
    /// assistant's reply is appended and a newly-assigned conversation id
    /// becomes authoritative; on failure the provisional message is removed
    /// entirely - full rollback, not partial edit - and the error is
    /// surfaced for re-send.
    pub async fn send(&self, content: &str) -> Result<SendOutcome, SyncError> {
        let content = validate_text("message", content, None)?;

        let provisional = Message::provisional(content.clone());
        let provisional_id = provisional.id;
        {
            let mut transcript = self.inner.transcript.write().await;
            transcript.push(provisional);
        }

        let request = ChatRequest {
            message: content,
            conversation_id: self.conversation_id().await,
        };

        let result: Result<ChatResponse, ApiError> =
            self.inner.api.post(CHAT_ENDPOINT, &request).await;

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                warn!("Send failed - removing provisional message: {}", e);
                let mut transcript = self.inner.transcript.write().await;
                transcript.retain(|m| m.id != provisional_id);
                return Err(e.into());
            }
        };

        let started_conversation = {
            let mut conversation_id = self.inner.conversation_id.write().await;
            match *conversation_id {
                Some(_) => false,
                None => {
                    info!("Server opened conversation {}", response.conversation_id);
                    *conversation_id = Some(response.conversation_id);
                    true
                }
            }
        };

        let reply = Message {
            id: Uuid::new_v4(),
            role: MessageRole::Assistant,
            content: response.message,
            created_at: Utc::now(),
        };
        {
            let mut transcript = self.inner.transcript.write().await;
            transcript.push(reply.clone());
        }

        Ok(SendOutcome {
            conversation_id: response.conversation_id,
            started_conversation,
            reply,
            tool_calls: response.tool_calls,
        })
    }

    /// Replace the transcript with the server's authoritative history.
    ///
    /// Full overwrite, not a merge: tool-role messages are filtered out and
    /// any provisional unsent message is implicitly discarded.
    pub async fn load(&self, id: Uuid) -> Result<Vec<Message>, SyncError> {
        let detail: ConversationDetail = self
            .inner
            .api
            .get(&format!("{CONVERSATIONS_ENDPOINT}/{id}"))
            .await?;

        let messages: Vec<Message> = detail
            .messages
            .into_iter()
            .filter(|m| m.role.is_renderable())
            .collect();
        info!("Loaded conversation {} ({} messages)", id, messages.len());

        let mut transcript = self.inner.transcript.write().await;
        let mut conversation_id = self.inner.conversation_id.write().await;
        *transcript = messages.clone();
        *conversation_id = Some(id);

        Ok(messages)
    }

    /// Fetch a page of the conversation list and cache it.
    pub async fn list(&self, limit: u32, offset: u32) -> Result<ConversationListing, SyncError> {
        let listing: ConversationListing = self
            .inner
            .api
            .get(&format!(
                "{CONVERSATIONS_ENDPOINT}?limit={limit}&offset={offset}"
            ))
            .await?;

        let mut cached = self.inner.listing.write().await;
        let mut last_page = self.inner.last_page.write().await;
        *cached = listing.conversations.clone();
        *last_page = (limit, offset);

        Ok(listing)
    }

    /// Delete a conversation with optimistic removal from the listing.
    ///
    /// A "not found" failure counts as already-successful (idempotent
    /// delete). Any other failure reloads the cached page to resynchronize,
    /// then surfaces the error. Deleting the active conversation resets the
    /// transcript.
    pub async fn delete(&self, id: Uuid) -> Result<(), SyncError> {
        {
            let mut listing = self.inner.listing.write().await;
            listing.retain(|c| c.id != id);
        }

        if self.conversation_id().await == Some(id) {
            self.reset().await;
        }

        let result = self
            .inner
            .api
            .delete(&format!("{CONVERSATIONS_ENDPOINT}/{id}"))
            .await;

        match result {
            Ok(()) => {
                info!("Deleted conversation {}", id);
                Ok(())
            }
            Err(ApiError::Http { status, .. }) if status.is_not_found() => {
                debug!("Conversation {} already gone server-side", id);
                Ok(())
            }
            Err(e) => {
                warn!("Delete failed for conversation {} - resyncing list: {}", id, e);
                let (limit, offset) = *self.inner.last_page.read().await;
                if let Err(reload) = self.list(limit, offset).await {
                    warn!("List resync after failed delete also failed: {}", reload);
                }
                Err(e.into())
            }
        }
    }
}
