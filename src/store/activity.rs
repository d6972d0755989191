//! Merged feed of the most recent conversations and messages.

use serde_json::Value;

use super::conversations::{Conversation, ConversationStore};
use super::messages::{Message, MessageStore};

#[derive(Clone)]
pub struct ActivityStore {
    conversations: ConversationStore,
    messages: MessageStore,
}

impl ActivityStore {
    pub fn new(conversations: ConversationStore, messages: MessageStore) -> Self {
        Self {
            conversations,
            messages,
        }
    }

    /// The `limit` most recent items across conversations and messages.
    /// Both feeds are fetched concurrently, each already limited to `limit`,
    /// then merged and truncated.
    pub async fn recent(&self, limit: i64) -> anyhow::Result<Vec<Value>> {
        let limit = limit.max(1);
        let (conversations, messages) =
            tokio::join!(self.conversations.recent(limit), self.messages.recent(limit));
        merge_recent(conversations?, messages?, limit as usize)
    }
}

struct Tagged {
    timestamp: String,
    row_id: i64,
    kind: &'static str,
    value: Value,
}

/// Merge two already-sorted feeds into one, newest first. Ordering is by
/// timestamp descending; equal timestamps fall back to row id descending and
/// then kind, which makes the merge deterministic but is best-effort as a
/// chronology (the source rows carry no global sequence).
pub fn merge_recent(
    conversations: Vec<Conversation>,
    messages: Vec<Message>,
    limit: usize,
) -> anyhow::Result<Vec<Value>> {
    let mut items = Vec::with_capacity(conversations.len() + messages.len());

    for conversation in conversations {
        let value = serde_json::to_value(&conversation)?;
        items.push(tag(
            "conversation",
            conversation.started_at,
            conversation.id,
            value,
        ));
    }
    for message in messages {
        let value = serde_json::to_value(&message)?;
        items.push(tag("message", message.timestamp, message.id, value));
    }

    items.sort_by(|a, b| {
        b.timestamp
            .cmp(&a.timestamp)
            .then(b.row_id.cmp(&a.row_id))
            .then(a.kind.cmp(b.kind))
    });
    items.truncate(limit);

    Ok(items.into_iter().map(|t| t.value).collect())
}

fn tag(kind: &'static str, timestamp: String, row_id: i64, mut value: Value) -> Tagged {
    if let Some(object) = value.as_object_mut() {
        object.insert("type".to_string(), Value::String(kind.to_string()));
    }
    Tagged {
        timestamp,
        row_id,
        kind,
        value,
    }
}
