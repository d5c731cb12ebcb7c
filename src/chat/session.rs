//! Session data model — roles, messages, and the append-only history.
//!
//! A [`ConversationSession`] is an explicit value owned by the caller, not
//! ambient state: all mutation goes through crate-internal append operations,
//! so history is append-ordered by construction and never reordered or
//! truncated. Sessions are created through `ChatService::start_session` so
//! the opening-greeting invariant cannot be bypassed.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

// ── Role & Message ────────────────────────────────────────────────────────────

/// Who authored a message. The same vocabulary the provider wire uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One transcript entry. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into(), timestamp: Utc::now() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into(), timestamp: Utc::now() }
    }
}

// ── ConversationSession ───────────────────────────────────────────────────────

/// Append-only ordered message history for one user's chat interaction.
///
/// Always opens with a synthetic assistant greeting. `messages` is private:
/// the only mutation is [`push`](Self::push), crate-internal, so external
/// consumers get a read-only view and the ordering guarantee holds.
#[derive(Debug, Clone)]
pub struct ConversationSession {
    pub id: Uuid,
    messages: Vec<Message>,
}

impl ConversationSession {
    /// Create a session seeded with the greeting message.
    pub(crate) fn new(greeting: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            messages: vec![Message::assistant(greeting)],
        }
    }

    /// Read-only view of the full ordered history.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Never true — every session starts with the greeting.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Append one message at the end. The only mutation a session supports.
    pub(crate) fn push(&mut self, message: Message) {
        self.messages.push(message);
    }
}
