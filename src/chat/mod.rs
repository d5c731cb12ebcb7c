//! Conversation session manager.
//!
//! [`ChatService`] owns the provider handle and the greeting text; sessions
//! are values owned by the caller. One turn = append the user message, send
//! the full history snapshot to the provider, append the reply.
//!
//! The user message is appended BEFORE the provider call so history reflects
//! the user's input even when the call fails. Provider failures degrade to an
//! in-band assistant notice instead of surfacing as errors — a failed turn
//! and a successful one both grow the history by exactly two messages, and
//! the session stays usable.

pub mod session;

pub use session::{ConversationSession, Message, Role};

use thiserror::Error;
use tracing::{debug, warn};

use crate::llm::{ChatMessage, LlmProvider, ProviderError};

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TurnError {
    #[error("empty input: a turn needs at least one non-whitespace character")]
    EmptyInput,
}

// ── ChatService ───────────────────────────────────────────────────────────────

pub struct ChatService {
    provider: LlmProvider,
    greeting: String,
}

impl ChatService {
    pub fn new(provider: LlmProvider, greeting: impl Into<String>) -> Self {
        Self { provider, greeting: greeting.into() }
    }

    /// Open a fresh session seeded with the assistant greeting.
    pub fn start_session(&self) -> ConversationSession {
        let session = ConversationSession::new(&self.greeting);
        debug!(session_id = %session.id, "session started");
        session
    }

    /// Run one turn: append `input` as a user message, get a reply, append it.
    ///
    /// Returns the appended assistant message — a real reply on provider
    /// success, a degraded notice on provider failure. The only error is
    /// [`TurnError::EmptyInput`], which leaves the session untouched.
    ///
    /// Taking `&mut ConversationSession` serializes turns per session: no two
    /// provider calls for the same session can be in flight.
    pub async fn submit_turn(
        &self,
        session: &mut ConversationSession,
        input: &str,
    ) -> Result<Message, TurnError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(TurnError::EmptyInput);
        }

        session.push(Message::user(input));

        let snapshot: Vec<ChatMessage> = session
            .messages()
            .iter()
            .map(|m| ChatMessage::new(m.role.as_str(), m.content.clone()))
            .collect();

        let reply = match self.provider.complete(&snapshot).await {
            Ok(text) => {
                debug!(session_id = %session.id, turn = session.len() / 2, "provider replied");
                Message::assistant(text)
            }
            Err(e) => {
                warn!(session_id = %session.id, error = %e, "provider call failed — degrading to in-band notice");
                Message::assistant(degraded_notice(&e))
            }
        };

        session.push(reply.clone());
        Ok(reply)
    }
}

/// Apologetic assistant text appended in place of a real reply.
fn degraded_notice(err: &ProviderError) -> String {
    format!("Désolé, une erreur s'est produite : {err}. Veuillez réessayer dans un instant.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::providers::dummy::DummyProvider;

    fn service() -> ChatService {
        ChatService::new(LlmProvider::Dummy(DummyProvider::default()), "bonjour")
    }

    fn failing_service() -> ChatService {
        ChatService::new(LlmProvider::Dummy(DummyProvider::failing()), "bonjour")
    }

    #[test]
    fn fresh_session_contains_exactly_the_greeting() {
        let s = service().start_session();
        assert_eq!(s.len(), 1);
        assert_eq!(s.messages()[0].role, Role::Assistant);
        assert_eq!(s.messages()[0].content, "bonjour");
    }

    #[tokio::test]
    async fn successful_turn_grows_history_by_two_in_order() {
        let svc = service();
        let mut s = svc.start_session();

        let reply = svc.submit_turn(&mut s, "hello").await.unwrap();

        assert_eq!(s.len(), 3);
        assert_eq!(s.messages()[1].role, Role::User);
        assert_eq!(s.messages()[1].content, "hello");
        assert_eq!(s.messages()[2].role, Role::Assistant);
        assert_eq!(s.messages()[2].content, "[echo] hello");
        assert_eq!(reply.content, "[echo] hello");
    }

    #[tokio::test]
    async fn provider_failure_degrades_without_escaping() {
        let svc = failing_service();
        let mut s = svc.start_session();

        // No error escapes submit_turn on provider failure.
        let reply = svc.submit_turn(&mut s, "hello").await.unwrap();

        assert_eq!(s.len(), 3);
        assert_eq!(s.messages()[1].role, Role::User);
        assert_eq!(s.messages()[1].content, "hello");
        assert_eq!(s.messages()[2].role, Role::Assistant);
        assert!(reply.content.contains("Désolé"));
        assert_eq!(s.messages()[2].content, reply.content);
    }

    #[tokio::test]
    async fn empty_input_rejected_without_mutation() {
        let svc = service();
        let mut s = svc.start_session();

        assert_eq!(svc.submit_turn(&mut s, "").await, Err(TurnError::EmptyInput));
        assert_eq!(svc.submit_turn(&mut s, "   \t\n").await, Err(TurnError::EmptyInput));
        assert_eq!(s.len(), 1);
    }

    #[tokio::test]
    async fn input_is_trimmed_before_append() {
        let svc = service();
        let mut s = svc.start_session();

        svc.submit_turn(&mut s, "  hello  ").await.unwrap();
        assert_eq!(s.messages()[1].content, "hello");
    }

    #[tokio::test]
    async fn session_survives_failure_and_keeps_appending() {
        let svc = failing_service();
        let mut s = svc.start_session();

        svc.submit_turn(&mut s, "one").await.unwrap();
        svc.submit_turn(&mut s, "two").await.unwrap();

        assert_eq!(s.len(), 5);
        assert_eq!(s.messages()[3].content, "two");
    }
}
