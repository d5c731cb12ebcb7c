//! LLM provider abstraction.
//!
//! `LlmProvider` is an enum over concrete provider implementations.
//! Add a new variant + module in `providers/` for each additional backend.
//!
//! Provider instances are shared immutable capabilities — clone them freely.
//! Async is delegated to the underlying provider; the `complete` method is
//! `async fn` on the enum so callers need no trait-object machinery.
//!
//! Providers are stateless between calls: each request carries the full
//! ordered conversation snapshot as [`ChatMessage`] entries, and the reply is
//! one assistant message. Session bookkeeping lives in `crate::chat`.

pub mod providers;

use thiserror::Error;

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("provider request failed: {0}")]
    Request(String),
}

// ── Conversation snapshot entry ───────────────────────────────────────────────

/// One `{role, content}` pair of the history snapshot sent to a provider.
///
/// Deliberately stringly-typed on `role`: this is the wire vocabulary
/// (`"user"`, `"assistant"`), not the session model.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self { role: role.into(), content: content.into() }
    }
}

// ── Provider enum ─────────────────────────────────────────────────────────────

/// All available provider backends.
///
/// Enum dispatch avoids `dyn` trait objects and the `async-trait` dependency.
/// Adding a backend = new module + new variant + new `complete` arm.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    Dummy(providers::dummy::DummyProvider),
    Mistral(providers::mistral::MistralProvider),
}

impl LlmProvider {
    /// Send the full conversation snapshot and return the assistant's reply text.
    pub async fn complete(&self, history: &[ChatMessage]) -> Result<String, ProviderError> {
        match self {
            LlmProvider::Dummy(p) => p.complete(history).await,
            LlmProvider::Mistral(p) => p.complete(history).await,
        }
    }
}
