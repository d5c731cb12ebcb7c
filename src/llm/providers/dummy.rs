//! Dummy LLM provider — echoes the last user message back prefixed with `[echo]`.
//! Used for tests and keyless runs without a real API key. `failing()` builds
//! a variant whose every call errors, for exercising degraded-turn handling.

use crate::llm::{ChatMessage, ProviderError};

#[derive(Debug, Clone, Default)]
pub struct DummyProvider {
    fail: bool,
}

impl DummyProvider {
    /// A provider whose every `complete` call returns `ProviderError::Request`.
    pub fn failing() -> Self {
        Self { fail: true }
    }

    pub async fn complete(&self, history: &[ChatMessage]) -> Result<String, ProviderError> {
        if self.fail {
            return Err(ProviderError::Request("dummy provider configured to fail".into()));
        }
        let last_user = history
            .iter()
            .rev()
            .find(|m| m.role == "user")
            .map(|m| m.content.as_str())
            .unwrap_or_default();
        Ok(format!("[echo] {last_user}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn complete_echoes_last_user_message() {
        let p = DummyProvider::default();
        let history = vec![
            ChatMessage::new("assistant", "hello"),
            ChatMessage::new("user", "first"),
            ChatMessage::new("assistant", "[echo] first"),
            ChatMessage::new("user", "second"),
        ];
        assert_eq!(p.complete(&history).await.unwrap(), "[echo] second");
    }

    #[tokio::test]
    async fn complete_empty_history() {
        let p = DummyProvider::default();
        assert_eq!(p.complete(&[]).await.unwrap(), "[echo] ");
    }

    #[tokio::test]
    async fn failing_variant_errors() {
        let p = DummyProvider::failing();
        let err = p.complete(&[ChatMessage::new("user", "hi")]).await.unwrap_err();
        assert!(err.to_string().contains("request failed"));
    }
}
