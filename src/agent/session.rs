//! `SessionState` and `TokenUsage` (spec.md §3): the per-conversation
//! envelope the host owns and the `AgentRunner` mutates.

use serde::{Deserialize, Serialize};

use crate::config::SessionConfig;
use crate::context::ContextWindow;
use crate::model::Usage;

/// Running total of tokens billed across a session's `processQuery` calls
/// (spec.md §4.6: "token usage returned by the provider is accumulated
/// into `SessionState.tokenUsage`").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub total_tokens: u64,
}

impl TokenUsage {
    pub fn accumulate(&mut self, usage: Usage) {
        self.total_tokens += usage.total_tokens;
    }
}

/// Everything one conversation needs across repeated `processQuery` calls:
/// the transcript, the running token count, and the tunable configuration
/// (spec.md §3 `SessionState`).
///
/// Created by the host, mutated only by [`super::AgentRunner`]. The
/// `ContextWindow` is append-only for the duration of a query; trimming it
/// between queries is the host's responsibility (spec.md §3 invariant).
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub context: ContextWindow,
    pub token_usage: TokenUsage,
    pub config: SessionConfig,
}

impl SessionState {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            context: ContextWindow::new(),
            token_usage: TokenUsage::default(),
            config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_session_has_empty_context_and_zero_usage() {
        let session = SessionState::new(SessionConfig::default());
        assert!(session.context.messages.is_empty());
        assert_eq!(session.token_usage.total_tokens, 0);
    }

    #[test]
    fn token_usage_accumulates_across_calls() {
        let mut usage = TokenUsage::default();
        usage.accumulate(Usage { total_tokens: 10 });
        usage.accumulate(Usage { total_tokens: 5 });
        assert_eq!(usage.total_tokens, 15);
    }
}
