//! The `ModelProvider` contract consumed by [`super::ModelClient`]
//! (spec.md §4.5).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::tool_schema::ToolDefinition;
use crate::context::{ContentBlock, Message};
use crate::error::ProviderError;

/// Token accounting returned by a provider call, accumulated into
/// `SessionState.token_usage` (spec.md §4.6).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub total_tokens: u64,
}

/// The outbound shape: current transcript, registry's schema export, and
/// generation options (spec.md §4.5, §6).
#[derive(Debug, Clone, Default)]
pub struct LLMRequest {
    pub messages: Vec<Message>,
    pub system: Option<String>,
    pub tools: Vec<ToolDefinition>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl LLMRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// The normalized response shape: a sequence of content blocks plus
/// optional usage accounting (spec.md §4.5, §6).
#[derive(Debug, Clone, Default)]
pub struct LLMResponse {
    pub content: Vec<ContentBlock>,
    pub usage: Option<Usage>,
}

impl LLMResponse {
    pub fn tool_use_blocks(&self) -> impl Iterator<Item = (&str, &str, &serde_json::Value)> {
        self.content.iter().filter_map(ContentBlock::as_tool_use)
    }

    pub fn has_tool_use(&self) -> bool {
        self.content
            .iter()
            .any(|block| block.as_tool_use().is_some())
    }

    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(ContentBlock::as_text)
            .collect::<Vec<_>>()
            .join("")
    }
}

/// Universal LLM provider trait (spec.md §4.5).
///
/// Consumed exactly as: `processQuery(prompt or messages, options) ->
/// { content: Block[], usage?: { totalTokens } }`. Implementations carry
/// no mutable state across calls beyond their own request-shaping
/// helpers (spec.md §4.5).
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name (e.g. `"anthropic"`, `"openai"`), used only for
    /// diagnostics.
    fn name(&self) -> &str;

    async fn process_query(&self, request: LLMRequest) -> Result<LLMResponse, ProviderError>;
}
