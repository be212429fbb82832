//! Composes the outbound request from the current Context Window plus the
//! registry's schema export, invokes the provider, and retries once with a
//! short backoff on a transient error (spec.md §4.5, §4.6, §7).

use std::time::Duration;

use tracing::warn;

use super::provider::{LLMRequest, LLMResponse, ModelProvider};
use super::tool_schema::ToolDefinition;
use crate::context::ContextWindow;
use crate::error::ProviderError;

/// Backoff before the single retry of a transient provider error.
const RETRY_BACKOFF: Duration = Duration::from_millis(250);

/// Shapes requests and normalizes responses for a [`ModelProvider`].
///
/// Carries no mutable state across calls beyond the request-shaping
/// defaults supplied at construction (spec.md §4.5).
pub struct ModelClient<P: ModelProvider> {
    provider: P,
    system_prompt: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

impl<P: ModelProvider> ModelClient<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            system_prompt: None,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
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

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Run one model call against the current transcript, retrying once on
    /// a transient [`ProviderError`] before propagating it (spec.md §4.6,
    /// §7: "one retry with exponential backoff for transient network
    /// failures; then terminate").
    pub async fn run(
        &self,
        context: &ContextWindow,
        tools: Vec<ToolDefinition>,
    ) -> Result<LLMResponse, ProviderError> {
        let mut request = LLMRequest::new(context.messages.clone()).with_tools(tools);
        if let Some(system) = &self.system_prompt {
            request = request.with_system(system.clone());
        }
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.max_tokens {
            request = request.with_max_tokens(max_tokens);
        }

        match self.provider.process_query(request.clone()).await {
            Ok(response) => Ok(response),
            Err(err) if err.is_transient() => {
                warn!(error = %err, "transient provider error, retrying once");
                tokio::time::sleep(RETRY_BACKOFF).await;
                self.provider.process_query(request).await
            }
            Err(err) => Err(err),
        }
    }
}
