//! JSON-Schema-compatible tool export format (spec.md §6).
//!
//! Trimmed from the teacher's `llm::provider::tool::ToolDefinition`, which
//! also carries provider-specific tool types (`apply_patch`, `shell`,
//! `grammar`, `web_search`) this crate has no use for: the core only ever
//! exports plain function-calling tools to the model.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One entry in the `tools` array sent to the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>, input_schema: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema,
        }
    }
}

/// Convenience alias matching the OpenAI/Anthropic "function" shape some
/// hosts prefer when bridging to a specific provider SDK. Not used
/// internally; provided so a host's `ModelProvider` impl can re-shape a
/// [`ToolDefinition`] without re-deriving the fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

impl From<&ToolDefinition> for FunctionDefinition {
    fn from(tool: &ToolDefinition) -> Self {
        Self {
            name: tool.name.clone(),
            description: tool.description.clone(),
            parameters: tool.input_schema.clone(),
        }
    }
}
