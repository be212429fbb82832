//! Model Client and `ModelProvider` contract (spec.md §4.5, §6).

mod client;
mod provider;
mod tool_schema;

pub use client::ModelClient;
pub use provider::{LLMRequest, LLMResponse, ModelProvider, Usage};
pub use tool_schema::{FunctionDefinition, ToolDefinition};
