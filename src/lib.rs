//! # agentcore
//!
//! Core agent runtime for a tool-using coding assistant: the control loop
//! that drives a large-language-model through multi-turn, tool-augmented
//! problem solving against a code repository.
//!
//! This crate hosts four tightly coupled subsystems:
//!
//! - [`agent`] — the iterative query/response loop ([`agent::AgentRunner`])
//! - [`tools`] — a typed tool registry, validation, and the built-in tools
//! - [`exec`] — the [`exec::ExecutionAdapter`] boundary (local, container,
//!   remote sandbox backends)
//! - [`permissions`] — interactive, side-effect gating consent broker
//!
//! It does not host the LLM, render UI, or persist sessions durably; those
//! are host concerns. The host supplies a [`model::ModelProvider`], an
//! [`exec::ExecutionAdapter`], a [`permissions::PermissionUiHandler`], and a
//! [`tracing::Subscriber`] of its choosing (see [`logging`]).
//!
//! ## Quickstart
//!
//! ```rust,ignore
//! use agentcore::agent::{AgentRunner, SessionState};
//! use agentcore::config::SessionConfig;
//!
//! # async fn run(provider: impl agentcore::model::ModelProvider + 'static,
//! #              adapter: impl agentcore::exec::ExecutionAdapter + 'static,
//! #              ui: impl agentcore::permissions::PermissionUiHandler + 'static) {
//! let mut session = SessionState::new(SessionConfig::default());
//! let runner = AgentRunner::new(provider, adapter, ui);
//! let outcome = runner.process_query("List the files in ./src", &mut session).await;
//! if let Some(err) = outcome.error {
//!     eprintln!("loop terminated: {err}");
//! }
//! println!("{}", outcome.response);
//! # }
//! ```

pub mod agent;
pub mod config;
pub mod context;
pub mod error;
pub mod exec;
pub mod logging;
pub mod model;
pub mod permissions;
pub mod tools;

pub use agent::{AgentRunner, ProcessQueryOutcome, SessionState, ToolResultEntry};
pub use config::{PermissionMode, RuntimeLimits, SessionConfig};
pub use context::{ContentBlock, ContextWindow, Message, MessageRole};
pub use error::{AdapterError, PermissionError, ProviderError, RunnerError, ToolError};
pub use exec::ExecutionAdapter;
pub use model::ModelProvider;
pub use permissions::{PermissionManager, PermissionUiHandler};
pub use tools::{Tool, ToolContext, ToolRegistry};
