//! The Agent Loop (spec.md §4.6): `SessionState`, `TokenUsage`, and the
//! `AgentRunner` that implements `processQuery`.

mod runner;
mod session;

pub use runner::{AgentRunner, ProcessQueryOutcome, ToolResultEntry};
pub use session::{SessionState, TokenUsage};
