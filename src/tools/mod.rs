//! Tool Registry & Dispatch (spec.md §4.2, §4.3): the typed tool
//! contract, its registry, and the ten built-in tools.

mod descriptor;
mod registry;
mod tool_trait;

pub mod builtin;

pub use descriptor::{ToolCategory, ToolDescriptor};
pub use registry::{ToolRegistry, Unsubscribe};
pub use tool_trait::{Tool, ToolContext, ToolOutcome};
