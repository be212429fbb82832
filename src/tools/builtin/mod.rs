//! The ten built-in tools (spec.md §4.3): Shell, Glob, Grep, Ls,
//! FileRead, FileEdit, FileWrite, Think, Scratchpad, Batch.

mod batch;
mod fs;
mod meta;
mod search;
mod shell;

pub use batch::BatchTool;
pub use fs::{FileEditTool, FileReadTool, FileWriteTool, LsTool};
pub use meta::{ScratchpadTool, ThinkTool};
pub use search::{GlobTool, GrepTool};
pub use shell::ShellTool;

use super::ToolRegistry;

/// Registers all ten built-ins under their spec-mandated ids. A host
/// wanting a restricted toolset should register a subset directly
/// instead of calling this.
///
/// The ids below are fixed and distinct by construction, so registration
/// can only fail if this list itself regresses — hence the `expect`s
/// rather than threading a `Result` through every caller.
pub fn register_all(registry: &mut ToolRegistry) {
    registry.register(Box::new(ShellTool::new())).expect("builtin ids are distinct");
    registry.register(Box::new(GlobTool::new())).expect("builtin ids are distinct");
    registry.register(Box::new(GrepTool::new())).expect("builtin ids are distinct");
    registry.register(Box::new(LsTool::new())).expect("builtin ids are distinct");
    registry.register(Box::new(FileReadTool::new())).expect("builtin ids are distinct");
    registry.register(Box::new(FileEditTool::new())).expect("builtin ids are distinct");
    registry.register(Box::new(FileWriteTool::new())).expect("builtin ids are distinct");
    registry.register(Box::new(ThinkTool::new())).expect("builtin ids are distinct");
    registry.register(Box::new(ScratchpadTool::new())).expect("builtin ids are distinct");
    registry.register(Box::new(BatchTool::new())).expect("builtin ids are distinct");
}
