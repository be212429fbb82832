//! The Execution Adapter abstraction (spec.md §4.1): the polymorphism
//! point that lets the same tool code target a local process, a
//! container, or a remote sandbox.

mod container;
mod local;
mod pathutil;
mod remote;

pub use container::ContainerExecutionAdapter;
pub use local::LocalExecutionAdapter;
pub use pathutil::contain_path;
pub use remote::RemoteExecutionAdapter;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::RuntimeLimits;
use crate::error::AdapterError;

/// Result of `executeCommand` (spec.md §4.1). Exit code is propagated
/// verbatim; a non-zero exit is a tool-level failure, not an adapter-level
/// error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

/// Pagination metadata attached to a `readFile` result when `lineOffset >
/// 0` or `lineCount` is set (spec.md §4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub total_lines: usize,
    pub start_line: usize,
    /// Index of the last returned line, exclusive upper bound clamped to
    /// `total_lines`.
    pub end_line: usize,
    pub has_more: bool,
}

/// Result of `readFile`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReadResult {
    pub content: String,
    pub pagination: Option<Pagination>,
}

/// Result of `editFile`: both original and new content are returned on
/// success (spec.md §4.1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEditResult {
    pub original_content: String,
    pub new_content: String,
}

/// A single entry returned by `ls` (spec.md §4.1). `size`/`modified` are
/// only populated when `details=true`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LsEntry {
    pub name: String,
    pub is_directory: bool,
    pub is_file: bool,
    pub is_symbolic_link: bool,
    pub size: Option<u64>,
    pub modified_unix_secs: Option<i64>,
}

/// Options accepted by `readFile`. Caller-supplied ceilings are clamped by
/// the adapter against [`RuntimeLimits`] — never relaxed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOptions {
    pub max_size: Option<usize>,
    pub line_offset: Option<usize>,
    pub line_count: Option<usize>,
}

/// Options accepted by `glob`.
#[derive(Debug, Clone, Default)]
pub struct GlobOptions {
    pub cwd: Option<String>,
    pub include_dotfiles: bool,
}

/// The polymorphic backend over which filesystem and shell operations are
/// executed (native, container, remote sandbox). Every fallible operation
/// returns `Ok`/`Err`; adapter methods never panic across the boundary
/// (spec.md §4.1).
#[async_trait]
pub trait ExecutionAdapter: Send + Sync {
    async fn execute_command(
        &self,
        command: &str,
        working_dir: Option<&str>,
    ) -> Result<CommandResult, AdapterError>;

    async fn read_file(
        &self,
        path: &str,
        opts: ReadOptions,
        limits: &RuntimeLimits,
    ) -> Result<FileReadResult, AdapterError>;

    async fn write_file(&self, path: &str, content: &str) -> Result<(), AdapterError>;

    /// Whether `path` already exists, relative to the project root. Used
    /// by [`crate::tools::builtin::FileWriteTool`] to enforce its own
    /// overwrite policy (spec.md §4.1: "enforced by the `FileWrite` tool,
    /// not the adapter") — this method only answers the question, it
    /// does not itself refuse anything.
    async fn path_exists(&self, path: &str) -> Result<bool, AdapterError>;

    async fn edit_file(
        &self,
        path: &str,
        search_code: &str,
        replace_code: &str,
    ) -> Result<FileEditResult, AdapterError>;

    async fn glob(
        &self,
        pattern: &str,
        opts: GlobOptions,
        limits: &RuntimeLimits,
    ) -> Result<Vec<String>, AdapterError>;

    async fn ls(
        &self,
        path: &str,
        show_hidden: bool,
        details: bool,
    ) -> Result<Vec<LsEntry>, AdapterError>;
}
