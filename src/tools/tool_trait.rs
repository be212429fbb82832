//! The `Tool` trait and the per-dispatch context it runs against
//! (spec.md §4.3). Grounded on the teacher's `tools::traits::Tool`
//! contract as referenced (but not itself present) from `bash_tool.rs`,
//! generalized from a single `execute(Value) -> Result<Value>` method to
//! carry a typed descriptor and the adapter/permission/limits context a
//! multi-backend tool layer needs.

use std::collections::HashSet;
use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;

use super::descriptor::ToolDescriptor;
use crate::config::RuntimeLimits;
use crate::error::ToolError;
use crate::exec::ExecutionAdapter;
use crate::permissions::PermissionManager;

/// Everything a [`Tool::run`] call needs beyond its own arguments:
/// the execution backend, the permission gate, runtime ceilings, and a
/// snapshot of which paths this context window has already read (for
/// `FileEdit`'s read-before-write invariant).
///
/// Borrowed, not owned: an [`crate::agent::AgentRunner`] constructs one
/// per round and drops it before mutating the transcript.
pub struct ToolContext<'a> {
    pub adapter: &'a dyn ExecutionAdapter,
    pub permissions: &'a PermissionManager,
    pub limits: &'a RuntimeLimits,
    pub read_set: &'a HashSet<PathBuf>,
}

/// The result of a successful [`Tool::run`] call: the JSON payload that
/// becomes the `ToolResult` content block, plus any paths this call read
/// (folded into the context window's read-set by the caller — spec.md
/// §3: "FileEdit requires prior read").
#[derive(Debug, Clone, Default)]
pub struct ToolOutcome {
    pub payload: Value,
    pub read_paths: Vec<PathBuf>,
}

impl ToolOutcome {
    pub fn payload(payload: Value) -> Self {
        Self {
            payload,
            read_paths: Vec::new(),
        }
    }

    pub fn with_read_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.read_paths.push(path.into());
        self
    }
}

/// A single callable capability (spec.md §4.3). Implementors describe
/// themselves via [`Tool::descriptor`] and perform their effect in
/// [`Tool::run`]; required-parameter presence, parameter-type checking
/// against the declared schema, and permission gating all happen in the
/// registry's dispatch wrapper, not here.
#[async_trait]
pub trait Tool: Send + Sync {
    fn descriptor(&self) -> &ToolDescriptor;

    async fn run(&self, ctx: &ToolContext<'_>, args: Value) -> Result<ToolOutcome, ToolError>;
}
