//! The `batch` tool (spec.md §4.3, §5): fans child tool invocations out
//! in parallel and folds their results into one response, in input order.
//!
//! All children share the same [`ToolContext`] (and so the same
//! [`crate::permissions::PermissionManager`]) — the grant cache means a
//! repeated `(tool_id, args)` pair across a batch only prompts once, and
//! the manager itself serializes genuinely distinct prompts to a single
//! outstanding ask at a time (spec.md §4.4, §5). Filesystem-conflict
//! safety across concurrent sub-calls (e.g. two edits to the same file in
//! one batch) is the caller's responsibility — this tool does not itself
//! detect or prevent that.

use std::time::Instant;

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::{json, Value};

use crate::error::ToolError;
use crate::tools::descriptor::{ToolCategory, ToolDescriptor};
use crate::tools::tool_trait::{Tool, ToolContext, ToolOutcome};
use crate::tools::ToolRegistry;

pub struct BatchTool {
    descriptor: ToolDescriptor,
}

impl BatchTool {
    pub fn new() -> Self {
        let descriptor = ToolDescriptor::new(
            "batch",
            "batch",
            "Run several independent tool calls concurrently and return each call's result in \
             input order. Useful when several independent reads or edits are known upfront.",
            json!({
                "type": "object",
                "properties": {
                    "description": {"type": "string"},
                    "invocations": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": {
                                "tool_name": {"type": "string"},
                                "input": {"type": "object"},
                            },
                            "required": ["tool_name", "input"],
                        },
                    },
                },
                "required": ["invocations"],
            }),
            vec!["invocations".to_owned()],
            ToolCategory::Composite,
        )
        .always_require_permission();
        Self { descriptor }
    }

    /// Run this batch against `registry` — taken as a parameter rather
    /// than held on `self` because a registry must own its tools
    /// (including this one) without a reference cycle.
    ///
    /// Batch itself reports success as long as the list was processed;
    /// individual child failures are captured per-row, not raised here
    /// (spec.md §4.3).
    pub async fn run_against(
        &self,
        registry: &ToolRegistry,
        ctx: &ToolContext<'_>,
        args: Value,
    ) -> Result<ToolOutcome, ToolError> {
        let invocations = args
            .get("invocations")
            .and_then(Value::as_array)
            .ok_or_else(|| ToolError::MissingParameter {
                name: "invocations".to_owned(),
            })?;

        let calls = invocations
            .iter()
            .map(|invocation| {
                let tool_name = invocation
                    .get("tool_name")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ToolError::MissingParameter {
                        name: "invocations[].tool_name".to_owned(),
                    })?
                    .to_owned();
                let input = invocation.get("input").cloned().unwrap_or(json!({}));
                Ok((tool_name, input))
            })
            .collect::<Result<Vec<(String, Value)>, ToolError>>()?;

        // Every child future is polled concurrently on this task via
        // `join_all` rather than spawned — `ToolContext` borrows its
        // adapter/permissions/limits rather than owning them, so children
        // can't cross a `tokio::spawn`'s `'static` boundary. Concurrent
        // polling still overlaps their I/O-bound awaits, satisfying
        // "total wall time approximately equal to the slowest, not the
        // sum" (spec.md §8 property 6).
        let results = join_all(calls.into_iter().map(|(tool_name, input)| {
            async move {
                let started = Instant::now();
                // spec.md §4.3: "lookup is by tool name, falling back to id".
                let outcome = match registry.resolve(&tool_name) {
                    Some(tool) => registry.dispatch(&tool.descriptor().id.clone(), input, ctx).await,
                    None => Err(ToolError::UnknownTool {
                        name: tool_name.clone(),
                    }),
                };
                (tool_name, started.elapsed().as_millis() as u64, outcome)
            }
        }))
        .await;

        let mut rows = Vec::with_capacity(results.len());
        let mut read_paths = Vec::new();
        for (tool_name, execution_time_ms, outcome) in results {
            match outcome {
                Ok(outcome) => {
                    read_paths.extend(outcome.read_paths.iter().cloned());
                    rows.push(json!({
                        "tool_name": tool_name,
                        "success": true,
                        "result": outcome.payload,
                        "execution_time_ms": execution_time_ms,
                    }));
                }
                Err(err) => {
                    rows.push(json!({
                        "tool_name": tool_name,
                        "success": false,
                        "error": err.to_string(),
                        "execution_time_ms": execution_time_ms,
                    }));
                }
            }
        }

        Ok(ToolOutcome {
            payload: json!({ "results": rows }),
            read_paths,
        })
    }
}

impl Default for BatchTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for BatchTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    /// `Tool::run` cannot recurse into the registry it is itself
    /// registered in (it has no reference back to it), so this path
    /// always reports the same error: callers wanting a real batch
    /// dispatch must go through [`BatchTool::run_against`], which
    /// [`crate::agent::AgentRunner`] does.
    async fn run(&self, _ctx: &ToolContext<'_>, _args: Value) -> Result<ToolOutcome, ToolError> {
        Err(ToolError::Runtime {
            message: "batch must be dispatched via BatchTool::run_against, not Tool::run"
                .to_owned(),
        })
    }
}
