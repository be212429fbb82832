//! The `shell` tool (spec.md §4.3): runs one command through the
//! attached [`crate::exec::ExecutionAdapter`]. Grounded on the teacher's
//! `tools::bash_tool::BashTool`, trimmed to a single `run` sub-command —
//! the distinct `ls`/`grep`/`cat`/... sub-commands it dispatched to are
//! now their own tools (`Ls`, `Grep`, `FileRead`).

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::ToolError;
use crate::tools::descriptor::{ToolCategory, ToolDescriptor};
use crate::tools::tool_trait::{Tool, ToolContext, ToolOutcome};

pub struct ShellTool {
    descriptor: ToolDescriptor,
}

impl ShellTool {
    pub fn new() -> Self {
        let descriptor = ToolDescriptor::new(
            "shell",
            "shell",
            "Run a single shell command in the project workspace and return its stdout, \
             stderr, and exit code.",
            json!({
                "type": "object",
                "properties": {
                    "command": {"type": "string", "description": "the command line to run"},
                    "workingDir": {"type": "string", "description": "directory to run in, relative to the project root"},
                },
                "required": ["command"],
            }),
            vec!["command".to_owned()],
            ToolCategory::Shell,
        )
        .always_require_permission();
        Self { descriptor }
    }
}

impl Default for ShellTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ShellTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn run(&self, ctx: &ToolContext<'_>, args: Value) -> Result<ToolOutcome, ToolError> {
        let command = args
            .get("command")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::MissingParameter {
                name: "command".to_owned(),
            })?;
        let working_dir = args.get("workingDir").and_then(Value::as_str);

        let result = ctx.adapter.execute_command(command, working_dir).await?;
        if result.exit_code != 0 {
            return Err(ToolError::Runtime {
                message: format!(
                    "command exited with status {}: {}",
                    result.exit_code, result.stderr
                ),
            });
        }
        Ok(ToolOutcome::payload(json!({
            "stdout": result.stdout,
            "stderr": result.stderr,
            "exitCode": result.exit_code,
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PermissionMode;
    use crate::exec::LocalExecutionAdapter;
    use crate::permissions::{AlwaysDeny, PermissionManager};
    use std::collections::HashSet;

    #[tokio::test]
    async fn runs_command_and_captures_stdout() {
        let adapter = LocalExecutionAdapter::new(".");
        let permissions = PermissionManager::new(PermissionMode::Danger, Box::new(AlwaysDeny), true);
        let limits = crate::config::RuntimeLimits::default();
        let read_set = HashSet::new();
        let ctx = ToolContext {
            adapter: &adapter,
            permissions: &permissions,
            limits: &limits,
            read_set: &read_set,
        };

        let tool = ShellTool::new();
        let outcome = tool
            .run(&ctx, json!({"command": "echo hello"}))
            .await
            .unwrap();
        assert_eq!(outcome.payload["stdout"], "hello\n");
        assert_eq!(outcome.payload["exitCode"], 0);
    }

    #[tokio::test]
    async fn nonzero_exit_surfaces_as_a_tool_error_carrying_stderr() {
        let adapter = LocalExecutionAdapter::new(".");
        let permissions = PermissionManager::new(PermissionMode::Danger, Box::new(AlwaysDeny), true);
        let limits = crate::config::RuntimeLimits::default();
        let read_set = HashSet::new();
        let ctx = ToolContext {
            adapter: &adapter,
            permissions: &permissions,
            limits: &limits,
            read_set: &read_set,
        };

        let tool = ShellTool::new();
        let result = tool
            .run(&ctx, json!({"command": "sh -c 'echo oops 1>&2; exit 3'"}))
            .await;
        let err = result.unwrap_err();
        assert!(matches!(err, ToolError::Runtime { .. }));
        assert!(err.to_string().contains("oops"));
        assert!(err.to_string().contains('3'));
    }
}
