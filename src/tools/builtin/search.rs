//! The `glob` and `grep` tools (spec.md §4.3). `glob` delegates straight
//! to the adapter; `grep` walks the project tree directly since no
//! adapter operation covers pattern search across files — grounded on
//! the teacher's `tools::bash_tool::execute_grep`, reimplemented over
//! `regex`/`walkdir` instead of shelling out to the system `grep`.

use async_trait::async_trait;
use regex::RegexBuilder;
use serde_json::{json, Value};
use walkdir::WalkDir;

use crate::error::{AdapterError, ToolError};
use crate::exec::GlobOptions;
use crate::tools::descriptor::{ToolCategory, ToolDescriptor};
use crate::tools::tool_trait::{Tool, ToolContext, ToolOutcome};

pub struct GlobTool {
    descriptor: ToolDescriptor,
}

impl GlobTool {
    pub fn new() -> Self {
        let descriptor = ToolDescriptor::new(
            "glob",
            "glob",
            "Find files matching a glob pattern, relative to the project root. Results are \
             sorted and capped at the session's match limit.",
            json!({
                "type": "object",
                "properties": {
                    "pattern": {"type": "string"},
                    "cwd": {"type": "string", "description": "directory to resolve the pattern from"},
                    "includeDotfiles": {"type": "boolean"},
                    "maxResults": {"type": "integer", "description": "caps the match count, still bounded by the session limit"},
                },
                "required": ["pattern"],
            }),
            vec!["pattern".to_owned()],
            ToolCategory::ReadOnly,
        );
        Self { descriptor }
    }
}

impl Default for GlobTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for GlobTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn run(&self, ctx: &ToolContext<'_>, args: Value) -> Result<ToolOutcome, ToolError> {
        let pattern = args
            .get("pattern")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::MissingParameter {
                name: "pattern".to_owned(),
            })?;
        let opts = GlobOptions {
            cwd: args.get("cwd").and_then(Value::as_str).map(str::to_owned),
            include_dotfiles: args
                .get("includeDotfiles")
                .and_then(Value::as_bool)
                .unwrap_or(false),
        };

        let mut matches = ctx.adapter.glob(pattern, opts, ctx.limits).await?;
        // `ctx.limits.max_matches` is the hard session ceiling; `maxResults`
        // may only narrow it further, never widen it (spec.md §4.3).
        let cap = args
            .get("maxResults")
            .and_then(Value::as_u64)
            .map(|n| n as usize)
            .map_or(ctx.limits.max_matches, |n| n.min(ctx.limits.max_matches));
        let has_more = matches.len() > cap;
        matches.truncate(cap);
        let count = matches.len();

        Ok(ToolOutcome::payload(json!({
            "matches": matches,
            "count": count,
            "hasMore": has_more,
        })))
    }
}

pub struct GrepTool {
    descriptor: ToolDescriptor,
}

impl GrepTool {
    pub fn new() -> Self {
        let descriptor = ToolDescriptor::new(
            "grep",
            "grep",
            "Search file contents under a directory for lines matching a regular expression.",
            json!({
                "type": "object",
                "properties": {
                    "pattern": {"type": "string"},
                    "path": {"type": "string", "description": "directory to search, relative to the project root"},
                    "recursive": {"type": "boolean", "description": "descend into subdirectories; default true"},
                    "ignoreCase": {"type": "boolean"},
                    "filePattern": {"type": "string", "description": "glob filtering which file names are searched, e.g. \"*.rs\""},
                    "maxResults": {"type": "integer", "description": "caps the row count; defaults to 100"},
                },
                "required": ["pattern"],
            }),
            vec!["pattern".to_owned()],
            ToolCategory::ReadOnly,
        );
        Self { descriptor }
    }
}

impl Default for GrepTool {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(serde::Serialize)]
struct GrepMatch {
    file: String,
    line: usize,
    content: String,
}

const DEFAULT_MAX_GREP_RESULTS: usize = 100;

#[async_trait]
impl Tool for GrepTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn run(&self, ctx: &ToolContext<'_>, args: Value) -> Result<ToolOutcome, ToolError> {
        let pattern = args
            .get("pattern")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::MissingParameter {
                name: "pattern".to_owned(),
            })?;
        let search_root = args.get("path").and_then(Value::as_str).unwrap_or(".");
        let recursive = args.get("recursive").and_then(Value::as_bool).unwrap_or(true);
        let ignore_case = args.get("ignoreCase").and_then(Value::as_bool).unwrap_or(false);
        let file_pattern = args
            .get("filePattern")
            .and_then(Value::as_str)
            .map(glob::Pattern::new)
            .transpose()
            .map_err(|err| ToolError::Runtime {
                message: format!("invalid filePattern: {err}"),
            })?;
        let cap = args
            .get("maxResults")
            .and_then(Value::as_u64)
            .map(|n| n as usize)
            .unwrap_or(DEFAULT_MAX_GREP_RESULTS)
            .min(ctx.limits.max_matches);

        let regex = RegexBuilder::new(pattern)
            .case_insensitive(ignore_case)
            .build()
            .map_err(|err| ToolError::Runtime {
                message: format!("invalid pattern: {err}"),
            })?;

        // `grep` has no adapter operation of its own (spec.md §4.1 names
        // six, not seven); it reads files itself, one `readFile` call per
        // matching entry's adapter-relative path rather than walking the
        // adapter-local filesystem directly, so a container/remote
        // adapter is still respected.
        let glob_pattern = if recursive {
            format!("{search_root}/**/*")
        } else {
            format!("{search_root}/*")
        };
        let listing = ctx.adapter.glob(&glob_pattern, Default::default(), ctx.limits).await?;

        let mut matches = Vec::new();
        let mut has_more = false;
        for candidate in listing {
            if let Some(file_pattern) = &file_pattern {
                let name = std::path::Path::new(&candidate)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                if !file_pattern.matches(&name) {
                    continue;
                }
            }
            let read = ctx
                .adapter
                .read_file(&candidate, Default::default(), ctx.limits)
                .await;
            let Ok(read) = read else { continue };
            for (index, line) in read.content.lines().enumerate() {
                if !regex.is_match(line) {
                    continue;
                }
                if matches.len() >= cap {
                    has_more = true;
                    break;
                }
                matches.push(GrepMatch {
                    file: candidate.clone(),
                    line: index + 1,
                    content: line.to_owned(),
                });
            }
            if has_more {
                break;
            }
        }

        let count = matches.len();
        Ok(ToolOutcome::payload(json!({
            "matches": matches,
            "count": count,
            "hasMore": has_more,
        })))
    }
}

/// Recursive directory walk used when an adapter is backed directly by
/// the local filesystem and a plain directory tree (rather than a glob
/// pattern) is the natural iteration unit. Kept as a free function so
/// future adapter-native implementations of `grep` can reuse it without
/// going through `glob`.
#[allow(dead_code)]
fn walk_text_files(root: &std::path::Path) -> Result<Vec<std::path::PathBuf>, AdapterError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root).into_iter().filter_map(Result::ok) {
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PermissionMode, RuntimeLimits};
    use crate::exec::LocalExecutionAdapter;
    use crate::permissions::{AlwaysDeny, PermissionManager};
    use std::collections::HashSet;

    #[tokio::test]
    async fn grep_finds_matching_lines() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "alpha\nbeta\ngamma\n").unwrap();

        let adapter = LocalExecutionAdapter::new(dir.path());
        let permissions = PermissionManager::new(PermissionMode::Danger, Box::new(AlwaysDeny), true);
        let limits = RuntimeLimits::default();
        let read_set = HashSet::new();
        let ctx = ToolContext {
            adapter: &adapter,
            permissions: &permissions,
            limits: &limits,
            read_set: &read_set,
        };

        let tool = GrepTool::new();
        let outcome = tool.run(&ctx, json!({"pattern": "beta"})).await.unwrap();
        let matches = outcome.payload["matches"].as_array().unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0]["content"], "beta");
        assert_eq!(outcome.payload["count"], 1);
        assert_eq!(outcome.payload["hasMore"], false);
    }

    #[tokio::test]
    async fn grep_ignore_case_matches_regardless_of_casing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "Alpha\n").unwrap();

        let adapter = LocalExecutionAdapter::new(dir.path());
        let permissions = PermissionManager::new(PermissionMode::Danger, Box::new(AlwaysDeny), true);
        let limits = RuntimeLimits::default();
        let read_set = HashSet::new();
        let ctx = ToolContext {
            adapter: &adapter,
            permissions: &permissions,
            limits: &limits,
            read_set: &read_set,
        };

        let tool = GrepTool::new();
        let outcome = tool
            .run(&ctx, json!({"pattern": "alpha", "ignoreCase": true}))
            .await
            .unwrap();
        assert_eq!(outcome.payload["matches"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn grep_file_pattern_filters_which_files_are_searched() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.rs"), "needle\n").unwrap();
        std::fs::write(dir.path().join("b.txt"), "needle\n").unwrap();

        let adapter = LocalExecutionAdapter::new(dir.path());
        let permissions = PermissionManager::new(PermissionMode::Danger, Box::new(AlwaysDeny), true);
        let limits = RuntimeLimits::default();
        let read_set = HashSet::new();
        let ctx = ToolContext {
            adapter: &adapter,
            permissions: &permissions,
            limits: &limits,
            read_set: &read_set,
        };

        let tool = GrepTool::new();
        let outcome = tool
            .run(&ctx, json!({"pattern": "needle", "filePattern": "*.rs"}))
            .await
            .unwrap();
        let matches = outcome.payload["matches"].as_array().unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0]["file"], "a.rs");
    }

    #[tokio::test]
    async fn grep_max_results_caps_rows_and_reports_has_more() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.txt"), "needle\nneedle\nneedle\n").unwrap();

        let adapter = LocalExecutionAdapter::new(dir.path());
        let permissions = PermissionManager::new(PermissionMode::Danger, Box::new(AlwaysDeny), true);
        let limits = RuntimeLimits::default();
        let read_set = HashSet::new();
        let ctx = ToolContext {
            adapter: &adapter,
            permissions: &permissions,
            limits: &limits,
            read_set: &read_set,
        };

        let tool = GrepTool::new();
        let outcome = tool
            .run(&ctx, json!({"pattern": "needle", "maxResults": 2}))
            .await
            .unwrap();
        assert_eq!(outcome.payload["matches"].as_array().unwrap().len(), 2);
        assert_eq!(outcome.payload["count"], 2);
        assert_eq!(outcome.payload["hasMore"], true);
    }

    #[tokio::test]
    async fn glob_sorts_and_returns_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.rs"), "").unwrap();
        std::fs::write(dir.path().join("a.rs"), "").unwrap();

        let adapter = LocalExecutionAdapter::new(dir.path());
        let permissions = PermissionManager::new(PermissionMode::Danger, Box::new(AlwaysDeny), true);
        let limits = RuntimeLimits::default();
        let read_set = HashSet::new();
        let ctx = ToolContext {
            adapter: &adapter,
            permissions: &permissions,
            limits: &limits,
            read_set: &read_set,
        };

        let tool = GlobTool::new();
        let outcome = tool.run(&ctx, json!({"pattern": "*.rs"})).await.unwrap();
        let matches = outcome.payload["matches"].as_array().unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(outcome.payload["count"], 2);
        assert_eq!(outcome.payload["hasMore"], false);
    }
}
