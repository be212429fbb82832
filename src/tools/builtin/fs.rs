//! File-oriented tools (spec.md §4.3): `ls`, `fileRead`, `fileEdit`,
//! `fileWrite`. Each is a thin validate-then-delegate wrapper over the
//! matching [`crate::exec::ExecutionAdapter`] method; grounded on the
//! teacher's `tools::file_ops` read/write/edit semantics.

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::ToolError;
use crate::exec::ReadOptions;
use crate::tools::descriptor::{ToolCategory, ToolDescriptor};
use crate::tools::tool_trait::{Tool, ToolContext, ToolOutcome};

pub struct LsTool {
    descriptor: ToolDescriptor,
}

impl LsTool {
    pub fn new() -> Self {
        let descriptor = ToolDescriptor::new(
            "ls",
            "ls",
            "List a directory's entries, relative to the project root.",
            json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string"},
                    "showHidden": {"type": "boolean"},
                    "details": {"type": "boolean"},
                },
                "required": ["path"],
            }),
            vec!["path".to_owned()],
            ToolCategory::ReadOnly,
        );
        Self { descriptor }
    }
}

impl Default for LsTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for LsTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn run(&self, ctx: &ToolContext<'_>, args: Value) -> Result<ToolOutcome, ToolError> {
        let path = args
            .get("path")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::MissingParameter {
                name: "path".to_owned(),
            })?;
        let show_hidden = args.get("showHidden").and_then(Value::as_bool).unwrap_or(false);
        let details = args.get("details").and_then(Value::as_bool).unwrap_or(false);

        let entries = ctx.adapter.ls(path, show_hidden, details).await?;
        Ok(ToolOutcome::payload(json!({ "entries": entries })))
    }
}

pub struct FileReadTool {
    descriptor: ToolDescriptor,
}

impl FileReadTool {
    pub fn new() -> Self {
        let descriptor = ToolDescriptor::new(
            "fileRead",
            "fileRead",
            "Read a file's contents, relative to the project root. Large files are \
             paginated by line; pass lineOffset/lineCount to page through them.",
            json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string"},
                    "maxSize": {"type": "integer"},
                    "lineOffset": {"type": "integer"},
                    "lineCount": {"type": "integer"},
                },
                "required": ["path"],
            }),
            vec!["path".to_owned()],
            ToolCategory::ReadOnly,
        );
        Self { descriptor }
    }
}

impl Default for FileReadTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for FileReadTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn run(&self, ctx: &ToolContext<'_>, args: Value) -> Result<ToolOutcome, ToolError> {
        let path = args
            .get("path")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::MissingParameter {
                name: "path".to_owned(),
            })?;
        let opts = ReadOptions {
            max_size: args.get("maxSize").and_then(Value::as_u64).map(|n| n as usize),
            line_offset: args.get("lineOffset").and_then(Value::as_u64).map(|n| n as usize),
            line_count: args.get("lineCount").and_then(Value::as_u64).map(|n| n as usize),
        };

        let result = ctx.adapter.read_file(path, opts, ctx.limits).await?;
        let payload = json!({
            "content": result.content,
            "pagination": result.pagination,
        });
        Ok(ToolOutcome::payload(payload).with_read_path(path))
    }
}

pub struct FileEditTool {
    descriptor: ToolDescriptor,
}

impl FileEditTool {
    pub fn new() -> Self {
        let descriptor = ToolDescriptor::new(
            "fileEdit",
            "fileEdit",
            "Replace a unique occurrence of searchCode with replaceCode in a file. Fails if \
             the file has not been read yet this session, or if searchCode is not found or \
             matches more than once.",
            json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string"},
                    "searchCode": {"type": "string"},
                    "replaceCode": {"type": "string"},
                },
                "required": ["path", "searchCode", "replaceCode"],
            }),
            vec![
                "path".to_owned(),
                "searchCode".to_owned(),
                "replaceCode".to_owned(),
            ],
            ToolCategory::FileWrite,
        );
        Self { descriptor }
    }
}

impl Default for FileEditTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for FileEditTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn run(&self, ctx: &ToolContext<'_>, args: Value) -> Result<ToolOutcome, ToolError> {
        let path = args
            .get("path")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::MissingParameter {
                name: "path".to_owned(),
            })?;
        let search_code = args
            .get("searchCode")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::MissingParameter {
                name: "searchCode".to_owned(),
            })?;
        let replace_code = args
            .get("replaceCode")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::MissingParameter {
                name: "replaceCode".to_owned(),
            })?;

        // spec.md §3(ii): a path may not be edited unless it is already in
        // the context window's read-set.
        if !ctx.read_set.contains(std::path::Path::new(path)) {
            return Err(ToolError::Runtime {
                message: format!("'{path}' must be read before it can be edited"),
            });
        }

        let result = ctx.adapter.edit_file(path, search_code, replace_code).await?;
        Ok(ToolOutcome::payload(json!({
            "originalContent": result.original_content,
            "newContent": result.new_content,
        })))
    }
}

pub struct FileWriteTool {
    descriptor: ToolDescriptor,
}

impl FileWriteTool {
    pub fn new() -> Self {
        let descriptor = ToolDescriptor::new(
            "fileWrite",
            "fileWrite",
            "Write a file's full contents, relative to the project root. Fails if the file \
             already exists unless overwrite=true; creates missing parent directories unless \
             createDir=false.",
            json!({
                "type": "object",
                "properties": {
                    "path": {"type": "string"},
                    "content": {"type": "string"},
                    "encoding": {"type": "string"},
                    "overwrite": {"type": "boolean"},
                    "createDir": {"type": "boolean"},
                },
                "required": ["path", "content"],
            }),
            vec!["path".to_owned(), "content".to_owned()],
            ToolCategory::FileWrite,
        );
        Self { descriptor }
    }
}

impl Default for FileWriteTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for FileWriteTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn run(&self, ctx: &ToolContext<'_>, args: Value) -> Result<ToolOutcome, ToolError> {
        let path = args
            .get("path")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::MissingParameter {
                name: "path".to_owned(),
            })?;
        let content = args
            .get("content")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::MissingParameter {
                name: "content".to_owned(),
            })?;
        let overwrite = args.get("overwrite").and_then(Value::as_bool).unwrap_or(false);
        let create_dir = args.get("createDir").and_then(Value::as_bool).unwrap_or(true);

        // spec.md §4.1/§4.3: overwrite safety is the tool's job, not the
        // adapter's — `write_file` itself always truncates.
        if !overwrite && ctx.adapter.path_exists(path).await? {
            return Err(ToolError::Adapter(crate::error::AdapterError::AlreadyExists {
                path: std::path::PathBuf::from(path),
            }));
        }

        if !create_dir {
            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() && !ctx.adapter.path_exists(&parent.to_string_lossy()).await? {
                    return Err(ToolError::Runtime {
                        message: format!("parent directory for '{path}' does not exist and createDir=false"),
                    });
                }
            }
        }

        ctx.adapter.write_file(path, content).await?;
        Ok(ToolOutcome::payload(json!({ "path": path })))
    }
}
