//! `think` and `scratchpad` (spec.md §4.3): no-adapter tools that give
//! the model a place to reason or stash working notes without touching
//! the filesystem or process table. Neither ever prompts for permission
//! ([`crate::tools::ToolCategory::Meta`]).

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::ToolError;
use crate::tools::descriptor::{ToolCategory, ToolDescriptor};
use crate::tools::tool_trait::{Tool, ToolContext, ToolOutcome};

pub struct ThinkTool {
    descriptor: ToolDescriptor,
}

impl ThinkTool {
    pub fn new() -> Self {
        let descriptor = ToolDescriptor::new(
            "think",
            "think",
            "Record a reasoning step without taking any action. The thought is echoed back \
             so it appears in the transcript, but nothing else happens.",
            json!({
                "type": "object",
                "properties": {"thought": {"type": "string"}},
                "required": ["thought"],
            }),
            vec!["thought".to_owned()],
            ToolCategory::Meta,
        );
        Self { descriptor }
    }
}

impl Default for ThinkTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ThinkTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn run(&self, _ctx: &ToolContext<'_>, args: Value) -> Result<ToolOutcome, ToolError> {
        let thought = args
            .get("thought")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::MissingParameter {
                name: "thought".to_owned(),
            })?;
        Ok(ToolOutcome::payload(json!({ "thought": thought })))
    }
}

/// In-memory keyed text store, scoped to one [`ScratchpadTool`] instance
/// (so, in practice, one session — a host constructs a fresh registry per
/// session, and the map dies with it). Spec.md §4.3 names nine actions:
/// `create`, `write`, `append`, `read`, `list`, `delete`, `clear`,
/// `replace`, `search`.
pub struct ScratchpadTool {
    descriptor: ToolDescriptor,
    entries: Mutex<HashMap<String, String>>,
}

impl ScratchpadTool {
    pub fn new() -> Self {
        let descriptor = ToolDescriptor::new(
            "scratchpad",
            "scratchpad",
            "Read from or write to a session-scoped keyed scratch store. Actions: \"create\", \
             \"write\", \"append\", \"read\", \"list\", \"delete\", \"clear\", \"replace\", \
             \"search\".",
            json!({
                "type": "object",
                "properties": {
                    "action": {
                        "type": "string",
                        "enum": [
                            "create", "write", "append", "read", "list", "delete", "clear",
                            "replace", "search",
                        ],
                    },
                    "key": {"type": "string"},
                    "content": {"type": "string"},
                    "search": {"type": "string"},
                    "replacement": {"type": "string"},
                },
                "required": ["action"],
            }),
            vec!["action".to_owned()],
            ToolCategory::Meta,
        );
        Self {
            descriptor,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn require_key<'a>(args: &'a Value) -> Result<&'a str, ToolError> {
        args.get("key")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::MissingParameter {
                name: "key".to_owned(),
            })
    }
}

impl Default for ScratchpadTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Tool for ScratchpadTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn run(&self, _ctx: &ToolContext<'_>, args: Value) -> Result<ToolOutcome, ToolError> {
        let action = args
            .get("action")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::MissingParameter {
                name: "action".to_owned(),
            })?;

        let mut entries = self.entries.lock().unwrap();
        match action {
            "create" => {
                let key = Self::require_key(&args)?;
                if entries.contains_key(key) {
                    return Err(ToolError::Runtime {
                        message: format!("scratchpad key '{key}' already exists"),
                    });
                }
                let content = args.get("content").and_then(Value::as_str).unwrap_or("").to_owned();
                entries.insert(key.to_owned(), content);
                Ok(ToolOutcome::payload(json!({ "key": key })))
            }
            "write" => {
                let key = Self::require_key(&args)?.to_owned();
                let content = args.get("content").and_then(Value::as_str).unwrap_or("").to_owned();
                entries.insert(key.clone(), content.clone());
                Ok(ToolOutcome::payload(json!({ "key": key, "content": content })))
            }
            "append" => {
                let key = Self::require_key(&args)?.to_owned();
                let addition = args.get("content").and_then(Value::as_str).unwrap_or("");
                let entry = entries.entry(key.clone()).or_default();
                entry.push_str(addition);
                Ok(ToolOutcome::payload(json!({ "key": key, "content": entry.clone() })))
            }
            "read" => {
                let key = Self::require_key(&args)?;
                let content = entries.get(key).cloned().ok_or_else(|| ToolError::Runtime {
                    message: format!("scratchpad key '{key}' not found"),
                })?;
                Ok(ToolOutcome::payload(json!({ "key": key, "content": content })))
            }
            "list" => {
                let mut keys: Vec<&String> = entries.keys().collect();
                keys.sort();
                Ok(ToolOutcome::payload(json!({ "keys": keys })))
            }
            "delete" => {
                let key = Self::require_key(&args)?;
                entries.remove(key);
                Ok(ToolOutcome::payload(json!({ "key": key })))
            }
            "clear" => {
                entries.clear();
                Ok(ToolOutcome::payload(json!({})))
            }
            "replace" => {
                let key = Self::require_key(&args)?.to_owned();
                let search = args
                    .get("search")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ToolError::MissingParameter {
                        name: "search".to_owned(),
                    })?;
                let replacement = args.get("replacement").and_then(Value::as_str).unwrap_or("");
                let content = entries.get(&key).cloned().ok_or_else(|| ToolError::Runtime {
                    message: format!("scratchpad key '{key}' not found"),
                })?;
                let occurrences = content.matches(search).count();
                if occurrences != 1 {
                    return Err(ToolError::Runtime {
                        message: format!(
                            "'{search}' must match exactly once in '{key}', found {occurrences}"
                        ),
                    });
                }
                let new_content = content.replacen(search, replacement, 1);
                entries.insert(key.clone(), new_content.clone());
                Ok(ToolOutcome::payload(json!({ "key": key, "content": new_content })))
            }
            "search" => {
                let term = args
                    .get("search")
                    .and_then(Value::as_str)
                    .ok_or_else(|| ToolError::MissingParameter {
                        name: "search".to_owned(),
                    })?;
                let mut matches: Vec<&String> = entries
                    .iter()
                    .filter(|(_, content)| content.contains(term))
                    .map(|(key, _)| key)
                    .collect();
                matches.sort();
                Ok(ToolOutcome::payload(json!({ "keys": matches })))
            }
            other => Err(ToolError::Runtime {
                message: format!("unknown scratchpad action: {other}"),
            }),
        }
    }
}
