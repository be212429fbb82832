//! Tool metadata exported to the model and consulted by the dispatch
//! wrapper (spec.md §4.3).

use serde_json::Value;

/// Broad capability grouping a tool falls into. Drives the Permission
/// Manager's read-only bypass (spec.md §4.4: "read-only tools never
/// prompt, regardless of mode").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolCategory {
    /// Inspects state without mutating it: Glob, Grep, Ls, FileRead.
    ReadOnly,
    /// Mutates the filesystem: FileEdit, FileWrite.
    FileWrite,
    /// Runs an arbitrary subprocess: Shell.
    Shell,
    /// Scratch state with no external effect: Think, Scratchpad.
    Meta,
    /// Fans out to other tools: Batch.
    Composite,
}

impl ToolCategory {
    /// Whether a tool in this category is ever gated by the Permission
    /// Manager (spec.md §4.4). `Meta` tools never touch the adapter and
    /// so never prompt; everything else does, subject to
    /// [`crate::config::PermissionMode`].
    pub fn requires_permission_by_default(self) -> bool {
        !matches!(self, ToolCategory::ReadOnly | ToolCategory::Meta)
    }
}

/// Static description of a tool, exported to the model as part of its
/// JSON-Schema tool list (spec.md §4.3, §6) and consulted by the
/// dispatch wrapper for parameter validation and permission gating.
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    pub id: String,
    pub name: String,
    pub description: String,
    pub parameters_schema: Value,
    pub required_parameters: Vec<String>,
    pub category: ToolCategory,
    /// Overrides [`ToolCategory::requires_permission_by_default`] when a
    /// tool needs non-default gating (e.g. a `Grep` variant that shells
    /// out). Defaults to the category's answer at construction time.
    pub requires_permission: bool,
    /// When true, overrides `PermissionMode::FastEdit`'s bypass: this
    /// tool always prompts outside `Danger` mode (spec.md §4.4).
    pub always_require_permission: bool,
}

impl ToolDescriptor {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        parameters_schema: Value,
        required_parameters: Vec<String>,
        category: ToolCategory,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            parameters_schema,
            required_parameters,
            requires_permission: category.requires_permission_by_default(),
            always_require_permission: false,
            category,
        }
    }

    pub fn always_require_permission(mut self) -> Self {
        self.always_require_permission = true;
        self.requires_permission = true;
        self
    }

    pub fn missing_parameters(&self, args: &Value) -> Vec<String> {
        self.required_parameters
            .iter()
            .filter(|name| args.get(name.as_str()).is_none())
            .cloned()
            .collect()
    }

    /// Type-check every argument present in `args` against the JSON type
    /// its `parameters_schema` property declares (spec.md §4.2: "parameter-
    /// type checking against the declared schema"). Arguments the schema
    /// doesn't mention, and required arguments that are simply absent
    /// (that's [`ToolDescriptor::missing_parameters`]'s job), are not
    /// flagged here. Returns `(name, expected type)` pairs.
    pub fn type_errors(&self, args: &Value) -> Vec<(String, String)> {
        let Some(properties) = self.parameters_schema.get("properties").and_then(Value::as_object) else {
            return Vec::new();
        };
        let Some(args) = args.as_object() else {
            return Vec::new();
        };

        let mut errors = Vec::new();
        for (name, value) in args {
            let Some(expected) = properties.get(name).and_then(|schema| schema.get("type")).and_then(Value::as_str) else {
                continue;
            };
            if !json_type_matches(expected, value) {
                errors.push((name.clone(), expected.to_owned()));
            }
        }
        errors
    }
}

fn json_type_matches(expected: &str, value: &Value) -> bool {
    match expected {
        "string" => value.is_string(),
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "null" => value.is_null(),
        _ => true,
    }
}
