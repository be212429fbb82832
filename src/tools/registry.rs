//! Tool lookup, schema export, and the validate→permission→execute
//! dispatch wrapper (spec.md §4.2, §4.3), plus structured tracing hooks
//! fired around each dispatch (SPEC_FULL.md §B.2, modeled on the
//! teacher's `exec::events::ThreadEvent` structured-event shapes).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing::{error, info};

use super::descriptor::ToolDescriptor;
use super::tool_trait::{Tool, ToolContext, ToolOutcome};
use crate::error::ToolError;

type StartHook = Box<dyn Fn(&str, &Value) + Send + Sync>;
type CompleteHook = Box<dyn Fn(&str, &ToolOutcome) + Send + Sync>;
type ErrorHook = Box<dyn Fn(&str, &ToolError) + Send + Sync>;

/// Handle returned by `on_tool_*`; drop it or call [`Unsubscribe::remove`]
/// to stop receiving that event. Holds its own `Arc` to the hook table,
/// so it stays valid independent of where the owning [`ToolRegistry`]
/// itself lives or moves.
pub struct Unsubscribe {
    id: u64,
    hooks: Arc<Mutex<Hooks>>,
    remove: fn(&mut Hooks, u64),
}

impl Unsubscribe {
    pub fn remove(self) {
        let mut guard = self.hooks.lock().unwrap();
        (self.remove)(&mut guard, self.id);
    }
}

#[derive(Default)]
struct Hooks {
    start: HashMap<u64, StartHook>,
    complete: HashMap<u64, CompleteHook>,
    error: HashMap<u64, ErrorHook>,
}

/// Insertion-ordered collection of tools, consulted by the agent loop for
/// schema export and dispatch (spec.md §4.2).
pub struct ToolRegistry {
    order: Vec<String>,
    tools: HashMap<String, Box<dyn Tool>>,
    hooks: Arc<Mutex<Hooks>>,
    next_hook_id: AtomicU64,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            order: Vec::new(),
            tools: HashMap::new(),
            hooks: Arc::new(Mutex::new(Hooks::default())),
            next_hook_id: AtomicU64::new(0),
        }
    }

    /// Register `tool` under its descriptor id (spec.md §4.2: "rejects
    /// duplicate id, rejects missing id").
    pub fn register(&mut self, tool: Box<dyn Tool>) -> Result<(), ToolError> {
        let id = tool.descriptor().id.clone();
        if id.is_empty() {
            return Err(ToolError::Runtime {
                message: "tool id must not be empty".to_owned(),
            });
        }
        if self.tools.contains_key(&id) {
            return Err(ToolError::Runtime {
                message: format!("a tool is already registered under id '{id}'"),
            });
        }
        self.order.push(id.clone());
        self.tools.insert(id, tool);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&dyn Tool> {
        self.tools.get(id).map(|tool| tool.as_ref())
    }

    /// Look a tool up by its descriptor `name`, falling back to `id` if no
    /// tool carries that name (spec.md §4.3: Batch's "lookup is by tool
    /// name, falling back to id").
    pub fn resolve(&self, name_or_id: &str) -> Option<&dyn Tool> {
        self.get_all()
            .into_iter()
            .find(|tool| tool.descriptor().name == name_or_id)
            .or_else(|| self.get(name_or_id))
    }

    /// All registered tools, in registration order.
    pub fn get_all(&self) -> Vec<&dyn Tool> {
        self.order
            .iter()
            .filter_map(|id| self.tools.get(id))
            .map(|tool| tool.as_ref())
            .collect()
    }

    /// The schema export handed to the Model Client (spec.md §4.2, §6).
    pub fn describe(&self) -> Vec<ToolDescriptor> {
        self.get_all()
            .into_iter()
            .map(|tool| tool.descriptor().clone())
            .collect()
    }

    fn next_id(&self) -> u64 {
        self.next_hook_id.fetch_add(1, Ordering::SeqCst)
    }

    pub fn on_tool_start(&self, hook: impl Fn(&str, &Value) + Send + Sync + 'static) -> Unsubscribe {
        let id = self.next_id();
        self.hooks.lock().unwrap().start.insert(id, Box::new(hook));
        Unsubscribe {
            id,
            hooks: self.hooks.clone(),
            remove: |hooks, id| {
                hooks.start.remove(&id);
            },
        }
    }

    pub fn on_tool_complete(
        &self,
        hook: impl Fn(&str, &ToolOutcome) + Send + Sync + 'static,
    ) -> Unsubscribe {
        let id = self.next_id();
        self.hooks.lock().unwrap().complete.insert(id, Box::new(hook));
        Unsubscribe {
            id,
            hooks: self.hooks.clone(),
            remove: |hooks, id| {
                hooks.complete.remove(&id);
            },
        }
    }

    pub fn on_tool_error(&self, hook: impl Fn(&str, &ToolError) + Send + Sync + 'static) -> Unsubscribe {
        let id = self.next_id();
        self.hooks.lock().unwrap().error.insert(id, Box::new(hook));
        Unsubscribe {
            id,
            hooks: self.hooks.clone(),
            remove: |hooks, id| {
                hooks.error.remove(&id);
            },
        }
    }

    /// Validate required parameters, gate on the Permission Manager, then
    /// execute — firing start/complete/error hooks around the call
    /// (spec.md §4.3).
    pub async fn dispatch(
        &self,
        tool_id: &str,
        args: Value,
        ctx: &ToolContext<'_>,
    ) -> Result<ToolOutcome, ToolError> {
        let Some(tool) = self.get(tool_id) else {
            let err = ToolError::UnknownTool {
                name: tool_id.to_owned(),
            };
            self.fire_error(tool_id, &err);
            return Err(err);
        };

        let descriptor = tool.descriptor();
        self.fire_start(tool_id, &args);

        if let Some(missing) = descriptor.missing_parameters(&args).into_iter().next() {
            let err = ToolError::MissingParameter { name: missing };
            self.fire_error(tool_id, &err);
            return Err(err);
        }

        if let Some((name, expected)) = descriptor.type_errors(&args).into_iter().next() {
            let err = ToolError::WrongParameterType { name, expected };
            self.fire_error(tool_id, &err);
            return Err(err);
        }

        if let Err(permission_err) = ctx
            .permissions
            .check(
                &descriptor.id,
                &args,
                descriptor.requires_permission,
                descriptor.always_require_permission,
            )
            .await
        {
            let err = ToolError::from(permission_err);
            self.fire_error(tool_id, &err);
            return Err(err);
        }

        match tool.run(ctx, args).await {
            Ok(outcome) => {
                info!(tool_id, "tool dispatch completed");
                self.fire_complete(tool_id, &outcome);
                Ok(outcome)
            }
            Err(err) => {
                error!(tool_id, error = %err, "tool dispatch failed");
                self.fire_error(tool_id, &err);
                Err(err)
            }
        }
    }

    fn fire_start(&self, tool_id: &str, args: &Value) {
        for hook in self.hooks.lock().unwrap().start.values() {
            hook(tool_id, args);
        }
    }

    fn fire_complete(&self, tool_id: &str, outcome: &ToolOutcome) {
        for hook in self.hooks.lock().unwrap().complete.values() {
            hook(tool_id, outcome);
        }
    }

    fn fire_error(&self, tool_id: &str, err: &ToolError) {
        for hook in self.hooks.lock().unwrap().error.values() {
            hook(tool_id, err);
        }
    }
}
