//! Crate-wide error taxonomy.
//!
//! Every fallible boundary in this crate returns one of these enums rather
//! than panicking. Tool-level errors (`ToolError`, `AdapterError`,
//! `PermissionError`) are surfaced to the model as `ToolResult { is_error:
//! true }` and never abort the agent loop. Only `RunnerError` terminates
//! `AgentRunner::process_query`.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from an [`crate::exec::ExecutionAdapter`] method.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdapterError {
    #[error("path outside project directory: {path}")]
    PathOutsideProject { path: PathBuf },

    #[error("file too large: {path} exceeds {limit} bytes")]
    TooLarge { path: PathBuf, limit: usize },

    #[error("'{search}' not found in {path}")]
    NotFound { path: PathBuf, search: String },

    #[error("ambiguous match: '{search}' occurs {count} times in {path}, supply more context")]
    Ambiguous {
        path: PathBuf,
        search: String,
        count: usize,
    },

    #[error("{path} already exists (set overwrite=true to replace it)")]
    AlreadyExists { path: PathBuf },

    #[error("backend unavailable: {reason}")]
    BackendUnavailable { reason: String },

    #[error("io error on {path}: {message}")]
    Io { path: PathBuf, message: String },
}

impl AdapterError {
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            AdapterError::PathOutsideProject { path }
            | AdapterError::TooLarge { path, .. }
            | AdapterError::NotFound { path, .. }
            | AdapterError::Ambiguous { path, .. }
            | AdapterError::AlreadyExists { path }
            | AdapterError::Io { path, .. } => Some(path),
            AdapterError::BackendUnavailable { .. } => None,
        }
    }
}

/// Errors from tool validation or dispatch, prior to adapter/permission
/// involvement.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("unknown tool: {name}")]
    UnknownTool { name: String },

    #[error("missing required parameter: {name}")]
    MissingParameter { name: String },

    #[error("parameter '{name}' has wrong type: expected {expected}")]
    WrongParameterType { name: String, expected: String },

    #[error("{0}")]
    Adapter(#[from] AdapterError),

    #[error("{0}")]
    Permission(#[from] PermissionError),

    #[error("{message}")]
    Runtime { message: String },
}

/// Errors from the [`crate::permissions::PermissionManager`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PermissionError {
    #[error("permission denied for tool '{tool_id}'")]
    Denied { tool_id: String },

    #[error("permission request for '{tool_id}' cancelled")]
    Cancelled { tool_id: String },
}

/// Errors from a [`crate::model::ModelProvider`] call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("network error: {message}")]
    Network { message: String },

    #[error("provider returned an error: {message}")]
    Provider { message: String },

    #[error("invalid request: {message}")]
    InvalidRequest { message: String },
}

impl ProviderError {
    /// Whether this error is worth a single retry (§4.6/§7: transient
    /// network failures get one retry with backoff; everything else
    /// terminates the loop immediately).
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::Network { .. })
    }
}

/// Loop-level outcomes that terminate [`crate::agent::AgentRunner::process_query`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RunnerError {
    #[error("provider unreachable: {0}")]
    ProviderUnreachable(#[from] ProviderError),

    #[error("round limit ({limit}) exceeded")]
    RoundLimit { limit: u32 },

    #[error("cancelled")]
    Cancelled,
}
