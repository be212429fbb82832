//! Session configuration: default model, permission mode, allowed-tool
//! allowlist, and caching flag (spec.md §3 `SessionState`), plus the
//! runtime limits (round cap, adapter size ceilings) spec.md hardcodes as
//! constants but which a real host wants to tune.

use serde::{Deserialize, Serialize};

/// Session-wide policy determining which gated tools prompt the user
/// (spec.md §4.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionMode {
    /// Every gated invocation consults the UI handler.
    #[default]
    Interactive,
    /// File-operation tools whose `alwaysRequirePermission` is false bypass
    /// prompting; all other gated tools still prompt.
    FastEdit,
    /// All gated tools bypass prompting (non-interactive evaluation).
    Danger,
}

/// Per-session configuration record (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Default model identifier passed to the provider; the provider
    /// decides what this means.
    #[serde(default = "default_model")]
    pub default_model: String,

    #[serde(default)]
    pub permission_mode: PermissionMode,

    /// When non-empty, only tools named here may be dispatched; an empty
    /// list means all registered tools are reachable.
    #[serde(default)]
    pub allowed_tools: Vec<String>,

    /// Whether the Permission Manager should remember a grant for an
    /// identical `(tool_id, args)` pair for the rest of the session
    /// (SPEC_FULL.md §B.1).
    #[serde(default = "default_true")]
    pub cache_permission_grants: bool,

    #[serde(default)]
    pub limits: RuntimeLimits,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_model: default_model(),
            permission_mode: PermissionMode::default(),
            allowed_tools: Vec::new(),
            cache_permission_grants: default_true(),
            limits: RuntimeLimits::default(),
        }
    }
}

impl SessionConfig {
    /// Whether `tool_name` may be dispatched under this session's
    /// allowlist. An empty allowlist permits everything.
    pub fn tool_allowed(&self, tool_name: &str) -> bool {
        self.allowed_tools.is_empty()
            || self
                .allowed_tools
                .iter()
                .any(|allowed| allowed == tool_name)
    }
}

/// Adapter size ceilings and loop bounds (spec.md §4.1, §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeLimits {
    /// Hard ceiling on `readFile`'s effective `maxSize`, in bytes.
    #[serde(default = "default_max_read_bytes")]
    pub max_read_bytes: usize,

    /// Hard ceiling on `readFile`'s effective `lineCount`.
    #[serde(default = "default_max_read_lines")]
    pub max_read_lines: usize,

    /// Hard cap on `glob`/`grep` match counts.
    #[serde(default = "default_max_matches")]
    pub max_matches: usize,

    /// Safety limit on agent-loop rounds (spec.md §4.6).
    #[serde(default = "default_max_rounds")]
    pub max_rounds: u32,
}

impl Default for RuntimeLimits {
    fn default() -> Self {
        Self {
            max_read_bytes: default_max_read_bytes(),
            max_read_lines: default_max_read_lines(),
            max_matches: default_max_matches(),
            max_rounds: default_max_rounds(),
        }
    }
}

#[inline]
const fn default_true() -> bool {
    true
}

fn default_model() -> String {
    "default".to_owned()
}

const fn default_max_read_bytes() -> usize {
    524_288
}

const fn default_max_read_lines() -> usize {
    1000
}

const fn default_max_matches() -> usize {
    100
}

const fn default_max_rounds() -> u32 {
    64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits_match_spec_ceilings() {
        let limits = RuntimeLimits::default();
        assert_eq!(limits.max_read_bytes, 524_288);
        assert_eq!(limits.max_read_lines, 1000);
        assert_eq!(limits.max_matches, 100);
        assert_eq!(limits.max_rounds, 64);
    }

    #[test]
    fn empty_allowlist_permits_everything() {
        let config = SessionConfig::default();
        assert!(config.tool_allowed("bash"));
        assert!(config.tool_allowed("anything"));
    }

    #[test]
    fn nonempty_allowlist_restricts() {
        let mut config = SessionConfig::default();
        config.allowed_tools = vec!["grep".to_owned()];
        assert!(config.tool_allowed("grep"));
        assert!(!config.tool_allowed("bash"));
    }
}
