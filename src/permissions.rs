//! The Permission Manager (spec.md §4.4): gates tool dispatch behind the
//! session's [`crate::config::PermissionMode`], serializes concurrent
//! prompts, and caches grants for the rest of the session.
//!
//! Grounded on the teacher's `sandboxing::permissions::SandboxPermissions`
//! (mode enum shape) and `tools::command_cache::PermissionCache`
//! (session-scoped grant cache, minus its TTL — a permission grant here
//! lives for the whole session, spec.md §4.4 "supplemented feature B.1").

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::PermissionMode;
use crate::error::PermissionError;

/// A single outstanding ask put to the UI handler.
#[derive(Debug, Clone)]
pub struct PermissionRequest {
    pub tool_id: String,
    pub args: Value,
}

/// Implemented by a host to surface permission prompts to whatever
/// front-end it runs (spec.md §4.4). Only one request is outstanding at a
/// time per [`PermissionManager`] — concurrent `Batch` fan-out serializes
/// through [`PermissionManager`]'s internal lock rather than through this
/// trait.
#[async_trait]
pub trait PermissionUiHandler: Send + Sync {
    /// Returns `true` to grant, `false` to deny. A handler that cannot
    /// reach the user (disconnected session, closed channel) should
    /// return `false` rather than hang — cancellation is denial
    /// (spec.md §4.4).
    async fn request_permission(&self, request: &PermissionRequest) -> bool;
}

/// A UI handler that denies everything; useful for non-interactive
/// evaluation harnesses that rely solely on [`PermissionMode::Danger`] or
/// an allowlist to reach tools.
pub struct AlwaysDeny;

#[async_trait]
impl PermissionUiHandler for AlwaysDeny {
    async fn request_permission(&self, _request: &PermissionRequest) -> bool {
        false
    }
}

fn cache_key(tool_id: &str, args: &Value) -> String {
    format!("{tool_id}:{args}")
}

/// Gates gated tool invocations behind the session's [`PermissionMode`],
/// de-duplicating identical `(tool_id, args)` asks within the session
/// grant cache. Holds its UI handler as a trait object so it can sit,
/// unparameterized, inside [`crate::tools::ToolContext`].
pub struct PermissionManager {
    mode: RwLock<PermissionMode>,
    handler: Box<dyn PermissionUiHandler>,
    cache_grants: bool,
    grants: Mutex<HashMap<String, bool>>,
}

impl PermissionManager {
    pub fn new(mode: PermissionMode, handler: Box<dyn PermissionUiHandler>, cache_grants: bool) -> Self {
        Self {
            mode: RwLock::new(mode),
            handler,
            cache_grants,
            grants: Mutex::new(HashMap::new()),
        }
    }

    pub fn mode(&self) -> PermissionMode {
        *self.mode.read().unwrap()
    }

    /// Change the session's permission mode. Per spec.md §5, mode changes
    /// are announced through this interface, never set from within a tool.
    pub fn set_mode(&self, mode: PermissionMode) {
        *self.mode.write().unwrap() = mode;
    }

    /// Decide whether a dispatch of `tool_id` with `args` may proceed.
    ///
    /// `requires_permission` and `always_require_permission` come from the
    /// tool's [`crate::tools::ToolDescriptor`] (spec.md §4.3, §4.4):
    /// - a tool with `requires_permission = false` (read-only category)
    ///   never prompts, regardless of mode;
    /// - `always_require_permission = true` overrides
    ///   [`PermissionMode::FastEdit`]'s bypass for that tool.
    ///
    /// A single outstanding prompt at a time: `grants` is a
    /// [`tokio::sync::Mutex`], held across the `.await` of the handler
    /// call itself, so a second concurrent `check()` (e.g. from `Batch`
    /// fan-out) blocks until the first prompt resolves rather than
    /// racing it onto the UI (spec.md §5). A `std::sync::Mutex` could not
    /// do this — holding it across an `.await` point doesn't compile,
    /// since the guard isn't `Send` across the yield.
    pub async fn check(
        &self,
        tool_id: &str,
        args: &Value,
        requires_permission: bool,
        always_require_permission: bool,
    ) -> Result<(), PermissionError> {
        if !requires_permission {
            return Ok(());
        }

        match self.mode() {
            PermissionMode::Danger => return Ok(()),
            PermissionMode::FastEdit if !always_require_permission => return Ok(()),
            PermissionMode::FastEdit | PermissionMode::Interactive => {}
        }

        let key = cache_key(tool_id, args);
        let mut grants = self.grants.lock().await;

        if self.cache_grants {
            if let Some(&granted) = grants.get(&key) {
                debug!(tool_id, "permission grant served from session cache");
                return if granted {
                    Ok(())
                } else {
                    Err(PermissionError::Denied {
                        tool_id: tool_id.to_owned(),
                    })
                };
            }
        }

        let request = PermissionRequest {
            tool_id: tool_id.to_owned(),
            args: args.clone(),
        };
        let granted = self.handler.request_permission(&request).await;

        if self.cache_grants {
            grants.insert(key, granted);
        }

        if granted {
            Ok(())
        } else {
            Err(PermissionError::Denied {
                tool_id: tool_id.to_owned(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHandler {
        calls: std::sync::Arc<AtomicUsize>,
        grant: bool,
    }

    #[async_trait]
    impl PermissionUiHandler for CountingHandler {
        async fn request_permission(&self, _request: &PermissionRequest) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.grant
        }
    }

    fn manager_with(
        mode: PermissionMode,
        grant: bool,
        cache_grants: bool,
    ) -> (PermissionManager, std::sync::Arc<AtomicUsize>) {
        let calls = std::sync::Arc::new(AtomicUsize::new(0));
        let handler = CountingHandler {
            calls: calls.clone(),
            grant,
        };
        (
            PermissionManager::new(mode, Box::new(handler), cache_grants),
            calls,
        )
    }

    #[tokio::test]
    async fn read_only_tools_never_prompt() {
        let (manager, calls) = manager_with(PermissionMode::Interactive, false, true);
        let result = manager.check("grep", &json!({}), false, false).await;
        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn danger_mode_bypasses_gated_tools() {
        let (manager, calls) = manager_with(PermissionMode::Danger, false, true);
        let result = manager.check("bash", &json!({"command": "ls"}), true, false).await;
        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn fast_edit_bypasses_non_always_tools_but_not_always_tools() {
        let (manager, calls) = manager_with(PermissionMode::FastEdit, true, true);
        manager
            .check("fileEdit", &json!({"path": "a.rs"}), true, false)
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        manager
            .check("bash", &json!({"command": "rm -rf /"}), true, true)
            .await
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn denied_permission_surfaces_as_error() {
        let (manager, _calls) = manager_with(PermissionMode::Interactive, false, true);
        let result = manager.check("bash", &json!({}), true, false).await;
        assert!(matches!(result, Err(PermissionError::Denied { .. })));
    }

    #[tokio::test]
    async fn second_identical_request_is_served_from_cache() {
        let (manager, calls) = manager_with(PermissionMode::Interactive, true, true);
        let args = json!({"command": "ls"});
        manager.check("bash", &args, true, false).await.unwrap();
        manager.check("bash", &args, true, false).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn caching_disabled_reprompts_every_time() {
        let (manager, calls) = manager_with(PermissionMode::Interactive, true, false);
        let args = json!({"command": "ls"});
        manager.check("bash", &args, true, false).await.unwrap();
        manager.check("bash", &args, true, false).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    struct SlowHandler {
        in_flight: std::sync::Arc<AtomicUsize>,
        max_observed: std::sync::Arc<AtomicUsize>,
    }

    #[async_trait]
    impl PermissionUiHandler for SlowHandler {
        async fn request_permission(&self, _request: &PermissionRequest) -> bool {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_observed.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            true
        }
    }

    #[tokio::test]
    async fn concurrent_distinct_prompts_are_serialized_to_one_outstanding_ask() {
        let in_flight = std::sync::Arc::new(AtomicUsize::new(0));
        let max_observed = std::sync::Arc::new(AtomicUsize::new(0));
        let handler = SlowHandler {
            in_flight: in_flight.clone(),
            max_observed: max_observed.clone(),
        };
        let manager = std::sync::Arc::new(PermissionManager::new(
            PermissionMode::Interactive,
            Box::new(handler),
            false,
        ));

        let a = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.check("bash", &json!({"command": "a"}), true, false).await })
        };
        let b = {
            let manager = manager.clone();
            tokio::spawn(async move { manager.check("bash", &json!({"command": "b"}), true, false).await })
        };

        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        assert_eq!(max_observed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn set_mode_changes_subsequent_checks() {
        let (manager, calls) = manager_with(PermissionMode::Danger, false, true);
        manager.check("bash", &json!({}), true, false).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        manager.set_mode(PermissionMode::Interactive);
        let result = manager.check("bash", &json!({}), true, false).await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
