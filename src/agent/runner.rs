//! The Agent Runner (spec.md §4.6): the query/response loop that drives a
//! `ModelProvider` through repeated tool dispatch until it produces a
//! final answer, a round limit is hit, or the host cancels.
//!
//! Grounded on the teacher's `core::agent::runner::execute::AgentRunner::execute_task`
//! for the turn-loop shape (steering/cancellation check, per-turn model
//! call, tool-call collection, result folding) — generalized from the
//! teacher's task/conversation/provider-specific plumbing down to the
//! single `processQuery` entry point spec.md §6 names.

use std::collections::HashSet;

use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::SessionConfig;
use crate::context::{ContentBlock, Message};
use crate::error::RunnerError;
use crate::exec::ExecutionAdapter;
use crate::model::{ModelClient, ModelProvider, ToolDefinition};
use crate::permissions::{PermissionManager, PermissionUiHandler};
use crate::tools::builtin::{register_all, BatchTool};
use crate::tools::{ToolContext, ToolRegistry};

use super::session::SessionState;

/// One entry in [`ProcessQueryOutcome::tool_results`] — a flattened,
/// host-friendly view of the `ToolResult` blocks a query produced (spec.md
/// §6: `toolResults: ToolResultEntry[]`).
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResultEntry {
    pub tool_id: String,
    pub is_error: bool,
    pub payload: Value,
}

/// The structured result of one [`AgentRunner::process_query`] call
/// (spec.md §6). Never raised as an error: a loop-level failure is
/// reported via `error`, with the last assistant text (if any) still
/// present in `response`.
#[derive(Debug, Clone, Default)]
pub struct ProcessQueryOutcome {
    pub response: String,
    pub tool_results: Vec<ToolResultEntry>,
    pub error: Option<RunnerError>,
}

fn tool_definitions(registry: &ToolRegistry) -> Vec<ToolDefinition> {
    registry
        .describe()
        .into_iter()
        .map(|descriptor| {
            ToolDefinition::new(
                descriptor.name,
                descriptor.description,
                descriptor.parameters_schema,
            )
        })
        .collect()
}

/// Drives one [`ModelProvider`] through the loop described in spec.md
/// §4.6. Owns the tool registry and permission manager; a fresh
/// [`SessionState`] is supplied by the caller for each logically distinct
/// conversation.
pub struct AgentRunner<P: ModelProvider> {
    client: ModelClient<P>,
    adapter: Box<dyn ExecutionAdapter>,
    registry: ToolRegistry,
    permissions: PermissionManager,
    batch: BatchTool,
    cancellation: CancellationToken,
}

impl<P: ModelProvider> AgentRunner<P> {
    /// Build a runner with the default (all ten) tool set. A host wanting
    /// a narrower tool set should register that subset directly and use
    /// [`AgentRunner::with_registry`] instead.
    pub fn new(
        provider: P,
        adapter: impl ExecutionAdapter + 'static,
        ui: impl PermissionUiHandler + 'static,
    ) -> Self {
        let mut registry = ToolRegistry::new();
        register_all(&mut registry);
        Self::with_registry(provider, adapter, ui, registry)
    }

    pub fn with_registry(
        provider: P,
        adapter: impl ExecutionAdapter + 'static,
        ui: impl PermissionUiHandler + 'static,
        registry: ToolRegistry,
    ) -> Self {
        Self {
            client: ModelClient::new(provider),
            adapter: Box::new(adapter),
            registry,
            permissions: PermissionManager::new(Default::default(), Box::new(ui), true),
            batch: BatchTool::new(),
            cancellation: CancellationToken::new(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.client = self.client.with_system_prompt(prompt);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.client = self.client.with_temperature(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.client = self.client.with_max_tokens(max_tokens);
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// A token the host can cancel to abort an in-flight
    /// [`AgentRunner::process_query`] at its next suspension point
    /// (spec.md §5).
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Run the loop described in spec.md §4.6 against `session`, starting
    /// from the given `query`.
    pub async fn process_query(
        &self,
        query: &str,
        session: &mut SessionState,
    ) -> ProcessQueryOutcome {
        self.permissions.set_mode(session.config.permission_mode);
        session.context.push(Message::user_text(query));

        let limits = session.config.limits;
        let tool_defs = tool_definitions(&self.registry);
        let mut tool_results = Vec::new();

        for round in 0..limits.max_rounds {
            if self.cancellation.is_cancelled() {
                return ProcessQueryOutcome {
                    response: session.context.last_assistant_text().unwrap_or_default(),
                    tool_results,
                    error: Some(RunnerError::Cancelled),
                };
            }

            let response = match self.client.run(&session.context, tool_defs.clone()).await {
                Ok(response) => response,
                Err(err) => {
                    warn!(error = %err, round, "provider call failed, terminating loop");
                    return ProcessQueryOutcome {
                        response: session.context.last_assistant_text().unwrap_or_default(),
                        tool_results,
                        error: Some(RunnerError::from(err)),
                    };
                }
            };

            if let Some(usage) = response.usage {
                session.token_usage.accumulate(usage);
            }

            session
                .context
                .push(Message::assistant(response.content.clone()));

            let tool_uses: Vec<(String, String, Value)> = response
                .tool_use_blocks()
                .map(|(id, name, args)| (id.to_owned(), name.to_owned(), args.clone()))
                .collect();

            if tool_uses.is_empty() {
                return ProcessQueryOutcome {
                    response: response.text(),
                    tool_results,
                    error: None,
                };
            }

            let mut result_blocks = Vec::with_capacity(tool_uses.len());
            for (id, name, args) in tool_uses {
                if self.cancellation.is_cancelled() {
                    result_blocks.push(ContentBlock::tool_result(
                        id,
                        json!("cancelled"),
                        true,
                    ));
                    continue;
                }

                let read_set: HashSet<_> = session.context.read_set().clone();
                let ctx = ToolContext {
                    adapter: self.adapter.as_ref(),
                    permissions: &self.permissions,
                    limits: &limits,
                    read_set: &read_set,
                };

                // spec.md §4.6: "a tool that itself invokes the registry
                // (Batch) does so through ToolContext; nested invocations
                // do not re-enter the loop" — Batch has no reference back
                // into the registry it is itself dispatched through, so
                // the loop special-cases it rather than calling
                // `ToolRegistry::dispatch`.
                let dispatch_result = if name == "batch" {
                    self.batch.run_against(&self.registry, &ctx, args).await
                } else {
                    self.registry.dispatch(&name, args, &ctx).await
                };

                match dispatch_result {
                    Ok(outcome) => {
                        for path in &outcome.read_paths {
                            session.context.mark_read(path);
                        }
                        info!(tool_id = %name, "tool result appended to transcript");
                        result_blocks.push(ContentBlock::tool_result(
                            id,
                            outcome.payload.clone(),
                            false,
                        ));
                        tool_results.push(ToolResultEntry {
                            tool_id: name,
                            is_error: false,
                            payload: outcome.payload,
                        });
                    }
                    Err(err) => {
                        let message = json!(err.to_string());
                        result_blocks.push(ContentBlock::tool_result(id, message.clone(), true));
                        tool_results.push(ToolResultEntry {
                            tool_id: name,
                            is_error: true,
                            payload: message,
                        });
                    }
                }
            }

            session.context.push(Message::user(result_blocks));
        }

        ProcessQueryOutcome {
            response: session.context.last_assistant_text().unwrap_or_default(),
            tool_results,
            error: Some(RunnerError::RoundLimit {
                limit: limits.max_rounds,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PermissionMode;
    use crate::error::ProviderError;
    use crate::exec::LocalExecutionAdapter;
    use crate::model::{LLMRequest, LLMResponse, Usage};
    use crate::permissions::AlwaysDeny;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct ScriptedProvider {
        responses: std::sync::Mutex<Vec<LLMResponse>>,
    }

    impl ScriptedProvider {
        fn new(responses: Vec<LLMResponse>) -> Self {
            Self {
                responses: std::sync::Mutex::new(responses),
            }
        }
    }

    #[async_trait]
    impl ModelProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn process_query(
            &self,
            _request: LLMRequest,
        ) -> Result<LLMResponse, ProviderError> {
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Err(ProviderError::Provider {
                    message: "no more scripted responses".to_owned(),
                });
            }
            Ok(responses.remove(0))
        }
    }

    fn text_response(text: &str) -> LLMResponse {
        LLMResponse {
            content: vec![ContentBlock::text(text)],
            usage: Some(Usage { total_tokens: 3 }),
        }
    }

    #[tokio::test]
    async fn greet_terminates_in_one_round_with_no_tool_results() {
        let provider = ScriptedProvider::new(vec![text_response("Hello to you too.")]);
        let adapter = LocalExecutionAdapter::new(".");
        let runner = AgentRunner::new(provider, adapter, AlwaysDeny);
        let mut session = SessionState::new(SessionConfig::default());

        let outcome = runner.process_query("Hello.", &mut session).await;

        assert_eq!(outcome.response, "Hello to you too.");
        assert!(outcome.tool_results.is_empty());
        assert!(outcome.error.is_none());
        assert_eq!(session.context.messages.len(), 2);
        assert_eq!(session.token_usage.total_tokens, 3);
    }

    #[tokio::test]
    async fn unknown_tool_name_surfaces_as_error_result_and_continues() {
        let first = LLMResponse {
            content: vec![ContentBlock::tool_use("call-1", "doesNotExist", json!({}))],
            usage: None,
        };
        let provider = ScriptedProvider::new(vec![first, text_response("done")]);
        let adapter = LocalExecutionAdapter::new(".");
        let runner = AgentRunner::new(provider, adapter, AlwaysDeny);
        let mut session = SessionState::new(SessionConfig::default());

        let outcome = runner.process_query("do something", &mut session).await;

        assert_eq!(outcome.response, "done");
        assert_eq!(outcome.tool_results.len(), 1);
        assert!(outcome.tool_results[0].is_error);
        assert!(session.context.tool_use_results_paired());
    }

    #[tokio::test]
    async fn round_limit_terminates_with_last_assistant_text_preserved() {
        let mut config = SessionConfig::default();
        config.limits.max_rounds = 2;
        let looping = LLMResponse {
            content: vec![
                ContentBlock::text("still working"),
                ContentBlock::tool_use("call-1", "think", json!({"thought": "go on"})),
            ],
            usage: None,
        };
        let provider = ScriptedProvider::new(vec![looping.clone(), looping]);
        let adapter = LocalExecutionAdapter::new(".");
        let runner = AgentRunner::new(provider, adapter, AlwaysDeny);
        let mut session = SessionState::new(config);

        let outcome = runner.process_query("loop forever", &mut session).await;

        assert_eq!(outcome.response, "still working");
        assert!(matches!(outcome.error, Some(RunnerError::RoundLimit { limit: 2 })));
    }

    #[tokio::test]
    async fn permission_denied_tool_result_does_not_abort_the_loop() {
        let first = LLMResponse {
            content: vec![
                ContentBlock::tool_use("call-1", "shell", json!({"command": "rm -rf /"})),
                ContentBlock::tool_use("call-2", "think", json!({"thought": "fallback"})),
            ],
            usage: None,
        };
        let provider = ScriptedProvider::new(vec![first, text_response("recovered")]);
        let adapter = LocalExecutionAdapter::new(".");
        let runner = AgentRunner::new(provider, adapter, AlwaysDeny);
        let mut session = SessionState::new(SessionConfig::default());
        session.config.permission_mode = PermissionMode::Interactive;

        let outcome = runner.process_query("try a risky command", &mut session).await;

        assert_eq!(outcome.tool_results.len(), 2);
        assert!(outcome.tool_results[0].is_error);
        assert!(!outcome.tool_results[1].is_error);
        assert_eq!(outcome.response, "recovered");
    }

    #[tokio::test]
    async fn batch_dispatches_through_run_against_not_the_registry() {
        let first = LLMResponse {
            content: vec![ContentBlock::tool_use(
                "call-1",
                "batch",
                json!({
                    "invocations": [
                        {"tool_name": "think", "input": {"thought": "a"}},
                        {"tool_name": "think", "input": {"thought": "b"}},
                    ]
                }),
            )],
            usage: None,
        };
        let provider = ScriptedProvider::new(vec![first, text_response("batched")]);
        let adapter = LocalExecutionAdapter::new(".");
        let runner = AgentRunner::new(provider, adapter, AlwaysDeny);
        let mut session = SessionState::new(SessionConfig::default());

        let outcome = runner.process_query("batch it", &mut session).await;

        assert_eq!(outcome.tool_results.len(), 1);
        assert!(!outcome.tool_results[0].is_error);
        let results = outcome.tool_results[0].payload["results"].as_array().unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn cancellation_token_stops_the_loop() {
        let looping = LLMResponse {
            content: vec![ContentBlock::tool_use(
                "call-1",
                "think",
                json!({"thought": "go on"}),
            )],
            usage: None,
        };
        let provider = ScriptedProvider::new(vec![looping.clone(), looping]);
        let adapter = LocalExecutionAdapter::new(".");
        let runner = AgentRunner::new(provider, adapter, AlwaysDeny);
        let mut session = SessionState::new(SessionConfig::default());

        runner.cancellation_token().cancel();
        let outcome = runner.process_query("go", &mut session).await;

        assert!(matches!(outcome.error, Some(RunnerError::Cancelled)));
    }

    #[tokio::test]
    async fn provider_network_error_terminates_after_its_retry() {
        struct AlwaysDown {
            calls: Arc<AtomicUsize>,
        }

        #[async_trait]
        impl ModelProvider for AlwaysDown {
            fn name(&self) -> &str {
                "down"
            }

            async fn process_query(
                &self,
                _request: LLMRequest,
            ) -> Result<LLMResponse, ProviderError> {
                self.calls.fetch_add(1, Ordering::SeqCst);
                Err(ProviderError::Network {
                    message: "connection reset".to_owned(),
                })
            }
        }

        let calls = Arc::new(AtomicUsize::new(0));
        let provider = AlwaysDown {
            calls: calls.clone(),
        };
        let adapter = LocalExecutionAdapter::new(".");
        let runner = AgentRunner::new(provider, adapter, AlwaysDeny);
        let mut session = SessionState::new(SessionConfig::default());

        let outcome = runner.process_query("hello?", &mut session).await;

        assert!(matches!(
            outcome.error,
            Some(RunnerError::ProviderUnreachable(_))
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
