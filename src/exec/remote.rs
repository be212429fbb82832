//! Remote-sandbox execution adapter stub. Demonstrates the third point in
//! the adapter polymorphism (spec.md §4.1: local / container / remote)
//! without committing this crate to any particular transport; a host
//! supplies a connected transport via [`RemoteExecutionAdapter::new`].

use async_trait::async_trait;

use super::{
    CommandResult, ExecutionAdapter, FileEditResult, FileReadResult, GlobOptions, LsEntry,
    ReadOptions,
};
use crate::config::RuntimeLimits;
use crate::error::AdapterError;

/// A transport capable of executing the adapter's six operations against
/// a remote sandbox. Left unimplemented here; hosts provide their own.
#[async_trait]
pub trait RemoteTransport: Send + Sync {
    async fn execute_command(
        &self,
        command: &str,
        working_dir: Option<&str>,
    ) -> Result<CommandResult, AdapterError>;

    async fn read_file(
        &self,
        path: &str,
        opts: ReadOptions,
        limits: &RuntimeLimits,
    ) -> Result<FileReadResult, AdapterError>;

    async fn write_file(&self, path: &str, content: &str) -> Result<(), AdapterError>;

    async fn path_exists(&self, path: &str) -> Result<bool, AdapterError>;

    async fn edit_file(
        &self,
        path: &str,
        search_code: &str,
        replace_code: &str,
    ) -> Result<FileEditResult, AdapterError>;

    async fn glob(
        &self,
        pattern: &str,
        opts: GlobOptions,
        limits: &RuntimeLimits,
    ) -> Result<Vec<String>, AdapterError>;

    async fn ls(
        &self,
        path: &str,
        show_hidden: bool,
        details: bool,
    ) -> Result<Vec<LsEntry>, AdapterError>;
}

/// Delegates to an optional [`RemoteTransport`]; every operation fails
/// with [`AdapterError::BackendUnavailable`] until one is attached.
pub struct RemoteExecutionAdapter {
    transport: Option<Box<dyn RemoteTransport>>,
}

impl RemoteExecutionAdapter {
    pub fn disconnected() -> Self {
        Self { transport: None }
    }

    pub fn connected(transport: Box<dyn RemoteTransport>) -> Self {
        Self {
            transport: Some(transport),
        }
    }

    fn transport(&self) -> Result<&dyn RemoteTransport, AdapterError> {
        self.transport.as_deref().ok_or_else(|| AdapterError::BackendUnavailable {
            reason: "no remote transport attached".to_owned(),
        })
    }
}

#[async_trait]
impl ExecutionAdapter for RemoteExecutionAdapter {
    async fn execute_command(
        &self,
        command: &str,
        working_dir: Option<&str>,
    ) -> Result<CommandResult, AdapterError> {
        self.transport()?.execute_command(command, working_dir).await
    }

    async fn read_file(
        &self,
        path: &str,
        opts: ReadOptions,
        limits: &RuntimeLimits,
    ) -> Result<FileReadResult, AdapterError> {
        self.transport()?.read_file(path, opts, limits).await
    }

    async fn write_file(&self, path: &str, content: &str) -> Result<(), AdapterError> {
        self.transport()?.write_file(path, content).await
    }

    async fn path_exists(&self, path: &str) -> Result<bool, AdapterError> {
        self.transport()?.path_exists(path).await
    }

    async fn edit_file(
        &self,
        path: &str,
        search_code: &str,
        replace_code: &str,
    ) -> Result<FileEditResult, AdapterError> {
        self.transport()?.edit_file(path, search_code, replace_code).await
    }

    async fn glob(
        &self,
        pattern: &str,
        opts: GlobOptions,
        limits: &RuntimeLimits,
    ) -> Result<Vec<String>, AdapterError> {
        self.transport()?.glob(pattern, opts, limits).await
    }

    async fn ls(
        &self,
        path: &str,
        show_hidden: bool,
        details: bool,
    ) -> Result<Vec<LsEntry>, AdapterError> {
        self.transport()?.ls(path, show_hidden, details).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disconnected_adapter_reports_backend_unavailable() {
        let adapter = RemoteExecutionAdapter::disconnected();
        let result = adapter.execute_command("echo hi", None).await;
        assert!(matches!(result, Err(AdapterError::BackendUnavailable { .. })));
    }
}
