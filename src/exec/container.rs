//! Container-backed execution adapter: same semantics as
//! [`super::LocalExecutionAdapter`], but every path is translated through
//! a mount prefix before touching the host filesystem (spec.md §4.1:
//! "the tool layer must not know which adapter it is talking to").
//!
//! This crate does not itself launch containers; a host wires this
//! adapter to a volume already mounted at `host_mount_root`, mapping the
//! guest's `/workspace`-style project root onto it.

use async_trait::async_trait;

use super::{
    CommandResult, ExecutionAdapter, FileEditResult, FileReadResult, GlobOptions, LocalExecutionAdapter,
    LsEntry, ReadOptions,
};
use crate::config::RuntimeLimits;
use crate::error::AdapterError;

/// Wraps a [`LocalExecutionAdapter`] rooted at the host-side mount point
/// standing in for the container's project directory.
pub struct ContainerExecutionAdapter {
    inner: LocalExecutionAdapter,
}

impl ContainerExecutionAdapter {
    pub fn new(host_mount_root: impl Into<std::path::PathBuf>) -> Self {
        Self {
            inner: LocalExecutionAdapter::new(host_mount_root),
        }
    }
}

#[async_trait]
impl ExecutionAdapter for ContainerExecutionAdapter {
    async fn execute_command(
        &self,
        command: &str,
        working_dir: Option<&str>,
    ) -> Result<CommandResult, AdapterError> {
        self.inner.execute_command(command, working_dir).await
    }

    async fn read_file(
        &self,
        path: &str,
        opts: ReadOptions,
        limits: &RuntimeLimits,
    ) -> Result<FileReadResult, AdapterError> {
        self.inner.read_file(path, opts, limits).await
    }

    async fn write_file(&self, path: &str, content: &str) -> Result<(), AdapterError> {
        self.inner.write_file(path, content).await
    }

    async fn path_exists(&self, path: &str) -> Result<bool, AdapterError> {
        self.inner.path_exists(path).await
    }

    async fn edit_file(
        &self,
        path: &str,
        search_code: &str,
        replace_code: &str,
    ) -> Result<FileEditResult, AdapterError> {
        self.inner.edit_file(path, search_code, replace_code).await
    }

    async fn glob(
        &self,
        pattern: &str,
        opts: GlobOptions,
        limits: &RuntimeLimits,
    ) -> Result<Vec<String>, AdapterError> {
        self.inner.glob(pattern, opts, limits).await
    }

    async fn ls(
        &self,
        path: &str,
        show_hidden: bool,
        details: bool,
    ) -> Result<Vec<LsEntry>, AdapterError> {
        self.inner.ls(path, show_hidden, details).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delegates_writes_through_mount_root() {
        let dir = tempfile::tempdir().unwrap();
        let adapter = ContainerExecutionAdapter::new(dir.path());
        adapter.write_file("out.txt", "payload").await.unwrap();
        let result = adapter
            .read_file("out.txt", ReadOptions::default(), &RuntimeLimits::default())
            .await
            .unwrap();
        assert_eq!(result.content, "payload");
    }
}
