//! Native-process execution adapter. Grounded on the teacher's
//! `tools::file_ops` read/write/edit helpers and `sandboxing::child_spawn`
//! command invocation.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::pathutil::contain_path;
use super::{
    CommandResult, ExecutionAdapter, FileEditResult, FileReadResult, GlobOptions, LsEntry,
    Pagination, ReadOptions,
};
use crate::config::RuntimeLimits;
use crate::error::AdapterError;

/// Executes directly against the host filesystem and process table, under
/// a fixed project root every path is checked against (spec.md §4.1).
pub struct LocalExecutionAdapter {
    root: PathBuf,
}

impl LocalExecutionAdapter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, AdapterError> {
        contain_path(&self.root, path)
    }

    fn io_err(path: &std::path::Path, err: std::io::Error) -> AdapterError {
        AdapterError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

#[async_trait]
impl ExecutionAdapter for LocalExecutionAdapter {
    async fn execute_command(
        &self,
        command: &str,
        working_dir: Option<&str>,
    ) -> Result<CommandResult, AdapterError> {
        let cwd = match working_dir {
            Some(dir) => self.resolve(dir)?,
            None => self.root.clone(),
        };

        let parts = shell_words::split(command).map_err(|err| AdapterError::Io {
            path: cwd.clone(),
            message: format!("invalid command syntax: {err}"),
        })?;
        let Some((program, args)) = parts.split_first() else {
            return Ok(CommandResult {
                stdout: String::new(),
                stderr: String::new(),
                exit_code: 0,
            });
        };

        let output = Command::new(program)
            .args(args)
            .current_dir(&cwd)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|err| Self::io_err(&cwd, err))?;

        Ok(CommandResult {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code().unwrap_or(-1),
        })
    }

    async fn read_file(
        &self,
        path: &str,
        opts: ReadOptions,
        limits: &RuntimeLimits,
    ) -> Result<FileReadResult, AdapterError> {
        let resolved = self.resolve(path)?;
        let max_size = opts.max_size.unwrap_or(limits.max_read_bytes).min(limits.max_read_bytes);

        let metadata = fs::metadata(&resolved)
            .await
            .map_err(|err| Self::io_err(&resolved, err))?;
        if metadata.len() as usize > max_size {
            return Err(AdapterError::TooLarge {
                path: resolved,
                limit: max_size,
            });
        }

        let raw = fs::read_to_string(&resolved)
            .await
            .map_err(|err| Self::io_err(&resolved, err))?;

        if opts.line_offset.is_none() && opts.line_count.is_none() {
            return Ok(FileReadResult {
                content: raw,
                pagination: None,
            });
        }

        let lines: Vec<&str> = raw.lines().collect();
        let total_lines = lines.len();
        let max_lines = limits.max_read_lines;
        let start = opts.line_offset.unwrap_or(0).min(total_lines);
        let requested_count = opts.line_count.unwrap_or(max_lines).min(max_lines);
        let end = (start + requested_count).min(total_lines);

        let content = lines[start..end].join("\n");
        Ok(FileReadResult {
            content,
            pagination: Some(Pagination {
                total_lines,
                start_line: start,
                end_line: end,
                has_more: end < total_lines,
            }),
        })
    }

    async fn write_file(&self, path: &str, content: &str) -> Result<(), AdapterError> {
        let resolved = self.resolve(path)?;
        if let Some(parent) = resolved.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|err| Self::io_err(&resolved, err))?;
        }
        let mut file = fs::File::create(&resolved)
            .await
            .map_err(|err| Self::io_err(&resolved, err))?;
        file.write_all(content.as_bytes())
            .await
            .map_err(|err| Self::io_err(&resolved, err))?;
        Ok(())
    }

    async fn path_exists(&self, path: &str) -> Result<bool, AdapterError> {
        let resolved = self.resolve(path)?;
        Ok(fs::try_exists(&resolved)
            .await
            .map_err(|err| Self::io_err(&resolved, err))?)
    }

    async fn edit_file(
        &self,
        path: &str,
        search_code: &str,
        replace_code: &str,
    ) -> Result<FileEditResult, AdapterError> {
        let resolved = self.resolve(path)?;
        let original = fs::read_to_string(&resolved)
            .await
            .map_err(|err| Self::io_err(&resolved, err))?;

        let occurrences = original.matches(search_code).count();
        match occurrences {
            0 => Err(AdapterError::NotFound {
                path: resolved,
                search: search_code.to_owned(),
            }),
            1 => {
                let new_content = original.replacen(search_code, replace_code, 1);
                fs::write(&resolved, &new_content)
                    .await
                    .map_err(|err| Self::io_err(&resolved, err))?;
                Ok(FileEditResult {
                    original_content: original,
                    new_content,
                })
            }
            count => Err(AdapterError::Ambiguous {
                path: resolved,
                search: search_code.to_owned(),
                count,
            }),
        }
    }

    async fn glob(
        &self,
        pattern: &str,
        opts: GlobOptions,
        limits: &RuntimeLimits,
    ) -> Result<Vec<String>, AdapterError> {
        let base = match &opts.cwd {
            Some(dir) => self.resolve(dir)?,
            None => self.root.clone(),
        };
        let full_pattern = base.join(pattern);
        let full_pattern_str = full_pattern.to_string_lossy().into_owned();

        let mut matches: Vec<String> = glob::glob(&full_pattern_str)
            .map_err(|err| AdapterError::Io {
                path: base.clone(),
                message: format!("invalid glob pattern: {err}"),
            })?
            .filter_map(|entry| entry.ok())
            .filter(|candidate| {
                opts.include_dotfiles
                    || !candidate
                        .file_name()
                        .map(|name| name.to_string_lossy().starts_with('.'))
                        .unwrap_or(false)
            })
            .map(|candidate| candidate.to_string_lossy().into_owned())
            .collect();

        matches.sort();
        matches.truncate(limits.max_matches);
        Ok(matches)
    }

    async fn ls(
        &self,
        path: &str,
        show_hidden: bool,
        details: bool,
    ) -> Result<Vec<LsEntry>, AdapterError> {
        let resolved = self.resolve(path)?;
        let mut reader = fs::read_dir(&resolved)
            .await
            .map_err(|err| Self::io_err(&resolved, err))?;

        let mut entries = Vec::new();
        while let Some(entry) = reader
            .next_entry()
            .await
            .map_err(|err| Self::io_err(&resolved, err))?
        {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name == "." || name == ".." {
                continue;
            }
            if !show_hidden && name.starts_with('.') {
                continue;
            }

            let file_type = entry
                .file_type()
                .await
                .map_err(|err| Self::io_err(&resolved, err))?;

            let (size, modified) = if details {
                let metadata = entry
                    .metadata()
                    .await
                    .map_err(|err| Self::io_err(&resolved, err))?;
                let modified = metadata
                    .modified()
                    .ok()
                    .and_then(|time| time.duration_since(std::time::UNIX_EPOCH).ok())
                    .map(|duration| duration.as_secs() as i64);
                (Some(metadata.len()), modified)
            } else {
                (None, None)
            };

            entries.push(LsEntry {
                name,
                is_directory: file_type.is_dir(),
                is_file: file_type.is_file(),
                is_symbolic_link: file_type.is_symlink(),
                size,
                modified_unix_secs: modified,
            });
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn adapter() -> (tempfile::TempDir, LocalExecutionAdapter) {
        let dir = tempfile::tempdir().unwrap();
        let adapter = LocalExecutionAdapter::new(dir.path());
        (dir, adapter)
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let (_dir, adapter) = adapter().await;
        adapter.write_file("greeting.txt", "hello world").await.unwrap();
        let result = adapter
            .read_file("greeting.txt", ReadOptions::default(), &RuntimeLimits::default())
            .await
            .unwrap();
        assert_eq!(result.content, "hello world");
        assert!(result.pagination.is_none());
    }

    #[tokio::test]
    async fn read_file_outside_root_is_rejected() {
        let (_dir, adapter) = adapter().await;
        let result = adapter
            .read_file("../../etc/passwd", ReadOptions::default(), &RuntimeLimits::default())
            .await;
        assert!(matches!(result, Err(AdapterError::PathOutsideProject { .. })));
    }

    #[tokio::test]
    async fn edit_with_unique_match_succeeds() {
        let (_dir, adapter) = adapter().await;
        adapter.write_file("a.txt", "foo bar baz").await.unwrap();
        let result = adapter.edit_file("a.txt", "bar", "qux").await.unwrap();
        assert_eq!(result.new_content, "foo qux baz");
    }

    #[tokio::test]
    async fn edit_with_no_match_is_not_found() {
        let (_dir, adapter) = adapter().await;
        adapter.write_file("a.txt", "foo bar baz").await.unwrap();
        let result = adapter.edit_file("a.txt", "nope", "qux").await;
        assert!(matches!(result, Err(AdapterError::NotFound { .. })));
    }

    #[tokio::test]
    async fn edit_with_ambiguous_match_is_rejected() {
        let (_dir, adapter) = adapter().await;
        adapter.write_file("a.txt", "foo foo foo").await.unwrap();
        let result = adapter.edit_file("a.txt", "foo", "qux").await;
        assert!(matches!(
            result,
            Err(AdapterError::Ambiguous { count: 3, .. })
        ));
    }

    #[tokio::test]
    async fn ls_filters_dotfiles_and_parent_entries() {
        let (_dir, adapter) = adapter().await;
        adapter.write_file("visible.txt", "x").await.unwrap();
        adapter.write_file(".hidden", "x").await.unwrap();

        let entries = adapter.ls(".", false, false).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].name, "visible.txt");

        let with_hidden = adapter.ls(".", true, false).await.unwrap();
        assert_eq!(with_hidden.len(), 2);
    }

    #[tokio::test]
    async fn read_file_paginates_by_line() {
        let (_dir, adapter) = adapter().await;
        adapter
            .write_file("multi.txt", "one\ntwo\nthree\nfour\nfive")
            .await
            .unwrap();
        let opts = ReadOptions {
            line_offset: Some(1),
            line_count: Some(2),
            ..Default::default()
        };
        let result = adapter
            .read_file("multi.txt", opts, &RuntimeLimits::default())
            .await
            .unwrap();
        assert_eq!(result.content, "two\nthree");
        let pagination = result.pagination.unwrap();
        assert_eq!(pagination.total_lines, 5);
        assert_eq!(pagination.start_line, 1);
        assert_eq!(pagination.end_line, 3);
        assert!(pagination.has_more);
    }
}
