//! The conversation transcript plus per-session read-set that together
//! form the model's visible state (spec.md §3 `ContextWindow`).

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role of a [`Message`] within the transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
}

/// A typed content block within a [`Message`] (spec.md §3).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text { text: String },
    ToolUse { id: String, name: String, args: Value },
    ToolResult { id: String, payload: Value, is_error: bool },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text { text: text.into() }
    }

    pub fn tool_use(id: impl Into<String>, name: impl Into<String>, args: Value) -> Self {
        ContentBlock::ToolUse {
            id: id.into(),
            name: name.into(),
            args,
        }
    }

    pub fn tool_result(id: impl Into<String>, payload: Value, is_error: bool) -> Self {
        ContentBlock::ToolResult {
            id: id.into(),
            payload,
            is_error,
        }
    }

    pub fn as_tool_use(&self) -> Option<(&str, &str, &Value)> {
        match self {
            ContentBlock::ToolUse { id, name, args } => Some((id, name, args)),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentBlock::Text { text } => Some(text),
            _ => None,
        }
    }
}

/// A single transcript entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: Vec<ContentBlock>,
}

impl Message {
    pub fn user(content: Vec<ContentBlock>) -> Self {
        Self {
            role: MessageRole::User,
            content,
        }
    }

    pub fn assistant(content: Vec<ContentBlock>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content,
        }
    }

    pub fn user_text(text: impl Into<String>) -> Self {
        Self::user(vec![ContentBlock::text(text)])
    }

    /// Concatenation of every [`ContentBlock::Text`] block, in order.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(ContentBlock::as_text)
            .collect::<Vec<_>>()
            .join("")
    }

    pub fn tool_uses(&self) -> impl Iterator<Item = (&str, &str, &Value)> {
        self.content.iter().filter_map(ContentBlock::as_tool_use)
    }
}

/// Ordered transcript plus the set of file paths read this context
/// lifetime (spec.md §3).
///
/// Invariants enforced here (spec.md §3(i)-(iii)):
/// - every `ToolUse` block in an assistant message is followed, in the next
///   user message, by a `ToolResult` block bearing the same id
///   ([`ContextWindow::tool_use_results_paired`]);
/// - a path may not be edited via `FileEdit` unless it is in the read-set
///   ([`ContextWindow::has_been_read`]);
/// - the read-set is cleared only on an explicit [`ContextWindow::refresh`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextWindow {
    pub messages: Vec<Message>,
    #[serde(skip)]
    read_set: HashSet<PathBuf>,
}

impl ContextWindow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Record that `path` has been read by a `FileRead`-family tool.
    pub fn mark_read(&mut self, path: impl AsRef<Path>) {
        self.read_set.insert(path.as_ref().to_path_buf());
    }

    pub fn has_been_read(&self, path: impl AsRef<Path>) -> bool {
        self.read_set.contains(path.as_ref())
    }

    /// Clear the read-set. Only valid between queries (spec.md §3
    /// `SessionState` invariant): callers must not call this mid-query.
    pub fn refresh(&mut self) {
        self.read_set.clear();
    }

    pub fn read_set(&self) -> &HashSet<PathBuf> {
        &self.read_set
    }

    /// Every `ToolUse` id emitted by assistant messages, in transcript
    /// order, paired with whether a same-id `ToolResult` exists anywhere
    /// later in the transcript.
    pub fn tool_use_results_paired(&self) -> bool {
        let mut pending: Vec<&str> = Vec::new();
        for message in &self.messages {
            match message.role {
                MessageRole::Assistant => {
                    pending.extend(message.tool_uses().map(|(id, _, _)| id));
                }
                MessageRole::User => {
                    for block in &message.content {
                        if let ContentBlock::ToolResult { id, .. } = block {
                            pending.retain(|pending_id| pending_id != id);
                        }
                    }
                }
            }
        }
        pending.is_empty()
    }

    pub fn last_assistant_text(&self) -> Option<String> {
        self.messages
            .iter()
            .rev()
            .find(|message| message.role == MessageRole::Assistant)
            .map(Message::text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fresh_window_has_no_reads() {
        let window = ContextWindow::new();
        assert!(!window.has_been_read("foo.txt"));
    }

    #[test]
    fn mark_read_then_has_been_read() {
        let mut window = ContextWindow::new();
        window.mark_read("foo.txt");
        assert!(window.has_been_read("foo.txt"));
        assert!(!window.has_been_read("bar.txt"));
    }

    #[test]
    fn refresh_clears_read_set() {
        let mut window = ContextWindow::new();
        window.mark_read("foo.txt");
        window.refresh();
        assert!(!window.has_been_read("foo.txt"));
    }

    #[test]
    fn paired_tool_use_and_result() {
        let mut window = ContextWindow::new();
        window.push(Message::assistant(vec![ContentBlock::tool_use(
            "1",
            "grep",
            json!({}),
        )]));
        window.push(Message::user(vec![ContentBlock::tool_result(
            "1",
            json!({"ok": true}),
            false,
        )]));
        assert!(window.tool_use_results_paired());
    }

    #[test]
    fn unpaired_tool_use_detected() {
        let mut window = ContextWindow::new();
        window.push(Message::assistant(vec![ContentBlock::tool_use(
            "1",
            "grep",
            json!({}),
        )]));
        assert!(!window.tool_use_results_paired());
    }

    #[test]
    fn multiple_tool_uses_preserve_order_in_pairing() {
        let mut window = ContextWindow::new();
        window.push(Message::assistant(vec![
            ContentBlock::tool_use("1", "grep", json!({})),
            ContentBlock::tool_use("2", "ls", json!({})),
        ]));
        window.push(Message::user(vec![
            ContentBlock::tool_result("1", json!({}), false),
            ContentBlock::tool_result("2", json!({}), false),
        ]));
        assert!(window.tool_use_results_paired());
    }
}
