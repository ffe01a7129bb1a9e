//! Domain types for remote threads, runs, and tool calls

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status of a remote run.
///
/// Only `completed`, `failed`, and `requires_action` settle the poll loop.
/// Statuses the service may add later deserialize to [`RunStatus::Other`]
/// and keep the loop waiting, bounded by the poll deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Completed,
    Failed,
    #[serde(other)]
    Other,
}

impl RunStatus {
    /// Whether the poll loop should stop waiting on this status
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            RunStatus::Completed | RunStatus::Failed | RunStatus::RequiresAction
        )
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Queued => write!(f, "queued"),
            RunStatus::InProgress => write!(f, "in_progress"),
            RunStatus::RequiresAction => write!(f, "requires_action"),
            RunStatus::Completed => write!(f, "completed"),
            RunStatus::Failed => write!(f, "failed"),
            RunStatus::Other => write!(f, "other"),
        }
    }
}

/// One execution attempt of the assistant against a thread
#[derive(Debug, Clone)]
pub struct Run {
    /// Server-assigned run identifier, scoped to its thread
    pub id: String,
    pub status: RunStatus,
    /// Tool calls pending resolution; non-empty only in `requires_action`
    pub pending_tool_calls: Vec<ToolCall>,
    /// Error payload reported by the service for failed runs
    pub last_error: Option<Value>,
}

/// A function-invocation request emitted by a run needing external data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call
    pub id: String,
    /// Name of the function being called
    pub name: String,
    /// JSON-encoded argument payload
    pub arguments: String,
}

impl ToolCall {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

/// The result submitted back to resume a run after resolving a tool call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    /// ID of the tool call this is responding to
    pub tool_call_id: String,
    /// Output text, passed through to the remote service verbatim
    pub output: String,
}

/// Definition of a function tool declared on the assistant
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema defining the tool's parameters
    pub parameters: Value,
}

impl ToolDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// Fixed assistant configuration registered once at startup
#[derive(Debug, Clone, Serialize)]
pub struct AssistantSpec {
    pub model: String,
    pub instructions: String,
    pub tools: Vec<ToolDefinition>,
}

/// A message in a remote thread, in the order the service returned it
#[derive(Debug, Clone, Deserialize)]
pub struct ThreadMessage {
    pub role: String,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

/// One content block of a thread message; only text blocks carry a value
#[derive(Debug, Clone, Deserialize)]
pub struct ContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<TextContent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TextContent {
    pub value: String,
}

/// One line of the flattened conversation transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptEntry {
    pub role: String,
    pub text: String,
}

impl TranscriptEntry {
    /// Render as the `role: text` line returned to the caller
    pub fn render(&self) -> String {
        format!("{}: {}", self.role, self.text)
    }
}

/// Flatten thread messages into transcript entries, preserving server order.
///
/// Each entry takes the message's first text content block; messages without
/// one flatten to an empty text.
pub fn flatten_messages(messages: &[ThreadMessage]) -> Vec<TranscriptEntry> {
    messages
        .iter()
        .map(|msg| {
            let text = msg
                .content
                .first()
                .and_then(|block| block.text.as_ref())
                .map(|t| t.value.clone())
                .unwrap_or_default();
            TranscriptEntry {
                role: msg.role.clone(),
                text,
            }
        })
        .collect()
}
