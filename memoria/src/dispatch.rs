//! Command dispatcher: turns any outcome into a reply the host loop can hand
//! straight back to the model.

use memoria_core::observability::audit_command;
use memoria_core::MemoryError;
use serde::Serialize;
use serde_json::Value;

use crate::command::Command;
use crate::tool::MemoryTool;

/// Uniform result of one tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolReply {
    pub content: String,
    pub is_error: bool,
    /// Stable error code (`not_found`, `path_escape`, ...) for hosts that branch on it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<&'static str>,
}

impl ToolReply {
    pub fn ok(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
            error_code: None,
        }
    }

    pub fn error(operation: &str, err: &MemoryError) -> Self {
        Self {
            content: format!("Error: {} failed: {}", operation, err),
            is_error: true,
            error_code: Some(err.code()),
        }
    }

    /// Convert to Claude API tool_result format.
    pub fn to_claude_format(&self, tool_use_id: &str) -> Value {
        serde_json::json!({
            "type": "tool_result",
            "tool_use_id": tool_use_id,
            "content": self.content,
            "is_error": self.is_error,
        })
    }
}

/// Execute a decoded command and normalize the outcome.
pub fn respond<T: MemoryTool + ?Sized>(tool: &T, command: &Command) -> ToolReply {
    let operation = command.name();
    let result = tool.execute(command);
    audit_command(
        operation,
        command.path(),
        result.as_ref().map(|_| ()),
        command.payload(),
    );
    match result {
        Ok(content) => {
            if command.is_mutation() {
                tracing::info!(operation, path = %command.path(), "memory updated");
            } else {
                tracing::debug!(operation, path = %command.path(), "memory viewed");
            }
            ToolReply::ok(content)
        }
        Err(err) => {
            if err.is_violation() {
                tracing::warn!(operation, code = err.code(), "memory command refused: {}", err);
            } else {
                tracing::info!(operation, code = err.code(), "memory command failed: {}", err);
            }
            ToolReply::error(operation, &err)
        }
    }
}

/// Decode a tool-call input object, then [`respond`].
pub fn respond_json<T: MemoryTool + ?Sized>(tool: &T, input: &Value) -> ToolReply {
    match Command::from_value(input) {
        Ok(command) => respond(tool, &command),
        Err(err) => reject_malformed(input.get("command").and_then(|c| c.as_str()), &err),
    }
}

/// Decode the raw JSON arguments string of a tool call, then [`respond`].
pub fn respond_str<T: MemoryTool + ?Sized>(tool: &T, arguments: &str) -> ToolReply {
    match serde_json::from_str::<Value>(arguments) {
        Ok(value) => respond_json(tool, &value),
        Err(e) => {
            let err = MemoryError::invalid_argument(
                "<missing path>",
                format!("invalid arguments JSON: {}", e),
            );
            reject_malformed(None, &err)
        }
    }
}

fn reject_malformed(command: Option<&str>, err: &MemoryError) -> ToolReply {
    let operation = command.unwrap_or("memory command");
    tracing::info!(operation, "malformed memory command: {}", err);
    audit_command(operation, "", Err(err), None);
    ToolReply::error(operation, err)
}
