//! Memory tool commands as they arrive from the model.
//!
//! Wire form: `{"command": "view", "path": "/memories", "view_range": [1, -1]}`.
//! Payload fields are optional on purpose; absent text is handled by the tool,
//! not rejected at decode time.

use memoria_core::{MemoryError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    View {
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        view_range: Option<Vec<i64>>,
    },
    Create {
        path: String,
        #[serde(default)]
        file_text: Option<String>,
    },
    StrReplace {
        path: String,
        #[serde(default)]
        old_str: Option<String>,
        #[serde(default)]
        new_str: Option<String>,
    },
    Insert {
        path: String,
        insert_line: i64,
        #[serde(default)]
        insert_text: Option<String>,
    },
    Delete {
        path: String,
    },
    Rename {
        old_path: String,
        new_path: String,
    },
}

impl Command {
    /// Decode a tool-call input object. Malformed input becomes `InvalidArgument`
    /// so it can be reported back to the model like any other failure.
    pub fn from_value(value: &Value) -> Result<Self> {
        serde_json::from_value(value.clone()).map_err(|e| {
            let path = ["path", "old_path"]
                .iter()
                .find_map(|k| value.get(*k).and_then(|v| v.as_str()))
                .unwrap_or("<missing path>");
            MemoryError::invalid_argument(path, format!("malformed memory command: {}", e))
        })
    }

    /// Wire name of the command.
    pub fn name(&self) -> &'static str {
        match self {
            Self::View { .. } => "view",
            Self::Create { .. } => "create",
            Self::StrReplace { .. } => "str_replace",
            Self::Insert { .. } => "insert",
            Self::Delete { .. } => "delete",
            Self::Rename { .. } => "rename",
        }
    }

    /// The path the command acts on (the source for `rename`).
    pub fn path(&self) -> &str {
        match self {
            Self::View { path, .. }
            | Self::Create { path, .. }
            | Self::StrReplace { path, .. }
            | Self::Insert { path, .. }
            | Self::Delete { path } => path,
            Self::Rename { old_path, .. } => old_path,
        }
    }

    /// Text the command writes, if any.
    pub fn payload(&self) -> Option<&str> {
        match self {
            Self::Create { file_text, .. } => file_text.as_deref(),
            Self::StrReplace { new_str, .. } => new_str.as_deref(),
            Self::Insert { insert_text, .. } => insert_text.as_deref(),
            _ => None,
        }
    }

    pub fn is_mutation(&self) -> bool {
        !matches!(self, Self::View { .. })
    }
}
