//! What a host loop advertises to the model: the tool descriptor and the
//! usage rules for the system prompt.

use serde_json::{json, Value};

/// Anthropic memory tool type.
pub const TOOL_TYPE: &str = "memory_20250818";
pub const TOOL_NAME: &str = "memory";

/// Descriptor for APIs with native memory tool support.
pub fn tool_definition() -> Value {
    json!({
        "type": TOOL_TYPE,
        "name": TOOL_NAME,
    })
}

/// Generic function-calling definition, for APIs without a native memory tool.
pub fn function_definition() -> Value {
    json!({
        "type": "function",
        "function": {
            "name": TOOL_NAME,
            "description": "File-based memory. /memories is read-write, /transcripts is read-only. \
                Commands: view (file or directory, optional view_range [start, end], end -1 = EOF), \
                create, str_replace (old_str must occur exactly once), insert (insert_line is 0-based, \
                the new line goes before it), delete, rename.",
            "parameters": {
                "type": "object",
                "properties": {
                    "command": {
                        "type": "string",
                        "enum": ["view", "create", "str_replace", "insert", "delete", "rename"]
                    },
                    "path": {
                        "type": "string",
                        "description": "Path starting with /memories or /transcripts"
                    },
                    "view_range": {
                        "type": "array",
                        "items": {"type": "integer"},
                        "minItems": 2,
                        "maxItems": 2,
                        "description": "[start, end], 1-based inclusive; end -1 reads to end of file"
                    },
                    "file_text": {"type": "string", "description": "Full content for create"},
                    "old_str": {"type": "string", "description": "Exact text to replace; must be unique"},
                    "new_str": {"type": "string", "description": "Replacement text"},
                    "insert_line": {
                        "type": "integer",
                        "description": "0 = start of file, line count = end of file"
                    },
                    "insert_text": {"type": "string", "description": "Line to insert"},
                    "old_path": {"type": "string"},
                    "new_path": {"type": "string"}
                },
                "required": ["command"]
            }
        }
    })
}

/// Usage rules for the model, to be placed in the host's system prompt.
pub fn system_prompt() -> &'static str {
    "Rules for the memory tool:\n\
You have access to two directories:\n\
1. /memories/ - for files and analytics you create (you may create, edit and delete files)\n\
2. /transcripts/ - meeting transcripts, read-only (creating, editing or deleting files is forbidden)\n\
\n\
- In /memories/ you may use: view, create, str_replace, insert, delete, rename\n\
- In /transcripts/ you may ONLY use view\n\
- Check memory before answering and keep it current: remove stale facts, add new details\n\
- The final answer must always be written to a file under /memories/\n\
- When a task covers a large body of data, go through every file; never sample\n\
- Work silently during analysis; after saving the report, reply with a one-line confirmation"
}
