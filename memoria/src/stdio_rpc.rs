//! Memory tool stdio RPC: JSON-RPC 2.0 over stdio.
//!
//! **Entry**: `memoria serve --stdio`
//!
//! One request per line, one response per line, processed strictly in order:
//! the model's commands build on each other, so a later edit must never race
//! an earlier one.
//!
//! Request: `{"jsonrpc":"2.0","id":1,"method":"memory","params":{"command":"view","path":"/memories"}}`
//! Response: `{"jsonrpc":"2.0","id":1,"result":{"content":"...","is_error":false}}`
//!
//! Tool failures (missing file, read-only root, ...) are *results* with
//! `is_error: true`, since they are meant for the model. JSON-RPC errors are
//! reserved for protocol problems.

use std::io::{self, BufRead, BufReader, Write};

use anyhow::Result;
use serde_json::{json, Value};

use crate::definition;
use crate::dispatch::{self, ToolReply};
use crate::tool::MemoryTool;

/// Maximum JSON-RPC request size (10 MB) to prevent OOM DoS.
const MAX_REQUEST_SIZE: usize = 10 * 1024 * 1024;

const PARSE_ERROR: i64 = -32700;
const INVALID_REQUEST: i64 = -32600;
const METHOD_NOT_FOUND: i64 = -32601;

/// Run the RPC loop on the process's stdin/stdout.
pub fn serve_stdio<T: MemoryTool + ?Sized>(tool: &T) -> Result<()> {
    let stdin = io::stdin();
    let reader = BufReader::new(stdin.lock());
    let stdout = io::stdout();
    serve(tool, reader, stdout.lock())
}

/// Read requests from `reader` until EOF, writing one response line each.
pub fn serve<T, R, W>(tool: &T, mut reader: R, mut writer: W) -> Result<()>
where
    T: MemoryTool + ?Sized,
    R: BufRead,
    W: Write,
{
    tracing::info!("memory stdio RPC ready");
    loop {
        let line = match read_line_limited(&mut reader) {
            Ok(None) => break, // EOF
            Ok(Some(l)) => l,
            // Oversized or non-UTF-8 line: the line was drained, keep serving.
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                let msg = format!("Invalid request: {}", e);
                write_response(&mut writer, &error_response(Value::Null, INVALID_REQUEST, &msg))?;
                continue;
            }
            Err(e) => {
                tracing::error!("stdin read failed: {}", e);
                return Err(e.into());
            }
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Value>(line) {
            Ok(request) => handle_request(tool, &request),
            Err(e) => error_response(Value::Null, PARSE_ERROR, &format!("Parse error: {}", e)),
        };
        write_response(&mut writer, &response)?;
    }
    tracing::info!("memory stdio RPC finished (EOF)");
    Ok(())
}

fn write_response(writer: &mut impl Write, response: &Value) -> io::Result<()> {
    writeln!(writer, "{}", response)?;
    writer.flush()
}

fn error_response(id: Value, code: i64, message: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {"code": code, "message": message}
    })
}

fn reply_value(reply: &ToolReply) -> Value {
    serde_json::to_value(reply)
        .unwrap_or_else(|_| json!({"content": reply.content, "is_error": reply.is_error}))
}

/// Handle one parsed request and build its response object.
pub fn handle_request<T: MemoryTool + ?Sized>(tool: &T, request: &Value) -> Value {
    let id = request.get("id").cloned().unwrap_or(Value::Null);
    let method = request.get("method").and_then(|m| m.as_str()).unwrap_or("");
    let params = request
        .get("params")
        .cloned()
        .unwrap_or(Value::Object(serde_json::Map::new()));

    let result = match method {
        "memory" => reply_value(&dispatch::respond_json(tool, &params)),
        "clear_all_memory" => {
            let reply = match tool.clear_all_memory() {
                Ok(msg) => ToolReply::ok(msg),
                Err(e) => ToolReply::error("clear_all_memory", &e),
            };
            reply_value(&reply)
        }
        "tool_definition" => json!({
            "tool": definition::tool_definition(),
            "function": definition::function_definition(),
            "system_prompt": definition::system_prompt(),
        }),
        "" => return error_response(id, INVALID_REQUEST, "Missing method"),
        other => {
            return error_response(id, METHOD_NOT_FOUND, &format!("Method not found: {}", other))
        }
    };

    json!({"jsonrpc": "2.0", "id": id, "result": result})
}

// ═══════════════════════════════════════════════════════════════════════════════
// Size-Limited Stdin Reader
// ═══════════════════════════════════════════════════════════════════════════════

/// Read a single line from `reader`, enforcing [`MAX_REQUEST_SIZE`].
/// Returns `Ok(None)` on EOF, `Ok(Some(line))` on success.
fn read_line_limited(reader: &mut impl BufRead) -> io::Result<Option<String>> {
    read_line_with_limit(reader, MAX_REQUEST_SIZE)
}

fn read_line_with_limit(reader: &mut impl BufRead, limit: usize) -> io::Result<Option<String>> {
    let mut buf = Vec::new();
    let mut oversized = false;
    loop {
        let available = match reader.fill_buf() {
            Ok(b) => b,
            Err(ref e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        if available.is_empty() {
            if buf.is_empty() && !oversized {
                return Ok(None);
            }
            break;
        }
        match available.iter().position(|&b| b == b'\n') {
            Some(pos) => {
                if !oversized && buf.len() + pos <= limit {
                    buf.extend_from_slice(&available[..pos]);
                } else {
                    oversized = true;
                }
                reader.consume(pos + 1);
                break;
            }
            None => {
                let len = available.len();
                if !oversized && buf.len() + len <= limit {
                    buf.extend_from_slice(available);
                } else {
                    // Keep draining until the newline so the next request starts clean.
                    oversized = true;
                    buf.clear();
                }
                reader.consume(len);
            }
        }
    }

    if oversized {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Request exceeds {} byte size limit", limit),
        ));
    }
    if buf.last() == Some(&b'\r') {
        buf.pop();
    }
    String::from_utf8(buf)
        .map(Some)
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidData, "Invalid UTF-8"))
}
