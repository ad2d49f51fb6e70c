//! Observability: tracing init and the command audit log.
//!
//! Uses config::ObservabilityConfig for MEMORIA_QUIET, LOG_LEVEL, LOG_JSON, AUDIT_LOG.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing_subscriber::{prelude::*, EnvFilter};

use crate::error::MemoryError;

static AUDIT_PATH: Mutex<Option<String>> = Mutex::new(None);

/// Initialize tracing. Call at process startup.
/// When MEMORIA_QUIET=1, only WARN and above are logged.
///
/// Logs go to stderr: stdout carries JSON-RPC responses in serve mode.
pub fn init_tracing() {
    let cfg = crate::config::ObservabilityConfig::from_env();
    let level: String = if cfg.quiet {
        "memoria=warn".to_string()
    } else {
        cfg.log_level.clone()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    let _ = if cfg.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false),
            )
            .try_init()
    };
}

fn get_audit_path() -> Option<String> {
    {
        let guard = AUDIT_PATH.lock().ok()?;
        if let Some(ref p) = *guard {
            return Some(p.clone());
        }
    }
    let path = crate::config::ObservabilityConfig::from_env()
        .audit_log
        .clone()?;
    if path.is_empty() {
        return None;
    }
    if let Some(parent) = Path::new(&path).parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    {
        let mut guard = AUDIT_PATH.lock().ok()?;
        *guard = Some(path.clone());
    }
    Some(path)
}

fn append_jsonl(path: &Path, record: &serde_json::Value) {
    if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(path) {
        if let Ok(line) = serde_json::to_string(record) {
            let _ = writeln!(f, "{}", line);
        }
    }
}

/// Hex SHA-256 of a command payload; the audit trail records it instead of the text.
pub fn content_sha256(content: &str) -> String {
    hex::encode(Sha256::digest(content.as_bytes()))
}

fn command_record(
    operation: &str,
    path: &str,
    outcome: Result<(), &MemoryError>,
    payload: Option<&str>,
) -> serde_json::Value {
    let (ok, code, message) = match outcome {
        Ok(()) => (true, None, None),
        Err(e) => (false, Some(e.code()), Some(e.to_string())),
    };
    json!({
        "ts": Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        "event": "command_executed",
        "operation": operation,
        "path": path,
        "ok": ok,
        "error_code": code,
        "error": message,
        "payload_sha256": payload.map(content_sha256),
    })
}

/// Audit: command_executed. No-op unless MEMORIA_AUDIT_LOG is set.
pub fn audit_command(
    operation: &str,
    path: &str,
    outcome: Result<(), &MemoryError>,
    payload: Option<&str>,
) {
    if let Some(log) = get_audit_path() {
        audit_command_to(Path::new(&log), operation, path, outcome, payload);
    }
}

pub fn audit_command_to(
    log: &Path,
    operation: &str,
    path: &str,
    outcome: Result<(), &MemoryError>,
    payload: Option<&str>,
) {
    append_jsonl(log, &command_record(operation, path, outcome, payload));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_sha256() {
        assert_eq!(
            content_sha256("hello\n"),
            "5891b5b522d5df086d0ff0b110fbd9d21bb4fc7163af34d08286a2e846f6be03"
        );
    }

    #[test]
    fn test_audit_appends_jsonl() {
        let tmp = tempfile::tempdir().unwrap();
        let log = tmp.path().join("audit.jsonl");

        audit_command_to(&log, "create", "/memories/a.md", Ok(()), Some("hello\n"));
        let err = MemoryError::NotFound {
            path: "/memories/b.md".to_string(),
        };
        audit_command_to(&log, "delete", "/memories/b.md", Err(&err), None);

        let content = std::fs::read_to_string(&log).unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["event"], "command_executed");
        assert_eq!(lines[0]["ok"], true);
        assert_eq!(lines[0]["payload_sha256"], content_sha256("hello\n"));
        assert_eq!(lines[1]["ok"], false);
        assert_eq!(lines[1]["error_code"], "not_found");
        assert!(lines[1]["payload_sha256"].is_null());
    }
}
