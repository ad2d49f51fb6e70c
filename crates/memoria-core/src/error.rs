//! Error taxonomy for the memory tool.
//!
//! Every failure is local to a single command. The `Display` text is fed back
//! to the model verbatim, so each message names the path and the reason.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MemoryError>;

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("Path must start with /memories or /transcripts, got: {path}")]
    InvalidPath { path: String },

    #[error("Path {path} would escape allowed directory")]
    PathEscape { path: String },

    #[error("Cannot {operation} in /transcripts directory (read-only): {path}")]
    ReadOnlyViolation {
        operation: &'static str,
        path: String,
    },

    #[error("Path not found: {path}")]
    NotFound { path: String },

    #[error("Path already exists: {path}")]
    AlreadyExists { path: String },

    #[error("Invalid argument for {path}: {reason}")]
    InvalidArgument { path: String, reason: String },

    #[error("{}", match_message(.path, .needle, .count))]
    AmbiguousMatch {
        path: String,
        needle: String,
        count: usize,
    },

    #[error("I/O failure on {path}: {source}")]
    IoFailure {
        path: String,
        source: std::io::Error,
    },
}

fn match_message(path: &str, needle: &str, count: &usize) -> String {
    if *count == 0 {
        format!("Text `{}` not found in {}", needle, path)
    } else {
        format!(
            "Text `{}` appears {} times in {}. Must be unique.",
            needle, count, path
        )
    }
}

impl MemoryError {
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::IoFailure {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_argument(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Stable snake_case code, used in audit records and JSON-RPC error data.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidPath { .. } => "invalid_path",
            Self::PathEscape { .. } => "path_escape",
            Self::ReadOnlyViolation { .. } => "read_only_violation",
            Self::NotFound { .. } => "not_found",
            Self::AlreadyExists { .. } => "already_exists",
            Self::InvalidArgument { .. } => "invalid_argument",
            Self::AmbiguousMatch { .. } => "ambiguous_match",
            Self::IoFailure { .. } => "io_failure",
        }
    }

    /// Security-relevant failures: the caller tried to leave or write into a protected area.
    pub fn is_violation(&self) -> bool {
        matches!(
            self,
            Self::PathEscape { .. } | Self::ReadOnlyViolation { .. }
        )
    }
}
