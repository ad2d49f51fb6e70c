//! Memoria: a sandboxed, file-based memory tool for LLM agents.
//!
//! The model sees two virtual roots: `/memories` (read-write) and
//! `/transcripts` (read-only). Hosts hand tool-call input to
//! [`dispatch::respond_json`] and return the [`ToolReply`] to the model, or run
//! `memoria serve --stdio` and speak JSON-RPC.

pub mod command;
pub mod definition;
pub mod dispatch;
pub mod stdio_rpc;
pub mod tool;

pub use command::Command;
pub use dispatch::{respond, respond_json, respond_str, ToolReply};
pub use memoria_fs::ViewRange;
pub use tool::{MemoryStore, MemoryTool};
