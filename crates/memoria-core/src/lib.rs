//! Memoria Core: error taxonomy, configuration, sandbox roots and observability
//! shared by the memory tool crates.

pub mod config;
pub mod error;
pub mod observability;
pub mod path_validation;

pub use error::{MemoryError, Result};
pub use path_validation::{ResolvedPath, RootKind, Roots, MEMORIES_PREFIX, TRANSCRIPTS_PREFIX};
