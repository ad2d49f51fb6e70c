//! Mutating operations: create, delete, insert, rename, unique replace, clear.
//!
//! Each one checks the read-only flag before anything else, then its own
//! preconditions, then does a single read-modify-write against the tree.

use std::path::Path;

use memoria_core::{MemoryError, ResolvedPath, Result};

use crate::atomic::{write_atomic, write_new};
use crate::viewer::read_text;

/// Fails with `ReadOnlyViolation` when `resolved` lies under the read-only root.
/// `operation` completes the sentence "Cannot {operation} in /transcripts ...".
pub fn ensure_writable(resolved: &ResolvedPath, operation: &'static str) -> Result<()> {
    if resolved.read_only {
        tracing::warn!(path = %resolved.virtual_path, operation, "write to read-only root rejected");
        return Err(MemoryError::ReadOnlyViolation {
            operation,
            path: resolved.virtual_path.clone(),
        });
    }
    Ok(())
}

/// Anything at `path`, including a dangling symlink.
fn occupied(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok()
}

fn not_found(resolved: &ResolvedPath) -> MemoryError {
    MemoryError::NotFound {
        path: resolved.virtual_path.clone(),
    }
}

/// The target must be an existing regular file; a directory counts as missing.
fn require_file(resolved: &ResolvedPath) -> Result<()> {
    match std::fs::metadata(&resolved.real) {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(not_found(resolved)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(not_found(resolved)),
        Err(e) => Err(MemoryError::io(&resolved.virtual_path, e)),
    }
}

fn create_parent(target: &Path, label: &str) -> Result<()> {
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent).map_err(|e| MemoryError::io(label, e))?;
    }
    Ok(())
}

/// Create a new file holding exactly `content`. Parent directories are created.
pub fn create_file(resolved: &ResolvedPath, content: &str) -> Result<()> {
    ensure_writable(resolved, "create files")?;
    if occupied(&resolved.real) {
        return Err(MemoryError::AlreadyExists {
            path: resolved.virtual_path.clone(),
        });
    }
    create_parent(&resolved.real, &resolved.virtual_path)?;
    write_new(&resolved.real, content, &resolved.virtual_path)?;
    tracing::debug!(path = %resolved.virtual_path, bytes = content.len(), "file created");
    Ok(())
}

/// Remove a file. Directories are refused. A symlink is removed itself, its
/// target is left alone.
pub fn delete_file(resolved: &ResolvedPath) -> Result<()> {
    ensure_writable(resolved, "delete files")?;
    let meta = match std::fs::symlink_metadata(&resolved.lexical) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(not_found(resolved)),
        Err(e) => return Err(MemoryError::io(&resolved.virtual_path, e)),
    };
    if meta.is_dir() {
        return Err(MemoryError::invalid_argument(
            &resolved.virtual_path,
            "path is a directory; only files can be deleted",
        ));
    }
    std::fs::remove_file(&resolved.lexical)
        .map_err(|e| MemoryError::io(&resolved.virtual_path, e))?;
    tracing::debug!(path = %resolved.virtual_path, "file deleted");
    Ok(())
}

/// Byte offset where each line starts. A file without a final terminator still
/// counts its last line.
fn line_starts(content: &str) -> Vec<usize> {
    let mut starts = Vec::new();
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        starts.push(offset);
        offset += line.len();
    }
    starts
}

/// Insert `text` as a new line before 0-based line `line` (`0` = start of
/// file, line count = end). Returns the new file content.
pub fn insert_line(resolved: &ResolvedPath, line: i64, text: &str) -> Result<String> {
    ensure_writable(resolved, "modify files")?;
    require_file(resolved)?;

    let content = read_text(&resolved.real, &resolved.virtual_path)?;
    let starts = line_starts(&content);
    let total = starts.len();

    if line < 0 || line as u64 > total as u64 {
        return Err(MemoryError::invalid_argument(
            &resolved.virtual_path,
            format!(
                "insert_line {} is out of range, file has {} line(s) (valid: 0..={})",
                line, total, total
            ),
        ));
    }
    let index = line as usize;
    let at = starts.get(index).copied().unwrap_or(content.len());

    let mut updated = String::with_capacity(content.len() + text.len() + 2);
    updated.push_str(&content[..at]);
    // Keep the new text on its own line when the old last line had no terminator.
    if at == content.len() && !content.is_empty() && !content.ends_with('\n') {
        updated.push('\n');
    }
    updated.push_str(text);
    if !text.ends_with('\n') {
        updated.push('\n');
    }
    updated.push_str(&content[at..]);

    write_atomic(&resolved.real, &updated, &resolved.virtual_path)?;
    tracing::debug!(path = %resolved.virtual_path, line, "line inserted");
    Ok(updated)
}

/// Move `from` to `to`. Both must be writable; `to` must be free.
pub fn rename_path(from: &ResolvedPath, to: &ResolvedPath) -> Result<()> {
    ensure_writable(from, "rename files")?;
    ensure_writable(to, "rename files")?;

    if from.is_root {
        return Err(MemoryError::invalid_argument(
            &from.virtual_path,
            "the memory root itself cannot be renamed",
        ));
    }
    if !occupied(&from.lexical) {
        return Err(not_found(from));
    }
    if occupied(&to.lexical) {
        return Err(MemoryError::AlreadyExists {
            path: to.virtual_path.clone(),
        });
    }
    if to.lexical.starts_with(&from.lexical) {
        return Err(MemoryError::invalid_argument(
            &to.virtual_path,
            format!("cannot move {} into itself", from.virtual_path),
        ));
    }

    create_parent(&to.lexical, &to.virtual_path)?;
    std::fs::rename(&from.lexical, &to.lexical)
        .map_err(|e| MemoryError::io(&from.virtual_path, e))?;
    tracing::debug!(from = %from.virtual_path, to = %to.virtual_path, "path renamed");
    Ok(())
}

/// Replace the single occurrence of `old` with `new`. Zero or several
/// occurrences are refused with `AmbiguousMatch` and the file is left alone.
/// Returns the new file content.
pub fn replace_unique(resolved: &ResolvedPath, old: &str, new: &str) -> Result<String> {
    ensure_writable(resolved, "modify files")?;
    require_file(resolved)?;

    if old.is_empty() {
        return Err(MemoryError::invalid_argument(
            &resolved.virtual_path,
            "old_str must not be empty; use insert to add new text",
        ));
    }

    let content = read_text(&resolved.real, &resolved.virtual_path)?;
    let count = content.matches(old).count();
    if count != 1 {
        return Err(MemoryError::AmbiguousMatch {
            path: resolved.virtual_path.clone(),
            needle: old.to_string(),
            count,
        });
    }

    let updated = content.replacen(old, new, 1);
    write_atomic(&resolved.real, &updated, &resolved.virtual_path)?;
    tracing::debug!(path = %resolved.virtual_path, "unique match replaced");
    Ok(updated)
}

/// Remove everything beneath `root` (which stays). Returns the number of
/// top-level entries removed.
pub fn clear_directory(root: &ResolvedPath) -> Result<usize> {
    ensure_writable(root, "clear files")?;
    let entries =
        std::fs::read_dir(&root.real).map_err(|e| MemoryError::io(&root.virtual_path, e))?;

    let mut removed = 0;
    for entry in entries {
        let entry = entry.map_err(|e| MemoryError::io(&root.virtual_path, e))?;
        let path = entry.path();
        let is_dir = entry
            .file_type()
            .map(|t| t.is_dir())
            .map_err(|e| MemoryError::io(&root.virtual_path, e))?;
        let result = if is_dir {
            std::fs::remove_dir_all(&path)
        } else {
            std::fs::remove_file(&path)
        };
        result.map_err(|e| MemoryError::io(&root.virtual_path, e))?;
        removed += 1;
    }
    tracing::info!(path = %root.virtual_path, removed, "memory cleared");
    Ok(removed)
}
