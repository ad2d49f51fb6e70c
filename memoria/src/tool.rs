//! The memory tool capability: a trait hosts program against, and the
//! filesystem-backed implementation.

use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use memoria_core::config::PathsConfig;
use memoria_core::{MemoryError, Result, RootKind, Roots};
use memoria_fs::{self as fs, ViewRange};

use crate::command::Command;

/// Substituted when the model omits `file_text`.
pub const FILE_TEXT_PLACEHOLDER: &str = "[PLACEHOLDER: file_text was not provided]";
/// Substituted when the model omits `insert_text`.
pub const INSERT_TEXT_PLACEHOLDER: &str = "[PLACEHOLDER: insert_text was not provided]";
/// Substituted when the model omits `new_str`.
pub const NEW_STR_PLACEHOLDER: &str = "[PLACEHOLDER: new_str was not provided]";

/// The operations a host loop can invoke. Hosts depend on this trait only.
///
/// Each call is independent; all durable state is the file tree.
pub trait MemoryTool: Send + Sync {
    /// Directory listing or line-numbered file content.
    fn view(&self, path: &str, view_range: Option<ViewRange>) -> Result<String>;

    fn create(&self, path: &str, file_text: Option<&str>) -> Result<String>;

    /// Replace the single occurrence of `old_str`.
    fn str_replace(&self, path: &str, old_str: Option<&str>, new_str: Option<&str>)
        -> Result<String>;

    /// Insert before 0-based line `insert_line`.
    fn insert(&self, path: &str, insert_line: i64, insert_text: Option<&str>) -> Result<String>;

    fn delete(&self, path: &str) -> Result<String>;

    fn rename(&self, old_path: &str, new_path: &str) -> Result<String>;

    /// Wipe the writable root. Not reachable from model commands.
    fn clear_all_memory(&self) -> Result<String>;

    /// Route a decoded command to its operation.
    fn execute(&self, command: &Command) -> Result<String> {
        match command {
            Command::View { path, view_range } => {
                let range = view_range
                    .as_deref()
                    .map(|r| ViewRange::from_slice(r, path))
                    .transpose()?;
                self.view(path, range)
            }
            Command::Create { path, file_text } => self.create(path, file_text.as_deref()),
            Command::StrReplace {
                path,
                old_str,
                new_str,
            } => self.str_replace(path, old_str.as_deref(), new_str.as_deref()),
            Command::Insert {
                path,
                insert_line,
                insert_text,
            } => self.insert(path, *insert_line, insert_text.as_deref()),
            Command::Delete { path } => self.delete(path),
            Command::Rename { old_path, new_path } => self.rename(old_path, new_path),
        }
    }
}

/// [`MemoryTool`] over `<base>/memories` (read-write) and `<base>/transcripts`
/// (read-only).
///
/// Safe to share between threads: views take a root's read lock, mutations
/// take the write lock of the memories root, so a rewrite never interleaves
/// with another read-modify-write on the same tree.
#[derive(Debug)]
pub struct MemoryStore {
    roots: Roots,
    memories_lock: RwLock<()>,
    transcripts_lock: RwLock<()>,
}

impl MemoryStore {
    /// Initialize both roots under `base` (creating them if needed).
    pub fn open(base: impl AsRef<Path>) -> Result<Self> {
        let roots = Roots::init(base)?;
        tracing::info!(base = %roots.base().display(), "memory store opened");
        Ok(Self {
            roots,
            memories_lock: RwLock::new(()),
            transcripts_lock: RwLock::new(()),
        })
    }

    pub fn from_config(cfg: &PathsConfig) -> Result<Self> {
        Self::open(&cfg.base_path)
    }

    pub fn roots(&self) -> &Roots {
        &self.roots
    }

    fn lock(&self, kind: RootKind) -> &RwLock<()> {
        match kind {
            RootKind::Memories => &self.memories_lock,
            RootKind::Transcripts => &self.transcripts_lock,
        }
    }

    // Poisoned locks are recovered: writes are whole-file renames.
    fn read(&self, kind: RootKind) -> RwLockReadGuard<'_, ()> {
        self.lock(kind).read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, ()> {
        self.lock(RootKind::Memories)
            .write()
            .unwrap_or_else(|e| e.into_inner())
    }
}

fn or_placeholder<'a>(
    text: Option<&'a str>,
    placeholder: &'a str,
    field: &str,
    path: &str,
) -> &'a str {
    text.unwrap_or_else(|| {
        tracing::warn!(path, field, "missing payload replaced with placeholder");
        placeholder
    })
}

impl MemoryTool for MemoryStore {
    fn view(&self, path: &str, view_range: Option<ViewRange>) -> Result<String> {
        let resolved = self.roots.resolve(path)?;
        let _guard = self.read(resolved.root);

        if resolved.real.is_dir() {
            let listing = fs::list_directory(&resolved.real, path)?;
            Ok(listing.render(path))
        } else if resolved.real.is_file() {
            fs::view_file(&resolved.real, path, view_range)
        } else {
            Err(MemoryError::NotFound {
                path: path.to_string(),
            })
        }
    }

    fn create(&self, path: &str, file_text: Option<&str>) -> Result<String> {
        let resolved = self.roots.resolve(path)?;
        fs::ensure_writable(&resolved, "create files")?;
        let text = or_placeholder(file_text, FILE_TEXT_PLACEHOLDER, "file_text", path);

        let _guard = self.write();
        fs::create_file(&resolved, text)?;
        Ok(format!("File created successfully at {}", path))
    }

    fn str_replace(
        &self,
        path: &str,
        old_str: Option<&str>,
        new_str: Option<&str>,
    ) -> Result<String> {
        let resolved = self.roots.resolve(path)?;
        fs::ensure_writable(&resolved, "modify files")?;
        let old = old_str.ok_or_else(|| {
            MemoryError::invalid_argument(path, "old_str is required; use insert to add new text")
        })?;
        let new = or_placeholder(new_str, NEW_STR_PLACEHOLDER, "new_str", path);

        let _guard = self.write();
        fs::replace_unique(&resolved, old, new)?;
        Ok(format!("File {} has been edited", path))
    }

    fn insert(&self, path: &str, insert_line: i64, insert_text: Option<&str>) -> Result<String> {
        let resolved = self.roots.resolve(path)?;
        fs::ensure_writable(&resolved, "modify files")?;
        let text = or_placeholder(insert_text, INSERT_TEXT_PLACEHOLDER, "insert_text", path);

        let _guard = self.write();
        fs::insert_line(&resolved, insert_line, text)?;
        Ok(format!("Content inserted at line {} in {}", insert_line, path))
    }

    fn delete(&self, path: &str) -> Result<String> {
        let resolved = self.roots.resolve(path)?;
        let _guard = self.write();
        fs::delete_file(&resolved)?;
        Ok(format!("File deleted successfully: {}", path))
    }

    fn rename(&self, old_path: &str, new_path: &str) -> Result<String> {
        let from = self.roots.resolve(old_path)?;
        let to = self.roots.resolve(new_path)?;
        let _guard = self.write();
        fs::rename_path(&from, &to)?;
        Ok(format!("File renamed from {} to {}", old_path, new_path))
    }

    fn clear_all_memory(&self) -> Result<String> {
        let root = self.roots.resolve(RootKind::Memories.prefix())?;
        let _guard = self.write();
        let removed = fs::clear_directory(&root)?;
        Ok(format!("All memory cleared ({} entries removed)", removed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, MemoryStore) {
        let tmp = tempfile::tempdir().unwrap();
        let store = MemoryStore::open(tmp.path()).unwrap();
        (tmp, store)
    }

    #[test]
    fn test_placeholders_for_missing_payloads() {
        let (_tmp, store) = store();
        store.create("/memories/a.md", None).unwrap();
        let real = store.roots().memories().join("a.md");
        assert_eq!(std::fs::read_to_string(&real).unwrap(), FILE_TEXT_PLACEHOLDER);

        store.insert("/memories/a.md", 0, None).unwrap();
        assert!(std::fs::read_to_string(&real)
            .unwrap()
            .starts_with(INSERT_TEXT_PLACEHOLDER));

        store
            .str_replace("/memories/a.md", Some(FILE_TEXT_PLACEHOLDER), None)
            .unwrap();
        assert!(std::fs::read_to_string(&real)
            .unwrap()
            .ends_with(NEW_STR_PLACEHOLDER));
    }

    #[test]
    fn test_missing_old_str_is_rejected() {
        let (_tmp, store) = store();
        store.create("/memories/a.md", Some("abc")).unwrap();
        let err = store.str_replace("/memories/a.md", None, Some("x")).unwrap_err();
        assert_eq!(err.code(), "invalid_argument");
    }

    #[test]
    fn test_read_only_wins_over_missing_payload() {
        let (_tmp, store) = store();
        let err = store.str_replace("/transcripts/t.txt", None, None).unwrap_err();
        assert!(matches!(err, MemoryError::ReadOnlyViolation { .. }));
    }

    #[test]
    fn test_view_dispatch() {
        let (_tmp, store) = store();
        assert_eq!(
            store.view("/memories", None).unwrap(),
            "Directory: /memories\n(empty directory)"
        );
        store.create("/memories/a.md", Some("x\ny\n")).unwrap();
        assert_eq!(
            store.view("/memories", None).unwrap(),
            "Directory: /memories\n- a.md"
        );
        assert_eq!(
            store
                .view("/memories/a.md", Some(ViewRange::new(2, -1)))
                .unwrap(),
            "   2: y"
        );
        assert_eq!(store.view("/memories/b.md", None).unwrap_err().code(), "not_found");
    }

    #[test]
    fn test_execute_routes_view_range() {
        let (_tmp, store) = store();
        store.create("/memories/a.md", Some("1\n2\n3\n")).unwrap();
        let cmd = Command::View {
            path: "/memories/a.md".to_string(),
            view_range: Some(vec![2, 2]),
        };
        assert_eq!(store.execute(&cmd).unwrap(), "   2: 2");

        let cmd = Command::View {
            path: "/memories/a.md".to_string(),
            view_range: Some(vec![2]),
        };
        assert_eq!(store.execute(&cmd).unwrap_err().code(), "invalid_argument");
    }

    #[test]
    fn test_clear_all_memory() {
        let (_tmp, store) = store();
        store.create("/memories/a.md", Some("x")).unwrap();
        store.create("/memories/dir/b.md", Some("y")).unwrap();
        let msg = store.clear_all_memory().unwrap();
        assert!(msg.starts_with("All memory cleared"));
        assert_eq!(
            store.view("/memories", None).unwrap(),
            "Directory: /memories\n(empty directory)"
        );
    }

    #[test]
    fn test_concurrent_inserts_all_land() {
        let (_tmp, store) = store();
        store.create("/memories/log.md", Some("")).unwrap();
        std::thread::scope(|s| {
            for i in 0..8 {
                let store = &store;
                s.spawn(move || {
                    store
                        .insert("/memories/log.md", 0, Some(&format!("entry {}", i)))
                        .unwrap();
                });
            }
        });
        let content = std::fs::read_to_string(store.roots().memories().join("log.md")).unwrap();
        assert_eq!(content.lines().count(), 8);
    }
}
