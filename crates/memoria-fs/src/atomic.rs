//! Full-file rewrites through a sibling temp file and a rename, so readers see
//! either the old content or the new one, never a torn write.

use std::io::Write;
use std::path::Path;

use memoria_core::{MemoryError, Result};
use tempfile::NamedTempFile;

fn temp_beside(target: &Path, label: &str) -> Result<NamedTempFile> {
    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    tempfile::Builder::new()
        .prefix(".memoria-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| MemoryError::io(label, e))
}

fn fill(tmp: &mut NamedTempFile, content: &str, label: &str) -> Result<()> {
    tmp.write_all(content.as_bytes())
        .and_then(|_| tmp.as_file().sync_all())
        .map_err(|e| MemoryError::io(label, e))
}

/// Replace `target` with `content`. Existing permissions are kept.
/// `label` is the virtual path used in error messages.
pub fn write_atomic(target: &Path, content: &str, label: &str) -> Result<()> {
    let mut tmp = temp_beside(target, label)?;
    fill(&mut tmp, content, label)?;
    if let Ok(meta) = std::fs::metadata(target) {
        std::fs::set_permissions(tmp.path(), meta.permissions())
            .map_err(|e| MemoryError::io(label, e))?;
    }
    tmp.persist(target)
        .map_err(|e| MemoryError::io(label, e.error))?;
    Ok(())
}

/// Write a new file; fails with `AlreadyExists` if something appeared at `target`
/// in the meantime.
pub fn write_new(target: &Path, content: &str, label: &str) -> Result<()> {
    let mut tmp = temp_beside(target, label)?;
    fill(&mut tmp, content, label)?;
    tmp.persist_noclobber(target).map_err(|e| {
        if e.error.kind() == std::io::ErrorKind::AlreadyExists {
            MemoryError::AlreadyExists {
                path: label.to_string(),
            }
        } else {
            MemoryError::io(label, e.error)
        }
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_atomic_replaces_and_leaves_no_temp() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("a.md");
        std::fs::write(&target, "old").unwrap();

        write_atomic(&target, "new content\n", "/memories/a.md").unwrap();
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "new content\n");

        let leftovers: Vec<_> = std::fs::read_dir(tmp.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_write_atomic_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("a.md");
        std::fs::write(&target, "old").unwrap();
        std::fs::set_permissions(&target, std::fs::Permissions::from_mode(0o640)).unwrap();

        write_atomic(&target, "new", "/memories/a.md").unwrap();
        let mode = std::fs::metadata(&target).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o640);
    }

    #[test]
    fn test_write_new_refuses_existing() {
        let tmp = tempfile::tempdir().unwrap();
        let target = tmp.path().join("a.md");
        write_new(&target, "first", "/memories/a.md").unwrap();
        let err = write_new(&target, "second", "/memories/a.md").unwrap_err();
        assert!(matches!(err, MemoryError::AlreadyExists { .. }));
        assert_eq!(std::fs::read_to_string(&target).unwrap(), "first");
    }
}
