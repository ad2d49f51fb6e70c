//! Directory listing for `view` on a directory.

use std::fmt;
use std::path::Path;

use memoria_core::{MemoryError, Result};

/// Sorted, hidden-filtered directory entries. `Empty` is kept distinct so the
/// caller can tell "no entries" from a malformed reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    Empty,
    /// Entry names; directories carry a trailing `/`.
    Entries(Vec<String>),
}

impl Listing {
    pub fn entries(&self) -> &[String] {
        match self {
            Self::Empty => &[],
            Self::Entries(items) => items,
        }
    }

    /// Render as the text shown to the model.
    pub fn render(&self, virtual_path: &str) -> String {
        format!("Directory: {}\n{}", virtual_path, self)
    }
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "(empty directory)"),
            Self::Entries(items) => {
                let lines: Vec<String> = items.iter().map(|i| format!("- {}", i)).collect();
                write!(f, "{}", lines.join("\n"))
            }
        }
    }
}

/// List `dir`. Names starting with `.` are skipped; order is lexicographic by name.
pub fn list_directory(dir: &Path, virtual_path: &str) -> Result<Listing> {
    let read = std::fs::read_dir(dir).map_err(|e| MemoryError::io(virtual_path, e))?;

    let mut items = Vec::new();
    for entry in read {
        let entry = entry.map_err(|e| MemoryError::io(virtual_path, e))?;
        let name = entry.file_name().to_string_lossy().to_string();
        if name.starts_with('.') {
            continue;
        }
        // Follows symlinks, so a link to a directory is listed as one.
        if entry.path().is_dir() {
            items.push(format!("{}/", name));
        } else {
            items.push(name);
        }
    }
    items.sort_by(|a, b| a.trim_end_matches('/').cmp(b.trim_end_matches('/')));

    if items.is_empty() {
        Ok(Listing::Empty)
    } else {
        Ok(Listing::Entries(items))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_sorted_and_filtered() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("b.md"), "").unwrap();
        std::fs::write(tmp.path().join("a.md"), "").unwrap();
        std::fs::write(tmp.path().join(".hidden"), "").unwrap();
        std::fs::create_dir(tmp.path().join("notes")).unwrap();
        std::fs::create_dir(tmp.path().join(".git")).unwrap();

        let listing = list_directory(tmp.path(), "/memories").unwrap();
        assert_eq!(listing.entries(), ["a.md", "b.md", "notes/"]);
        assert_eq!(
            listing.render("/memories"),
            "Directory: /memories\n- a.md\n- b.md\n- notes/"
        );
    }

    #[test]
    fn test_list_empty_marker() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join(".keep"), "").unwrap();
        let listing = list_directory(tmp.path(), "/memories").unwrap();
        assert_eq!(listing, Listing::Empty);
        assert_eq!(
            listing.render("/memories"),
            "Directory: /memories\n(empty directory)"
        );
    }

    #[test]
    fn test_list_missing_dir_is_io_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let err = list_directory(&tmp.path().join("nope"), "/memories/nope").unwrap_err();
        assert_eq!(err.code(), "io_failure");
        assert!(err.to_string().contains("/memories/nope"));
    }
}
