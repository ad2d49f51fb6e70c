//! File reader / line viewer.

use std::path::Path;

use memoria_core::{MemoryError, Result};

/// Width of the right-aligned line-number column.
const LINE_NUMBER_WIDTH: usize = 4;

/// Inclusive `[start, end]` line range, 1-based. `end == -1` reads to end of file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewRange {
    pub start: i64,
    pub end: i64,
}

impl ViewRange {
    pub const TO_END: i64 = -1;

    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Build from the wire form `[start, end]`.
    pub fn from_slice(values: &[i64], virtual_path: &str) -> Result<Self> {
        match values {
            [start, end] => Ok(Self::new(*start, *end)),
            _ => Err(MemoryError::invalid_argument(
                virtual_path,
                format!(
                    "view_range must be [start, end], got {} value(s)",
                    values.len()
                ),
            )),
        }
    }

    /// 0-based half-open bounds into a file of `total` lines. `start` below 1
    /// is clamped to 1 and `end` past EOF to EOF; an inverted range is empty.
    pub fn bounds(&self, total: usize, virtual_path: &str) -> Result<(usize, usize)> {
        if self.end < Self::TO_END {
            return Err(MemoryError::invalid_argument(
                virtual_path,
                format!(
                    "view_range end must be -1 (end of file) or a line number, got {}",
                    self.end
                ),
            ));
        }
        let start = (self.start.max(1) - 1) as usize;
        let end = if self.end == Self::TO_END {
            total
        } else {
            (self.end as usize).min(total)
        };
        let start = start.min(end);
        Ok((start, end))
    }
}

/// Split into lines without terminators (`\n` or `\r\n`).
pub fn split_lines(content: &str) -> Vec<&str> {
    content.lines().collect()
}

/// Number `lines`, the first one as `first_number`.
pub fn number_lines(lines: &[&str], first_number: usize) -> String {
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            format!(
                "{:>width$}: {}",
                first_number + i,
                line,
                width = LINE_NUMBER_WIDTH
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn read_text(path: &Path, virtual_path: &str) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            MemoryError::NotFound {
                path: virtual_path.to_string(),
            }
        } else {
            MemoryError::io(virtual_path, e)
        }
    })
}

/// Read `path` and render it with original line numbers, optionally sliced.
pub fn view_file(path: &Path, virtual_path: &str, range: Option<ViewRange>) -> Result<String> {
    let content = read_text(path, virtual_path)?;
    let lines = split_lines(&content);
    let (start, end) = match range {
        Some(range) => range.bounds(lines.len(), virtual_path)?,
        None => (0, lines.len()),
    };
    Ok(number_lines(&lines[start..end], start + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(tmp: &tempfile::TempDir) -> std::path::PathBuf {
        let path = tmp.path().join("f.txt");
        std::fs::write(&path, "one\ntwo\r\nthree\nfour\nfive\n").unwrap();
        path
    }

    #[test]
    fn test_view_whole_file() {
        let tmp = tempfile::tempdir().unwrap();
        let out = view_file(&sample(&tmp), "/memories/f.txt", None).unwrap();
        assert_eq!(
            out,
            "   1: one\n   2: two\n   3: three\n   4: four\n   5: five"
        );
    }

    #[test]
    fn test_view_range_keeps_original_numbers() {
        let tmp = tempfile::tempdir().unwrap();
        let path = sample(&tmp);
        let out = view_file(&path, "/memories/f.txt", Some(ViewRange::new(2, 3))).unwrap();
        assert_eq!(out, "   2: two\n   3: three");

        let out = view_file(&path, "/memories/f.txt", Some(ViewRange::new(4, -1))).unwrap();
        assert_eq!(out, "   4: four\n   5: five");
    }

    #[test]
    fn test_view_range_clamping() {
        let tmp = tempfile::tempdir().unwrap();
        let path = sample(&tmp);
        let out = view_file(&path, "/memories/f.txt", Some(ViewRange::new(-5, 1))).unwrap();
        assert_eq!(out, "   1: one");

        let out = view_file(&path, "/memories/f.txt", Some(ViewRange::new(5, 99))).unwrap();
        assert_eq!(out, "   5: five");

        let out = view_file(&path, "/memories/f.txt", Some(ViewRange::new(4, 2))).unwrap();
        assert_eq!(out, "");

        let out = view_file(&path, "/memories/f.txt", Some(ViewRange::new(10, -1))).unwrap();
        assert_eq!(out, "");
    }

    #[test]
    fn test_view_range_rejects_bad_end() {
        let tmp = tempfile::tempdir().unwrap();
        let err = view_file(&sample(&tmp), "/memories/f.txt", Some(ViewRange::new(1, -3)))
            .unwrap_err();
        assert_eq!(err.code(), "invalid_argument");
    }

    #[test]
    fn test_view_range_from_slice() {
        assert_eq!(
            ViewRange::from_slice(&[3, -1], "/memories/a").unwrap(),
            ViewRange::new(3, -1)
        );
        assert!(ViewRange::from_slice(&[3], "/memories/a").is_err());
        assert!(ViewRange::from_slice(&[1, 2, 3], "/memories/a").is_err());
    }

    #[test]
    fn test_view_missing_and_binary() {
        let tmp = tempfile::tempdir().unwrap();
        let err = view_file(&tmp.path().join("nope"), "/memories/nope", None).unwrap_err();
        assert_eq!(err.code(), "not_found");

        let bin = tmp.path().join("bin");
        std::fs::write(&bin, [0xff, 0xfe, 0x00]).unwrap();
        let err = view_file(&bin, "/memories/bin", None).unwrap_err();
        assert_eq!(err.code(), "io_failure");
    }

    #[test]
    fn test_wide_line_numbers_are_not_truncated() {
        let lines: Vec<&str> = vec!["x"; 2];
        assert_eq!(number_lines(&lines, 12345), "12345: x\n12346: x");
    }
}
