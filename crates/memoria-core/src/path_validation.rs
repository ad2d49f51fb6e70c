//! Sandbox roots and virtual path resolution.
//!
//! The caller addresses files through two virtual prefixes: `/memories`
//! (writable) and `/transcripts` (read-only). Every path is resolved against the
//! canonical root it names, following `.`/`..` and symlinks, and must stay inside
//! that root. Anything else is an error, never a clamped path.

use std::collections::VecDeque;
use std::ffi::OsString;
use std::path::{Component, Path, PathBuf};

use crate::error::{MemoryError, Result};

pub const MEMORIES_PREFIX: &str = "/memories";
pub const TRANSCRIPTS_PREFIX: &str = "/transcripts";

/// Upper bound on symlinks followed during one resolution (matches Linux ELOOP).
const MAX_SYMLINK_HOPS: usize = 40;

/// One of the two sandbox roots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootKind {
    Memories,
    Transcripts,
}

impl RootKind {
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Memories => MEMORIES_PREFIX,
            Self::Transcripts => TRANSCRIPTS_PREFIX,
        }
    }

    /// Directory name under the base path.
    pub fn dir_name(self) -> &'static str {
        match self {
            Self::Memories => "memories",
            Self::Transcripts => "transcripts",
        }
    }

    pub fn is_read_only(self) -> bool {
        matches!(self, Self::Transcripts)
    }
}

/// A virtual path resolved to its location on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    /// The caller's original string, used in every message.
    pub virtual_path: String,
    /// Real location with `.`, `..` and symlinks resolved.
    pub real: PathBuf,
    /// Parent resolved, last component kept as named. A symlink in the last
    /// position is the link itself here, which is what delete and rename act on.
    pub lexical: PathBuf,
    pub root: RootKind,
    pub read_only: bool,
    /// True when the path names the root directory itself.
    pub is_root: bool,
}

/// The two canonical sandbox roots under a base directory.
#[derive(Debug, Clone)]
pub struct Roots {
    base: PathBuf,
    memories: PathBuf,
    transcripts: PathBuf,
}

impl Roots {
    /// Create `<base>/memories` and `<base>/transcripts` if missing and
    /// canonicalize both. Idempotent.
    pub fn init(base: impl AsRef<Path>) -> Result<Self> {
        let base = base.as_ref();
        let mut canonical = Vec::with_capacity(2);
        for kind in [RootKind::Memories, RootKind::Transcripts] {
            let dir = base.join(kind.dir_name());
            std::fs::create_dir_all(&dir)
                .map_err(|e| MemoryError::io(dir.display().to_string(), e))?;
            let dir = dir
                .canonicalize()
                .map_err(|e| MemoryError::io(dir.display().to_string(), e))?;
            canonical.push(dir);
        }
        let transcripts = canonical.pop().unwrap_or_default();
        let memories = canonical.pop().unwrap_or_default();

        if memories.starts_with(&transcripts) || transcripts.starts_with(&memories) {
            return Err(MemoryError::invalid_argument(
                base.display().to_string(),
                format!(
                    "memory roots overlap: {} and {}",
                    memories.display(),
                    transcripts.display()
                ),
            ));
        }

        tracing::debug!(
            memories = %memories.display(),
            transcripts = %transcripts.display(),
            "memory roots ready"
        );

        Ok(Self {
            base: base.to_path_buf(),
            memories,
            transcripts,
        })
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn root(&self, kind: RootKind) -> &Path {
        match kind {
            RootKind::Memories => &self.memories,
            RootKind::Transcripts => &self.transcripts,
        }
    }

    pub fn memories(&self) -> &Path {
        &self.memories
    }

    pub fn transcripts(&self) -> &Path {
        &self.transcripts
    }

    /// Resolve a virtual path. Fails with `InvalidPath` for an unknown prefix and
    /// `PathEscape` when the resolved location leaves its root.
    pub fn resolve(&self, virtual_path: &str) -> Result<ResolvedPath> {
        let (kind, rest) = split_virtual_path(virtual_path)?;
        let root = self.root(kind);

        let relative = Path::new(rest);
        if relative.has_root() {
            return Err(escape(virtual_path));
        }

        let real = resolve_under(root, relative, virtual_path)?;
        if !real.starts_with(root) {
            return Err(escape(virtual_path));
        }

        let lexical = match relative.components().next_back() {
            Some(Component::Normal(name)) => {
                let parent = relative.parent().unwrap_or_else(|| Path::new(""));
                resolve_under(root, parent, virtual_path)?.join(name)
            }
            _ => real.clone(),
        };
        if !lexical.starts_with(root) {
            return Err(escape(virtual_path));
        }

        Ok(ResolvedPath {
            virtual_path: virtual_path.to_string(),
            is_root: lexical == root,
            real,
            lexical,
            root: kind,
            read_only: kind.is_read_only(),
        })
    }
}

fn escape(virtual_path: &str) -> MemoryError {
    tracing::warn!(path = %virtual_path, "path escape rejected");
    MemoryError::PathEscape {
        path: virtual_path.to_string(),
    }
}

/// Split `"/memories/a/b"` into `(Memories, "a/b")`. The marker must be the
/// whole first segment.
fn split_virtual_path(virtual_path: &str) -> Result<(RootKind, &str)> {
    for kind in [RootKind::Memories, RootKind::Transcripts] {
        if let Some(rest) = virtual_path.strip_prefix(kind.prefix()) {
            if rest.is_empty() || rest.starts_with('/') {
                return Ok((kind, rest.trim_start_matches('/')));
            }
        }
    }
    Err(MemoryError::InvalidPath {
        path: virtual_path.to_string(),
    })
}

enum Segment {
    Root(OsString),
    Parent,
    Normal(OsString),
}

fn push_segments(queue: &mut VecDeque<Segment>, path: &Path) {
    let mut segments = Vec::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => {
                segments.push(Segment::Root(component.as_os_str().to_os_string()))
            }
            Component::CurDir => {}
            Component::ParentDir => segments.push(Segment::Parent),
            Component::Normal(name) => segments.push(Segment::Normal(name.to_os_string())),
        }
    }
    for segment in segments.into_iter().rev() {
        queue.push_front(segment);
    }
}

/// Walk `relative` from `root` the way the kernel would: existing symlinks are
/// followed (dangling ones too), `..` pops physically, and components that do
/// not exist yet are appended as-is. A link that cannot be read or a chain
/// longer than [`MAX_SYMLINK_HOPS`] is an error, never a partial result.
fn resolve_under(root: &Path, relative: &Path, virtual_path: &str) -> Result<PathBuf> {
    let mut current = root.to_path_buf();
    let mut queue = VecDeque::new();
    push_segments(&mut queue, relative);
    let mut hops = 0usize;

    while let Some(segment) = queue.pop_front() {
        match segment {
            Segment::Root(r) => current.push(r),
            Segment::Parent => {
                current.pop();
            }
            Segment::Normal(name) => {
                let candidate = current.join(&name);
                let is_symlink = std::fs::symlink_metadata(&candidate)
                    .map(|m| m.file_type().is_symlink())
                    .unwrap_or(false);
                if !is_symlink {
                    current = candidate;
                    continue;
                }
                hops += 1;
                if hops > MAX_SYMLINK_HOPS {
                    tracing::warn!(path = %virtual_path, hops, "symlink chain rejected");
                    return Err(MemoryError::invalid_argument(
                        virtual_path,
                        "too many levels of symbolic links",
                    ));
                }
                let target = std::fs::read_link(&candidate)
                    .map_err(|e| MemoryError::io(virtual_path, e))?;
                if target.is_absolute() {
                    current = PathBuf::new();
                }
                push_segments(&mut queue, &target);
            }
        }
    }
    Ok(current)
}
