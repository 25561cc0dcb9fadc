use std::cmp::Ordering;
use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;

use crate::guard::RequestedPath;
use crate::render::parse_date_folder;

/// A single child of a listed directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryEntry {
    File { name: String },
    Folder { name: String },
}

impl DirectoryEntry {
    pub fn name(&self) -> &str {
        match self {
            DirectoryEntry::File { name } | DirectoryEntry::Folder { name } => name,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, DirectoryEntry::Folder { .. })
    }
}

/// Listing order: folders before files, date folders chronologically
/// (oldest first) ahead of other folders, everything else by name.
fn display_order(a: &DirectoryEntry, b: &DirectoryEntry) -> Ordering {
    let rank = |entry: &DirectoryEntry| match entry {
        DirectoryEntry::Folder { name } => match parse_date_folder(name) {
            Some(date) => (0, Some(date)),
            None => (1, None),
        },
        DirectoryEntry::File { .. } => (2, None),
    };

    rank(a)
        .cmp(&rank(b))
        .then_with(|| a.name().cmp(b.name()))
}

/// What a requested path resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Listing {
    /// Canonical path of a regular file
    File(PathBuf),
    Directory(Vec<DirectoryEntry>),
}

/// Resolves requested paths against the storage root.
///
/// Every resolved location must stay inside the directory the
/// request names, after symlinks are followed.
#[derive(Debug, Clone)]
pub struct DirectoryLister {
    root: PathBuf,
}

impl DirectoryLister {
    /// Create a lister over `root`, which must exist
    pub async fn new(root: impl AsRef<Path>) -> Result<Self, ListError> {
        let root = root.as_ref();
        let root = fs::canonicalize(root)
            .await
            .map_err(|e| ListError::Root(root.display().to_string(), e))?;

        if !fs::metadata(&root).await?.is_dir() {
            return Err(ListError::Root(
                root.display().to_string(),
                io::Error::other("not a directory"),
            ));
        }

        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `path` to the canonical location it names.
    ///
    /// The caller is expected to have authorized `path.directory()`
    /// already; this only guarantees containment.
    pub async fn resolve(&self, path: &RequestedPath) -> Result<PathBuf, ListError> {
        if !is_plain_segment(path.directory()) {
            return Err(ListError::NotFound);
        }
        if !path.subpath().iter().all(|segment| is_plain_segment(segment)) {
            tracing::debug!(directory = path.directory(), "rejected path with traversal segment");
            return Err(ListError::NotFound);
        }

        let directory_root = canonicalize_existing(&self.root.join(path.directory())).await?;
        if !directory_root.starts_with(&self.root) {
            return Err(ListError::NotFound);
        }

        let mut target = directory_root.clone();
        target.extend(path.subpath());
        let target = canonicalize_existing(&target).await?;

        if !target.starts_with(&directory_root) {
            tracing::warn!(
                directory = path.directory(),
                "resolved path escapes its directory"
            );
            return Err(ListError::NotFound);
        }

        Ok(target)
    }

    /// Resolve `path` and either hand back the file or enumerate the directory.
    pub async fn list(&self, path: &RequestedPath) -> Result<Listing, ListError> {
        let target = self.resolve(path).await?;
        let metadata = fs::metadata(&target).await.map_err(not_found_or_io)?;

        if metadata.is_file() {
            return Ok(Listing::File(target));
        }
        if !metadata.is_dir() {
            return Err(ListError::NotFound);
        }

        let mut entries = Vec::new();
        let mut read_dir = fs::read_dir(&target).await?;
        while let Some(entry) = read_dir.next_entry().await? {
            // names that can't round-trip through a link are never offered
            let name = match entry.file_name().into_string() {
                Ok(name) if is_plain_segment(&name) => name,
                Ok(name) => {
                    tracing::debug!(entry = %name, "skipping entry with unlinkable name");
                    continue;
                }
                Err(raw) => {
                    tracing::debug!(entry = ?raw, "skipping entry with non UTF-8 name");
                    continue;
                }
            };
            // metadata() follows symlinks, file_type() would not
            let is_dir = match fs::metadata(entry.path()).await {
                Ok(metadata) => metadata.is_dir(),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    tracing::warn!(entry = %name, "skipping dangling symlink");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            entries.push(if is_dir {
                DirectoryEntry::Folder { name }
            } else {
                DirectoryEntry::File { name }
            });
        }
        entries.sort_by(display_order);

        Ok(Listing::Directory(entries))
    }
}

fn is_plain_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\', '\0'])
}

async fn canonicalize_existing(path: &Path) -> Result<PathBuf, ListError> {
    fs::canonicalize(path).await.map_err(not_found_or_io)
}

fn not_found_or_io(e: io::Error) -> ListError {
    match e.kind() {
        io::ErrorKind::NotFound => ListError::NotFound,
        _ => ListError::Io(e),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ListError {
    #[error("not found")]
    NotFound,

    #[error("storage root {0} is unusable: {1}")]
    Root(String, #[source] io::Error),

    #[error("filesystem error: {0}")]
    Io(#[from] io::Error),
}
