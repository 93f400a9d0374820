//! Tiered, case-insensitive file resolution across LDraw libraries.
//!
//! LDraw documents reference each other by relative file name (`stud.dat`,
//! `s\3070bs01.dat`, `48\1-4ring15.dat`). The resolver walks every configured
//! search root once and builds a `FileKey -> path` index so that references
//! can be turned into concrete files without touching the filesystem again.
//!
//! Roots come in two tiers:
//!
//! - **Primary** (official parts and primitives): a key may only be defined
//!   once. A duplicate means the library is corrupted and construction fails.
//! - **Override** (unofficial parts and primitives): only fills gaps. A key
//!   that is already known keeps its first location.

use std::collections::HashMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::StudError;
use crate::Result;

/// Case-folded, forward-slash relative path used to look up LDraw files.
///
/// Two names that differ only in case or in `\` vs `/` separators produce
/// the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileKey(String);

impl FileKey {
    /// Normalize a file name as it appears in a reference line.
    pub fn new(name: impl AsRef<str>) -> Self {
        let normalized = name.as_ref().trim().replace('\\', "/").to_lowercase();
        let trimmed = normalized.trim_start_matches("./");
        Self(trimmed.to_string())
    }

    /// Build a key from a path relative to a search root.
    pub fn from_relative_path(path: &Path) -> Self {
        let joined = path
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/");
        Self::new(joined)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Final path segment (`s/3070bs01.dat` -> `3070bs01.dat`).
    pub fn file_name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for FileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FileKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl AsRef<str> for FileKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Precedence class of a search root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LibraryTier {
    /// Official library: duplicates are a hard error.
    Primary,
    /// Unofficial supplement: never shadows an existing entry.
    Override,
}

/// A directory to index, tagged with its tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRoot {
    pub path: PathBuf,
    pub tier: LibraryTier,
}

impl SearchRoot {
    /// An official (primary tier) root.
    pub fn official(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            tier: LibraryTier::Primary,
        }
    }

    /// An unofficial (override tier) root.
    pub fn unofficial(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            tier: LibraryTier::Override,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    path: PathBuf,
    tier: LibraryTier,
}

/// Name to location index over an ordered list of search roots.
#[derive(Debug, Clone, Default)]
pub struct FileResolver {
    files: HashMap<FileKey, Entry>,
}

impl FileResolver {
    /// Index every file below `roots`, in order.
    ///
    /// Fails with [`StudError::DuplicateFile`] when a primary-tier root
    /// redefines a key from an earlier primary root, and with
    /// [`StudError::PathNotFound`] when a root does not exist. A primary file
    /// replaces an override entry registered before it.
    pub fn new(roots: &[SearchRoot]) -> Result<Self> {
        let mut resolver = Self::default();
        for root in roots {
            resolver.add_root(root)?;
        }
        info!(files = resolver.len(), roots = roots.len(), "Built file index");
        Ok(resolver)
    }

    fn add_root(&mut self, root: &SearchRoot) -> Result<()> {
        if !root.path.is_dir() {
            return Err(StudError::PathNotFound(root.path.clone()));
        }

        let mut added = 0usize;
        let walker = WalkDir::new(&root.path)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter();

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!(root = %root.path.display(), error = %e, "Skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let relative = path.strip_prefix(&root.path).unwrap_or(path);
            let key = FileKey::from_relative_path(relative);

            if let Some(existing) = self.files.get(&key) {
                let existing_path = existing.path.display();
                match (existing.tier, root.tier) {
                    (LibraryTier::Primary, LibraryTier::Primary) => {
                        return Err(StudError::DuplicateFile {
                            key,
                            first: existing.path.clone(),
                            second: path.to_path_buf(),
                        });
                    }
                    (_, LibraryTier::Override) => {
                        debug!(%key, kept = %existing_path, "Ignoring override duplicate");
                        continue;
                    }
                    (LibraryTier::Override, LibraryTier::Primary) => {
                        debug!(%key, replaced = %existing_path, "Primary file replaces override");
                    }
                }
            }

            let entry = Entry {
                path: path.to_path_buf(),
                tier: root.tier,
            };
            self.files.insert(key, entry);
            added += 1;
        }

        debug!(root = %root.path.display(), tier = ?root.tier, added, "Indexed search root");
        Ok(())
    }

    /// Location backing `key`, or [`StudError::KeyNotFound`].
    pub fn resolve(&self, key: &FileKey) -> Result<&Path> {
        self.get(key)
            .ok_or_else(|| StudError::KeyNotFound(key.clone()))
    }

    /// Location backing `key`, if any.
    pub fn get(&self, key: &FileKey) -> Option<&Path> {
        self.files.get(key).map(|e| e.path.as_path())
    }

    /// Look up a raw file name (normalized first).
    pub fn lookup(&self, name: &str) -> Option<&Path> {
        self.get(&FileKey::new(name))
    }

    pub fn contains(&self, key: &FileKey) -> bool {
        self.files.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Tier that provided `key`, if any.
    pub fn tier(&self, key: &FileKey) -> Option<LibraryTier> {
        self.files.get(key).map(|e| e.tier)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FileKey, &Path)> {
        self.files.iter().map(|(k, e)| (k, e.path.as_path()))
    }
}
