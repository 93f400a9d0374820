//! Layout of an LDraw installation.
//!
//! A complete setup has up to four roots: the official `parts/` and `p/`
//! directories and, optionally, the same two directories from an unofficial
//! supplement. Official roots are primary tier, unofficial roots are override
//! tier.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::resolver::{FileResolver, SearchRoot};
use crate::Result;

/// Name of the parts directory inside an LDraw root.
pub const PARTS_DIR: &str = "parts";
/// Name of the primitives directory inside an LDraw root.
pub const PRIMITIVES_DIR: &str = "p";

/// Directories making up a part library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryConfig {
    pub parts_dir: PathBuf,
    pub primitives_dir: PathBuf,
    pub unofficial_parts_dir: Option<PathBuf>,
    pub unofficial_primitives_dir: Option<PathBuf>,
}

impl LibraryConfig {
    pub fn new(parts_dir: impl Into<PathBuf>, primitives_dir: impl Into<PathBuf>) -> Self {
        Self {
            parts_dir: parts_dir.into(),
            primitives_dir: primitives_dir.into(),
            unofficial_parts_dir: None,
            unofficial_primitives_dir: None,
        }
    }

    /// Use `<root>/parts` and `<root>/p`.
    pub fn from_ldraw_root(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        Self::new(root.join(PARTS_DIR), root.join(PRIMITIVES_DIR))
    }

    /// Set the unofficial parts directory.
    pub fn unofficial_parts(mut self, dir: impl Into<PathBuf>) -> Self {
        self.unofficial_parts_dir = Some(dir.into());
        self
    }

    /// Set the unofficial primitives directory.
    pub fn unofficial_primitives(mut self, dir: impl Into<PathBuf>) -> Self {
        self.unofficial_primitives_dir = Some(dir.into());
        self
    }

    /// Use `<root>/parts` and `<root>/p` of an unofficial library.
    pub fn unofficial_root(self, root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        self.unofficial_parts(root.join(PARTS_DIR))
            .unofficial_primitives(root.join(PRIMITIVES_DIR))
    }

    /// Search roots in resolution order: official first, then unofficial.
    pub fn search_roots(&self) -> Vec<SearchRoot> {
        let mut roots = vec![
            SearchRoot::official(&self.parts_dir),
            SearchRoot::official(&self.primitives_dir),
        ];
        if let Some(ref dir) = self.unofficial_parts_dir {
            roots.push(SearchRoot::unofficial(dir));
        }
        if let Some(ref dir) = self.unofficial_primitives_dir {
            roots.push(SearchRoot::unofficial(dir));
        }
        roots
    }

    /// Directories holding top-level parts, official first.
    pub fn part_dirs(&self) -> Vec<&Path> {
        let mut dirs = vec![self.parts_dir.as_path()];
        if let Some(ref dir) = self.unofficial_parts_dir {
            dirs.push(dir.as_path());
        }
        dirs
    }

    /// Index all roots.
    pub fn build_resolver(&self) -> Result<FileResolver> {
        FileResolver::new(&self.search_roots())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::resolver::LibraryTier;

    #[test]
    fn test_search_roots_order() {
        let config = LibraryConfig::from_ldraw_root("/ldraw").unofficial_root("/ldrawunf");
        let roots = config.search_roots();

        assert_eq!(roots.len(), 4);
        assert_eq!(roots[0].path, Path::new("/ldraw/parts"));
        assert_eq!(roots[1].path, Path::new("/ldraw/p"));
        assert_eq!(roots[2].path, Path::new("/ldrawunf/parts"));
        assert_eq!(roots[3].path, Path::new("/ldrawunf/p"));
        assert_eq!(roots[0].tier, LibraryTier::Primary);
        assert_eq!(roots[1].tier, LibraryTier::Primary);
        assert_eq!(roots[2].tier, LibraryTier::Override);
        assert_eq!(roots[3].tier, LibraryTier::Override);
    }

    #[test]
    fn test_official_only() {
        let config = LibraryConfig::new("/ldraw/parts", "/ldraw/p");

        assert_eq!(config.search_roots().len(), 2);
        assert_eq!(config.part_dirs(), vec![Path::new("/ldraw/parts")]);
    }

    #[test]
    fn test_part_dirs_include_unofficial_parts() {
        let config = LibraryConfig::new("/ldraw/parts", "/ldraw/p")
            .unofficial_parts("/unf/parts")
            .unofficial_primitives("/unf/p");

        assert_eq!(
            config.part_dirs(),
            vec![Path::new("/ldraw/parts"), Path::new("/unf/parts")]
        );
    }
}
