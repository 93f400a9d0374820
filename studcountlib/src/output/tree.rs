//! Sub-file tree report.
//!
//! Lists every file reachable from a part, depth-first in reference order,
//! with the stud category of each. Useful for tracking down why a part ends
//! up with an unexpected count.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::data::document::LdrawDocument;
use crate::data::file_type::{file_type_for_name, FileTypeTag};
use crate::error::StudError;
use crate::source::resolver::FileResolver;
use crate::Result;

/// One reported file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    pub name: String,
    pub depth: usize,
    pub file_type: FileTypeTag,
}

/// Depth-first listing of the files below a part.
#[derive(Debug, Clone, Serialize)]
pub struct SubfileTree {
    pub root: PathBuf,
    pub nodes: Vec<TreeNode>,
}

impl SubfileTree {
    /// Walk everything referenced from `location`.
    ///
    /// With a `prefix`, only files whose name starts with it
    /// (case-insensitively) are reported; traversal still continues below
    /// non-matching files. Stud primitives are reported but not expanded.
    pub fn build(location: &Path, resolver: &FileResolver, prefix: Option<&str>) -> Result<Self> {
        let prefix = prefix.map(str::to_lowercase);
        let mut nodes = Vec::new();
        walk(location, resolver, prefix.as_deref(), 0, &mut nodes)?;
        Ok(Self {
            root: location.to_path_buf(),
            nodes,
        })
    }

    /// Number of reported nodes with the given tag.
    pub fn count(&self, file_type: FileTypeTag) -> usize {
        self.nodes.iter().filter(|n| n.file_type == file_type).count()
    }
}

fn walk(
    location: &Path,
    resolver: &FileResolver,
    prefix: Option<&str>,
    depth: usize,
    nodes: &mut Vec<TreeNode>,
) -> Result<()> {
    let name = location
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_type = file_type_for_name(&name);

    if prefix.is_none_or(|p| name.to_lowercase().starts_with(p)) {
        nodes.push(TreeNode {
            name,
            depth,
            file_type,
        });
    }

    if file_type != FileTypeTag::Unknown {
        return Ok(());
    }

    let document = LdrawDocument::read(location)?;
    for key in document.sub_files() {
        let sub_location = resolver
            .get(key)
            .ok_or_else(|| StudError::SubfileMissing {
                chain: vec![location.to_path_buf()],
                missing: key.clone(),
            })?;
        walk(sub_location, resolver, prefix, depth + 1, nodes).map_err(|e| e.within(location))?;
    }

    Ok(())
}

impl fmt::Display for SubfileTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.nodes {
            writeln!(
                f,
                "{:indent$}{} - {}",
                "",
                node.name,
                node.file_type,
                indent = node.depth * 2
            )?;
        }
        Ok(())
    }
}
