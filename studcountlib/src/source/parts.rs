//! Discovery of the top-level parts to process.
//!
//! Only the files directly inside each part directory are considered (the
//! `s/` subpart folder is not a source of top-level parts). When the same
//! file name appears in several directories, the first directory wins.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;

use crate::error::StudError;
use crate::Result;

/// Configuration for part filtering.
#[derive(Debug, Clone, Default)]
pub struct PartFilter {
    /// Glob patterns matched against the lowercase file name (if empty, include all)
    pub include: Vec<Pattern>,
    /// Glob patterns to exclude
    pub exclude: Vec<Pattern>,
}

impl PartFilter {
    /// Create a new empty filter (includes every part).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an include pattern.
    pub fn include(mut self, pattern: &str) -> Result<Self> {
        self.include.push(compile(pattern)?);
        Ok(self)
    }

    /// Add an exclude pattern.
    pub fn exclude(mut self, pattern: &str) -> Result<Self> {
        self.exclude.push(compile(pattern)?);
        Ok(self)
    }

    /// Check if a part file name passes the filter.
    ///
    /// Excludes are checked first; with no include patterns everything else
    /// passes.
    pub fn matches(&self, file_name: &str) -> bool {
        let name = file_name.to_lowercase();

        if self.exclude.iter().any(|p| p.matches(&name)) {
            return false;
        }

        self.include.is_empty() || self.include.iter().any(|p| p.matches(&name))
    }
}

fn compile(pattern: &str) -> Result<Pattern> {
    Pattern::new(&pattern.to_lowercase()).map_err(|e| StudError::InvalidGlob {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })
}

/// List distinct top-level part files across `dirs`.
///
/// Names are compared case-insensitively; the first directory to provide a
/// name wins. Output is sorted by lowercase file name.
pub fn list_parts_to_process(dirs: &[&Path], filter: &PartFilter) -> Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut parts = Vec::new();

    for dir in dirs {
        if !dir.is_dir() {
            return Err(StudError::PathNotFound(dir.to_path_buf()));
        }

        let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file())
            .collect();
        entries.sort();

        for path in entries {
            let Some(name) = path.file_name().map(|n| n.to_string_lossy().to_lowercase()) else {
                continue;
            };
            if !filter.matches(&name) {
                continue;
            }
            if seen.insert(name) {
                parts.push(path);
            }
        }
    }

    parts.sort_by_key(|p| part_sort_key(p));
    Ok(parts)
}

fn part_sort_key(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}
