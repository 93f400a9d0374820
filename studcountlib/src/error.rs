//! Error types for studcountlib

use std::path::PathBuf;
use thiserror::Error;

use crate::source::resolver::FileKey;

/// Errors that can occur while resolving, reading and aggregating LDraw files
#[derive(Error, Debug)]
pub enum StudError {
    /// Failed to read a file
    #[error("failed to read file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Path does not exist
    #[error("path does not exist: {0}")]
    PathNotFound(PathBuf),

    /// The same relative file was found twice inside the official library
    #[error(
        "cannot handle multiple part locations, duplicate file '{key}': '{}' and '{}'",
        first.display(),
        second.display()
    )]
    DuplicateFile {
        key: FileKey,
        first: PathBuf,
        second: PathBuf,
    },

    /// Key is not known to the resolver
    #[error("key not found: {0}")]
    KeyNotFound(FileKey),

    /// A referenced sub-file could not be resolved.
    ///
    /// `chain` runs from the top-level file down to the file holding the
    /// dangling reference.
    #[error("\"{}\" misses Subfile \"{missing}\"", display_chain(chain))]
    SubfileMissing {
        chain: Vec<PathBuf>,
        missing: FileKey,
    },

    /// Invalid glob pattern
    #[error("invalid glob pattern '{pattern}': {message}")]
    InvalidGlob { pattern: String, message: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StudError {
    /// Prepend `path` to the reference chain of a `SubfileMissing` error.
    ///
    /// Other variants pass through untouched.
    pub fn within(self, path: impl Into<PathBuf>) -> Self {
        match self {
            StudError::SubfileMissing { mut chain, missing } => {
                chain.insert(0, path.into());
                StudError::SubfileMissing { chain, missing }
            }
            other => other,
        }
    }

    /// Whether this error belongs to a single part rather than the whole run.
    pub fn is_per_part(&self) -> bool {
        matches!(
            self,
            StudError::SubfileMissing { .. } | StudError::FileRead { .. }
        )
    }
}

fn display_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}
