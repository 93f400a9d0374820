//! Reading LDraw model documents.
//!
//! Files in the wild mix UTF-8, Latin-1 and other encodings, usually only
//! inside comments. Content is decoded lossily so a stray byte never fails
//! the whole file; such a line at worst classifies as `Unknown`.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::StudError;
use crate::source::resolver::FileKey;
use crate::Result;

use super::line::{LineRecord, LineType};

/// A parsed model document: every line, classified, in file order.
#[derive(Debug, Clone)]
pub struct LdrawDocument {
    pub path: PathBuf,
    pub lines: Vec<LineRecord>,
}

impl LdrawDocument {
    /// Read and classify the file at `path`.
    pub fn read(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| StudError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let content = String::from_utf8_lossy(&bytes);
        Ok(Self::parse(path, &content))
    }

    /// Classify already decoded content.
    pub fn parse(path: impl Into<PathBuf>, content: &str) -> Self {
        Self {
            path: path.into(),
            lines: content.lines().map(LineRecord::parse).collect(),
        }
    }

    /// Referenced files, in order, duplicates kept.
    pub fn sub_files(&self) -> impl Iterator<Item = &FileKey> {
        self.lines.iter().filter_map(|l| l.reference.as_ref())
    }

    /// Number of lines of the given type.
    pub fn count(&self, line_type: LineType) -> usize {
        self.lines.iter().filter(|l| l.line_type == line_type).count()
    }
}

/// Referenced files of the document at `path`.
pub fn read_sub_files(path: impl AsRef<Path>) -> Result<Vec<FileKey>> {
    let document = LdrawDocument::read(path)?;
    Ok(document.sub_files().cloned().collect())
}
