//! Line classification for the LDraw text format.
//!
//! Every LDraw line starts with a single-digit line type followed by a space.
//! Only type 1 (sub-file reference) carries information this crate uses; the
//! other types are recognized so that callers can tell them apart.

use serde::{Deserialize, Serialize};

use crate::source::resolver::FileKey;

/// Kind of an LDraw line, taken from its first two characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LineType {
    /// `0 ` meta command or comment
    Comment,
    /// `1 ` reference to another file
    SubpartReference,
    /// `2 ` line segment
    Line,
    /// `3 ` triangle
    Triangle,
    /// `4 ` quadrilateral
    Quad,
    /// `5 ` optional (conditional) line
    OptionalLine,
    /// Anything else, including blank lines
    Unknown,
}

/// One classified line of a model document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRecord {
    pub line_type: LineType,
    /// Referenced file, set only for `SubpartReference` lines.
    pub reference: Option<FileKey>,
}

impl LineRecord {
    /// Classify a raw line. Surrounding whitespace is ignored.
    pub fn parse(raw: &str) -> Self {
        let line = raw.trim();
        let line_type = line_type_from_line(line);
        let reference = match line_type {
            LineType::SubpartReference => file_from_reference_line(line),
            _ => None,
        };
        Self {
            line_type,
            reference,
        }
    }
}

/// Classify an already trimmed line by its first two characters.
pub fn line_type_from_line(line: &str) -> LineType {
    match line.as_bytes() {
        [b'0', b' ', ..] => LineType::Comment,
        [b'1', b' ', ..] => LineType::SubpartReference,
        [b'2', b' ', ..] => LineType::Line,
        [b'3', b' ', ..] => LineType::Triangle,
        [b'4', b' ', ..] => LineType::Quad,
        [b'5', b' ', ..] => LineType::OptionalLine,
        _ => LineType::Unknown,
    }
}

/// File referenced by a type 1 line: its last whitespace-separated token.
pub fn file_from_reference_line(line: &str) -> Option<FileKey> {
    line.split_whitespace().last().map(FileKey::new)
}
