//! Stud semantics of well-known LDraw primitives.
//!
//! Classification is by file name only. The sloped stud rings `stud4s.dat`
//! and `stud4s2.dat` are hidden geometry and are deliberately left out.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stud category carried by a primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileTypeTag {
    TopStud,
    UndersideStud,
    StudRing,
    Unknown,
}

impl fmt::Display for FileTypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileTypeTag::TopStud => "Top Stud",
            FileTypeTag::UndersideStud => "Underside Stud",
            FileTypeTag::StudRing => "Stud Ring",
            FileTypeTag::Unknown => "Unknown",
        };
        f.write_str(name)
    }
}

pub const TOP_STUD_FILES: &[&str] = &[
    "stud.dat",
    "studa.dat",
    "studp01.dat",
    "studel.dat",
    "stud10.dat",
    "stud15.dat",
    "stud2.dat",
    "stud2a.dat",
    "stud17a.dat",
    "stud9.dat",
    "stud6.dat",
    "stud6a.dat",
];

pub const UNDERSIDE_STUD_FILES: &[&str] = &["stud3.dat", "stud3a.dat", "studx.dat", "stud12.dat"];

pub const STUD_RING_FILES: &[&str] = &[
    "stud16.dat",
    "stud21a.dat",
    "stud22a.dat",
    "stud4.dat",
    "stud4a.dat",
    "stud4fns.dat",
    "stud4h.dat",
    "stud4o.dat",
    "stud4od.dat",
];

/// Classify a primitive by file name, case-insensitively.
///
/// Only the final path segment is compared, so `p/stud.dat` and `stud.dat`
/// classify the same way.
pub fn file_type_for_name(file_name: &str) -> FileTypeTag {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name)
        .to_lowercase();
    let name = base.as_str();

    if TOP_STUD_FILES.contains(&name) {
        FileTypeTag::TopStud
    } else if UNDERSIDE_STUD_FILES.contains(&name) {
        FileTypeTag::UndersideStud
    } else if STUD_RING_FILES.contains(&name) {
        FileTypeTag::StudRing
    } else {
        FileTypeTag::Unknown
    }
}
