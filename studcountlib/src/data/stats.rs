//! Core data structure for stud statistics.
//!
//! A file's counts are the sum of the counts of every file it references.
//! Recognized stud primitives are the leaves of that sum and contribute a
//! unit vector:
//!
//! - **top_studs**: upward-facing studs (`stud.dat` and friends)
//! - **underside_studs**: downward-facing studs (`stud3.dat`, `studx.dat`, ...)
//! - **stud_rings**: hollow tube studs (`stud4.dat`, `stud16.dat`, ...)

use std::iter::Sum;
use std::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

use super::file_type::FileTypeTag;

/// Stud counts of one resolved file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StudCounts {
    pub top_studs: u32,
    pub underside_studs: u32,
    pub stud_rings: u32,
}

impl StudCounts {
    /// All zeros.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_counts(top_studs: u32, underside_studs: u32, stud_rings: u32) -> Self {
        Self {
            top_studs,
            underside_studs,
            stud_rings,
        }
    }

    /// Contribution of a leaf primitive with the given tag.
    ///
    /// `Unknown` yields `None`: such files are composites and must be read.
    pub fn for_tag(tag: FileTypeTag) -> Option<Self> {
        match tag {
            FileTypeTag::TopStud => Some(Self::with_counts(1, 0, 0)),
            FileTypeTag::UndersideStud => Some(Self::with_counts(0, 1, 0)),
            FileTypeTag::StudRing => Some(Self::with_counts(0, 0, 1)),
            FileTypeTag::Unknown => None,
        }
    }

    /// Sum of all three counters.
    pub fn total(&self) -> u32 {
        self.top_studs
            .saturating_add(self.underside_studs)
            .saturating_add(self.stud_rings)
    }

    pub fn is_zero(&self) -> bool {
        self.total() == 0
    }
}

/// Counters saturate at `u32::MAX` instead of overflowing.
impl Add for StudCounts {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            top_studs: self.top_studs.saturating_add(other.top_studs),
            underside_studs: self.underside_studs.saturating_add(other.underside_studs),
            stud_rings: self.stud_rings.saturating_add(other.stud_rings),
        }
    }
}

impl AddAssign for StudCounts {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sum for StudCounts {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::new(), Add::add)
    }
}
