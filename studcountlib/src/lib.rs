//! # studcountlib
//!
//! Infers stud attributes of LEGO parts from their LDraw model files.
//!
//! ## Overview
//!
//! An LDraw part is a text file whose type 1 lines reference other files:
//! subparts and reusable primitives. A handful of primitives are studs, so
//! the stud counts of a part follow from which primitives it reaches. This
//! library resolves the reference graph and sums, for each file:
//!
//! - **Top studs**: upward-facing studs (`stud.dat`, `stud2.dat`, ...)
//! - **Underside studs**: downward-facing studs (`stud3.dat`, `studx.dat`, ...)
//! - **Stud rings**: hollow tube studs (`stud4.dat`, `stud16.dat`, ...)
//!
//! ## Pipeline
//!
//! - [`source`]: tiered file resolution and part discovery
//! - [`data`]: document parsing, classification and memoized aggregation
//! - [`output`]: table and tree presentation
//!
//! ## Example
//!
//! ```rust
//! use studcountlib::{count_part, LibraryConfig, StudCounts};
//! use std::fs;
//! use tempfile::tempdir;
//!
//! let dir = tempdir().unwrap();
//! fs::create_dir_all(dir.path().join("parts")).unwrap();
//! fs::create_dir_all(dir.path().join("p")).unwrap();
//! fs::write(dir.path().join("p/stud.dat"), "0 Stud\n").unwrap();
//! fs::write(dir.path().join("p/box5.dat"), "0 Box with 5 Faces\n").unwrap();
//! fs::write(
//!     dir.path().join("parts/3024.dat"),
//!     "0 Plate  1 x  1\n1 16 0 8 0 6 0 0 0 -8 0 0 0 6 box5.dat\n1 16 0 0 0 1 0 0 0 1 0 0 0 1 stud.dat\n",
//! )
//! .unwrap();
//!
//! let config = LibraryConfig::from_ldraw_root(dir.path());
//! let resolver = config.build_resolver().unwrap();
//! let counts = count_part(dir.path().join("parts/3024.dat"), &resolver).unwrap();
//! assert_eq!(counts, StudCounts::with_counts(1, 0, 0));
//! ```

pub mod data;
pub mod error;
pub mod output;
pub mod source;

pub use data::{
    aggregate, count_library, count_part, file_type_for_name, line_type_from_line, part_id,
    run_batch, Aggregator, BatchOptions, BatchResult, FileTypeTag, LdrawDocument, LineRecord,
    LineType, PartOutcome, ProcessedCache, StudCounts, VisitCounter,
};
pub use error::StudError;
pub use output::{StudTable, SubfileTree, TableRow, TreeNode};
pub use source::{
    list_parts_to_process, FileKey, FileResolver, LibraryConfig, LibraryTier, PartFilter,
    SearchRoot,
};

/// Result type for studcountlib operations
pub type Result<T> = std::result::Result<T, StudError>;
