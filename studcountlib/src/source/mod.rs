//! Source discovery: locate LDraw files.
//!
//! This module handles the first stage of the pipeline - knowing where files
//! live. It provides:
//!
//! - **Resolution**: Tiered, case-insensitive `FileKey -> path` index
//! - **Library layout**: Official and unofficial part/primitive roots
//! - **Part discovery**: The list of top-level parts to process
//!
//! ## Example
//!
//! ```rust,ignore
//! use studcountlib::source::{LibraryConfig, PartFilter, list_parts_to_process};
//!
//! let config = LibraryConfig::from_ldraw_root("/ldraw").unofficial_root("/ldrawunf");
//! let resolver = config.build_resolver()?;
//! let parts = list_parts_to_process(&config.part_dirs(), &PartFilter::new())?;
//! ```

pub mod library;
pub mod parts;
pub mod resolver;

pub use library::LibraryConfig;
pub use parts::{list_parts_to_process, PartFilter};
pub use resolver::{FileKey, FileResolver, LibraryTier, SearchRoot};
