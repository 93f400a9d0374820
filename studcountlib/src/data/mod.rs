//! Data collection: parse files and aggregate stud statistics.
//!
//! This module handles the second stage of the pipeline - reading LDraw
//! documents and turning their sub-file references into stud counts. It
//! provides:
//!
//! - **Parsing**: Line classification and document reading
//! - **Classification**: Stud semantics of known primitives
//! - **Statistics**: `StudCounts`
//! - **Aggregation**: Memoized recursive counting (`aggregate`, `Aggregator`)
//! - **Batching**: Counting whole part lists (`run_batch`, `count_library`)
//!
//! ## Example
//!
//! ```rust,ignore
//! use studcountlib::data::{run_batch, BatchOptions};
//!
//! let result = run_batch(&parts, &resolver, &BatchOptions::new());
//! println!("{} parts, {} errors", result.len(), result.error_count());
//! ```

pub mod aggregator;
pub mod batch;
pub mod document;
pub mod file_type;
pub mod line;
pub mod stats;

pub use aggregator::{aggregate, count_part, Aggregator, ProcessedCache, VisitCounter};
pub use batch::{
    count_library, part_id, run_batch, BatchOptions, BatchResult, PartOutcome,
    DEFAULT_PROGRESS_INTERVAL,
};
pub use document::{read_sub_files, LdrawDocument};
pub use file_type::{file_type_for_name, FileTypeTag};
pub use line::{file_from_reference_line, line_type_from_line, LineRecord, LineType};
pub use stats::StudCounts;
