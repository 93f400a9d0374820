//! Output formatting: present data for people.
//!
//! This module handles the final stage of the pipeline - formatting results
//! for display. It provides:
//!
//! - **StudTable**: Table-ready batch results with headers, rows, and footer
//! - **SubfileTree**: Depth-first listing of the files below a part
//!
//! Both are pure presentation layers and can be serialized to JSON.

pub mod table;
pub mod tree;

pub use table::{StudTable, TableRow};
pub use tree::{SubfileTree, TreeNode};
