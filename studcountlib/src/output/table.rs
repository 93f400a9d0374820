//! Table-ready data structures for batch output.
//!
//! `StudTable` is a presentation-ready structure that can be rendered by
//! the CLI or serialized to JSON. It only formats data; all counting happens
//! in the data stage.

use serde::{Deserialize, Serialize};

use crate::data::batch::{BatchResult, PartOutcome};
use crate::data::stats::StudCounts;

/// A single row in the table (data row or footer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRow {
    /// Row label (part id or "Total (...)")
    pub label: String,
    /// Values for each count column, ready for display
    pub values: Vec<String>,
    /// Error text for failed parts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Table-ready stud data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudTable {
    /// Column headers: [Part, Top, Underside, Rings]
    pub headers: Vec<String>,
    /// Data rows, sorted by part id
    pub rows: Vec<TableRow>,
    /// Summary/footer row
    pub footer: TableRow,
}

impl StudTable {
    /// Create a StudTable from a batch result.
    pub fn from_batch(result: &BatchResult) -> Self {
        let rows: Vec<TableRow> = result
            .parts
            .iter()
            .map(|(id, outcome)| match outcome {
                PartOutcome::Counts(counts) => TableRow {
                    label: id.clone(),
                    values: format_counts(counts),
                    error: None,
                },
                PartOutcome::Failed { processing_errors } => TableRow {
                    label: id.clone(),
                    values: vec!["error".to_string(); 3],
                    error: Some(processing_errors.join("; ")),
                },
            })
            .collect();

        let footer = TableRow {
            label: format!(
                "Total ({} parts, {} errors)",
                result.len(),
                result.error_count()
            ),
            values: format_counts(&result.total()),
            error: None,
        };

        StudTable {
            headers: vec![
                "Part".to_string(),
                "Top".to_string(),
                "Underside".to_string(),
                "Rings".to_string(),
            ],
            rows,
            footer,
        }
    }

    /// Rows of failed parts only.
    pub fn error_rows(&self) -> impl Iterator<Item = &TableRow> {
        self.rows.iter().filter(|r| r.error.is_some())
    }
}

fn format_counts(counts: &StudCounts) -> Vec<String> {
    vec![
        counts.top_studs.to_string(),
        counts.underside_studs.to_string(),
        counts.stud_rings.to_string(),
    ]
}
