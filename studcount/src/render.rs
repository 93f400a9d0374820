//! Template rendering for CLI output using outstanding

use std::path::Path;

use console::Style;
use outstanding::{render_with_output, Theme};
use serde::Serialize;
use studcountlib::{file_type_for_name, StudTable, SubfileTree, TableRow, VisitCounter};

/// Re-export OutputMode for callers
pub use outstanding::OutputMode;

/// Include templates at compile time
pub const STUD_TABLE_TEMPLATE: &str = include_str!("../templates/stud_table.jinja");
pub const TREE_TEMPLATE: &str = include_str!("../templates/tree.jinja");
pub const CLASSIFY_TEMPLATE: &str = include_str!("../templates/classify.jinja");
pub const VISITS_TEMPLATE: &str = include_str!("../templates/visits.jinja");

/// Width of the part id column
const NAME_WIDTH: usize = 32;
/// Width of each count column
const CELL_WIDTH: usize = 10;

/// Row data for template rendering (pre-formatted)
#[derive(Debug, Serialize)]
struct TemplateRow {
    /// Part id or total label
    name: String,
    /// Padded name followed by right-aligned count cells
    line: String,
    /// Whether the part failed to count
    failed: bool,
    /// Error text of a failed part
    error: Option<String>,
}

/// Most visited files of a batch run
#[derive(Debug, Serialize)]
pub struct VisitsContext {
    title: String,
    entries: Vec<String>,
}

/// Data context for the stud table template
#[derive(Debug, Serialize)]
pub struct StudTableContext {
    /// Pre-padded column headers
    header: String,
    /// Separator line (dashes)
    separator: String,
    /// Data rows
    rows: Vec<TemplateRow>,
    /// Total row
    total: TemplateRow,
    /// Failed rows, listed again with their error text
    errors: Vec<TemplateRow>,
    /// Optional visit report appended below the table
    visits: Option<VisitsContext>,
}

/// One node of the tree template
#[derive(Debug, Serialize)]
struct TreeLine {
    indent: String,
    name: String,
    file_type: String,
}

/// Data context for the tree template
#[derive(Debug, Serialize)]
pub struct TreeContext {
    nodes: Vec<TreeLine>,
}

#[derive(Debug, Serialize)]
struct ClassifyEntry {
    name: String,
    file_type: String,
}

/// Data context for the classify template
#[derive(Debug, Serialize)]
pub struct ClassifyContext {
    entries: Vec<ClassifyEntry>,
}

/// Truncate a name to fit within max_len, adding ".." prefix if needed
fn truncate_name(name: &str, max_len: usize) -> String {
    let chars = name.chars().count();
    if chars > max_len {
        let tail: String = name.chars().skip(chars - max_len + 2).collect();
        format!("..{tail}")
    } else {
        name.to_string()
    }
}

/// Convert a TableRow to a TemplateRow, pre-formatting cells
fn to_template_row(row: &TableRow) -> TemplateRow {
    let mut line = format!(
        "{:<width$}",
        truncate_name(&row.label, NAME_WIDTH - 2),
        width = NAME_WIDTH
    );
    for value in &row.values {
        line.push_str(&format!(" {:>width$}", value, width = CELL_WIDTH));
    }

    TemplateRow {
        name: row.label.clone(),
        line,
        failed: row.error.is_some(),
        error: row.error.clone(),
    }
}

impl StudTableContext {
    /// Build the template context for a stud table.
    pub fn new(table: &StudTable) -> Self {
        let mut header = String::new();
        if let Some((name, counts)) = table.headers.split_first() {
            header.push_str(&format!("{:<width$}", name, width = NAME_WIDTH));
            for column in counts {
                header.push_str(&format!(" {:>width$}", column, width = CELL_WIDTH));
            }
        }
        let columns = table.headers.len().saturating_sub(1);

        Self {
            header,
            separator: "-".repeat(NAME_WIDTH + (CELL_WIDTH + 1) * columns),
            rows: table.rows.iter().map(to_template_row).collect(),
            total: to_template_row(&table.footer),
            errors: table.error_rows().map(to_template_row).collect(),
            visits: None,
        }
    }

    /// Append a visit report below the table.
    pub fn with_visits(mut self, visits: VisitsContext) -> Self {
        self.visits = Some(visits);
        self
    }
}

/// Convert a path to a relative path from the base directory.
fn make_relative(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| path.to_string_lossy().to_string())
}

impl VisitsContext {
    /// The `limit` most visited files, relative to `base`.
    pub fn new(visits: &VisitCounter, base: &Path, limit: usize) -> Self {
        let entries = visits
            .most_visited(limit)
            .into_iter()
            .map(|(location, count)| {
                format!(
                    "{:<width$} {:>cell$}",
                    truncate_name(&make_relative(location, base), NAME_WIDTH * 2 - 2),
                    count,
                    width = NAME_WIDTH * 2,
                    cell = CELL_WIDTH
                )
            })
            .collect();

        Self {
            title: format!("Visits ({} files, {} total)", visits.len(), visits.total()),
            entries,
        }
    }
}

impl TreeContext {
    pub fn new(tree: &SubfileTree) -> Self {
        let nodes = tree
            .nodes
            .iter()
            .map(|node| TreeLine {
                indent: "  ".repeat(node.depth),
                name: node.name.clone(),
                file_type: node.file_type.to_string(),
            })
            .collect();
        Self { nodes }
    }
}

impl ClassifyContext {
    pub fn new<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let entries = names
            .into_iter()
            .map(|name| ClassifyEntry {
                name: name.to_string(),
                file_type: file_type_for_name(name).to_string(),
            })
            .collect();
        Self { entries }
    }
}

/// Create the theme with styles
pub fn create_theme() -> Theme {
    Theme::new()
        .add("header", Style::new().bold())
        .add("total", Style::new().bold())
        .add("error", Style::new().red())
        .add("category", Style::new().cyan())
}

/// Render a template context to string using outstanding
pub fn render<T: Serialize>(
    template: &str,
    context: &T,
    output_mode: OutputMode,
) -> Result<String, Box<dyn std::error::Error>> {
    let theme = create_theme();
    let rendered = render_with_output(template, context, &theme, output_mode)?;
    Ok(rendered)
}
