//! Text rendering of query outcomes and errors.
//!
//! Renders results as box-drawn tables with auto-sized columns.

use crate::db::{QueryResult, Value};
use crate::error::AskError;
use crate::query::QueryOutcome;

/// Shown for every statement that does not return rows.
pub const SUCCESS_MESSAGE: &str = "✅ Query executed successfully!";

/// Maximum width for any column.
const MAX_COLUMN_WIDTH: usize = 40;

/// Minimum width for any column.
const MIN_COLUMN_WIDTH: usize = 4;

/// Renders an execution outcome.
pub fn render_outcome(outcome: &QueryOutcome) -> String {
    match outcome {
        QueryOutcome::Rows(result) => render_table(result),
        QueryOutcome::Executed { .. } => SUCCESS_MESSAGE.to_string(),
    }
}

/// Renders an error as a one-line banner.
pub fn render_error(error: &AskError) -> String {
    format!("❌ {}: {}", error.category(), error.message())
}

/// Renders a result set as a table with a row-count footer.
pub fn render_table(result: &QueryResult) -> String {
    if result.columns.is_empty() {
        return "(empty result)".to_string();
    }

    let widths = column_widths(result);
    let mut lines = Vec::with_capacity(result.rows.len() + 5);

    lines.push(border(&widths, '┌', '┬', '┐'));
    lines.push(row_line(
        result.columns.iter().map(|c| c.name.clone()),
        &widths,
    ));
    lines.push(border(&widths, '├', '┼', '┤'));
    for row in &result.rows {
        lines.push(row_line(row.iter().map(Value::to_string), &widths));
    }
    lines.push(border(&widths, '└', '┴', '┘'));

    let count = result.row_count();
    lines.push(format!(
        "({} row{})",
        count,
        if count == 1 { "" } else { "s" }
    ));

    lines.join("\n")
}

/// Calculates the width of each column, in characters.
fn column_widths(result: &QueryResult) -> Vec<usize> {
    let mut widths: Vec<usize> = result
        .columns
        .iter()
        .map(|col| cell_text(&col.name).chars().count().max(MIN_COLUMN_WIDTH))
        .collect();

    for row in &result.rows {
        for (width, value) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell_text(&value.to_string()).chars().count());
        }
    }

    widths.iter().map(|&w| w.min(MAX_COLUMN_WIDTH)).collect()
}

/// Escapes line breaks, tabs and other control characters so a cell stays on
/// one line.
fn cell_text(s: &str) -> String {
    if !s.chars().any(char::is_control) {
        return s.to_string();
    }
    s.chars()
        .map(|c| match c {
            '\n' => "\\n".to_string(),
            '\r' => "\\r".to_string(),
            '\t' => "\\t".to_string(),
            c if c.is_control() => c.escape_default().to_string(),
            c => c.to_string(),
        })
        .collect()
}

/// Truncates a string to fit within the given width, adding an ellipsis if needed.
fn truncate(s: &str, max_width: usize) -> String {
    if s.chars().count() <= max_width {
        s.to_string()
    } else if max_width <= 3 {
        s.chars().take(max_width).collect()
    } else {
        let head: String = s.chars().take(max_width - 3).collect();
        format!("{head}...")
    }
}

fn border(widths: &[usize], left: char, mid: char, right: char) -> String {
    let segments: Vec<String> = widths.iter().map(|&w| "─".repeat(w + 2)).collect();
    format!("{left}{}{right}", segments.join(&mid.to_string()))
}

fn row_line(mut cells: impl Iterator<Item = String>, widths: &[usize]) -> String {
    let mut line = String::from("│");
    for &width in widths {
        let cell = truncate(&cell_text(&cells.next().unwrap_or_default()), width);
        let pad = width - cell.chars().count();
        line.push(' ');
        line.push_str(&cell);
        line.push_str(&" ".repeat(pad));
        line.push_str(" │");
    }
    line
}
