//! Rendering query results for the terminal.

use skyfeed_core::{QueryOutput, Table};

/// Widest a human-readable cell may get before it is cut.
const MAX_CELL_WIDTH: usize = 48;

#[derive(clap::ValueEnum, Clone, Debug, Default, PartialEq, Eq, Copy)]
pub enum OutputFormat {
    #[default]
    Human,
    Json,
}

/// Render `output` in the requested format.
pub fn render(format: OutputFormat, output: &QueryOutput) -> Result<String, serde_json::Error> {
    match (format, output) {
        (OutputFormat::Human, QueryOutput::Table(table)) => Ok(render_table(table)),
        (OutputFormat::Human, QueryOutput::Raw(value)) => serde_json::to_string_pretty(value),
        (OutputFormat::Json, QueryOutput::Table(table)) => {
            serde_json::to_string_pretty(&table.to_json_records())
        }
        (OutputFormat::Json, QueryOutput::Raw(value)) => serde_json::to_string_pretty(value),
    }
}

/// Aligned plain-text table with a row count footer.
pub fn render_table(table: &Table) -> String {
    let header: Vec<String> = table.columns().iter().map(|c| clip(c)).collect();
    let rows: Vec<Vec<String>> = table
        .rows()
        .map(|row| row.values().iter().map(|v| clip(&v.to_string())).collect())
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    out.push_str(&format_line(&header, &widths));
    out.push_str(&format_line(
        &widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>(),
        &widths,
    ));
    for row in &rows {
        out.push_str(&format_line(row, &widths));
    }
    out.push_str(&format!(
        "({} row{})\n",
        table.len(),
        if table.len() == 1 { "" } else { "s" }
    ));
    out
}

fn format_line(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    format!("{}\n", padded.join("  ").trim_end())
}

fn clip(text: &str) -> String {
    let single_line = text.replace('\n', " ");
    if single_line.chars().count() <= MAX_CELL_WIDTH {
        single_line
    } else {
        let kept: String = single_line.chars().take(MAX_CELL_WIDTH - 3).collect();
        format!("{}...", kept)
    }
}
