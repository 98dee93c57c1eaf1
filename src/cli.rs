//! CLI utilities and helpers

use crate::remote::RowData;
use crate::result::ExpansionKind;
use colored::*;

/// Print a warning message
pub fn warning(msg: &str) {
    println!("{} {}", "⚠".yellow().bold(), msg);
}

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".cyan().bold(), msg);
}

/// Format one row the way a watch window shows it
///
/// `+` marks rows that can be expanded further, `~` informational rows.
pub fn format_row(row: &RowData) -> String {
    let marker = if row.expandable {
        "+".green().bold()
    } else if row.kind == ExpansionKind::Explicit {
        "~".yellow().bold()
    } else {
        " ".normal()
    };

    let mut line = format!("{} {} = {}", marker, row.name.cyan(), row.display_value);
    if let Some(declared) = &row.declared_type {
        match &row.runtime_type {
            Some(runtime) if runtime != declared => {
                line.push_str(&format!("  {}", format!("{{{} ({})}}", declared, runtime).dimmed()));
            }
            _ => line.push_str(&format!("  {}", format!("{{{}}}", declared).dimmed())),
        }
    }
    if row.read_only && row.kind != ExpansionKind::Explicit {
        line.push_str(&format!(" {}", "[read-only]".dimmed()));
    }
    line
}

/// Summary line after a page of rows
pub fn format_page_summary(start: usize, shown: usize, total: usize) -> String {
    if shown == 0 {
        format!("no rows at {} ({} total)", start, total)
    } else {
        format!("rows {}-{} of {}", start, start + shown - 1, total)
    }
}
