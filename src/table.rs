//! GFM-style tables.

use crate::block::{Alignment, Column, Table};

/// Split a table row into trimmed cells, dropping one outer pipe on each side.
fn split_row(row: &str) -> Vec<&str> {
    let row = row.trim();
    let row = row.strip_prefix('|').unwrap_or(row);
    let row = row.strip_suffix('|').unwrap_or(row);
    row.split('|').map(str::trim).collect()
}

/// A separator cell is one or more `-`, optionally flanked by `:`.
fn is_separator_cell(cell: &str) -> bool {
    let inner = cell.strip_prefix(':').unwrap_or(cell);
    let inner = inner.strip_suffix(':').unwrap_or(inner);
    !inner.is_empty() && inner.chars().all(|c| c == '-')
}

/// Check whether a line is an alignment-separator row like `| :--- | ---: |`.
pub fn is_separator_row(line: &str) -> bool {
    line.contains('|') && split_row(line).into_iter().all(is_separator_cell)
}

fn alignment(cell: &str) -> Alignment {
    let left = cell.starts_with(':');
    let right = cell.ends_with(':');
    match (left, right) {
        (true, true) => Alignment::Center,
        (false, true) => Alignment::Right,
        _ => Alignment::None,
    }
}

/// Parse a table candidate: a header line, a separator line and any body
/// rows. Returns `None` when the lines do not form a table.
pub fn parse_table(lines: &[&str]) -> Option<Table> {
    let [header, separator, body @ ..] = lines else {
        return None;
    };
    if !is_separator_row(separator) {
        return None;
    }

    let columns = split_row(separator)
        .into_iter()
        .map(|cell| Column {
            align: alignment(cell),
        })
        .collect();

    let mut rows = vec![split_row(header).into_iter().map(String::from).collect()];
    rows.extend(
        body.iter()
            .filter(|line| !line.trim().is_empty())
            .map(|line| split_row(line).into_iter().map(String::from).collect()),
    );

    Some(Table { columns, rows })
}
