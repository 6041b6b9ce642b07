// Helpers shared by the table and upload readers.

use calamine::DataType;
use rapport_core::CellValue;

pub fn cell_value(cell: &DataType) -> CellValue {
    match cell {
        DataType::Empty => CellValue::Empty,
        DataType::Int(i) => CellValue::Number(*i as f64),
        DataType::Float(x) => CellValue::Number(*x),
        DataType::String(s) if s.trim().is_empty() => CellValue::Empty,
        DataType::String(s) => CellValue::Text(s.clone()),
        other => CellValue::Text(other.to_string()),
    }
}

pub fn cell_text(cell: &DataType) -> String {
    cell_value(cell).label()
}

/// Renders rows as an aligned text table: a header line, then one numbered line per row.
///
/// Rows may be shorter or longer than the header.
pub fn render_table(header: &[String], rows: &[Vec<String>]) -> String {
    let num_cols = rows
        .iter()
        .map(|r| r.len())
        .chain(std::iter::once(header.len()))
        .max()
        .unwrap_or(0);
    let index_width = rows.len().saturating_sub(1).to_string().len();

    let mut widths: Vec<usize> = (0..num_cols).map(|i| cell(header, i).chars().count()).collect();
    for row in rows.iter() {
        for (i, w) in widths.iter_mut().enumerate() {
            *w = (*w).max(cell(row, i).chars().count());
        }
    }

    let mut lines: Vec<String> = Vec::new();
    let mut line = " ".repeat(index_width);
    for (i, w) in widths.iter().enumerate() {
        line.push_str(&format!("  {:>w$}", cell(header, i), w = *w));
    }
    lines.push(line.trim_end().to_string());
    for (idx, row) in rows.iter().enumerate() {
        let mut line = format!("{:<w$}", idx, w = index_width);
        for (i, w) in widths.iter().enumerate() {
            line.push_str(&format!("  {:>w$}", cell(row, i), w = *w));
        }
        lines.push(line.trim_end().to_string());
    }
    lines.join("\n")
}

fn cell(row: &[String], idx: usize) -> String {
    row.get(idx).cloned().unwrap_or_default()
}
