use polars::prelude::{AnyValue, DataFrame};

fn cell_text(value: &AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::Int32(v) => v.to_string(),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::UInt32(v) => v.to_string(),
        AnyValue::String(s) => s.to_string(),
        other => other.to_string(),
    }
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    out.push('|');
    for (cell, width) in cells.iter().zip(widths) {
        out.push(' ');
        out.push_str(cell);
        out.push_str(&" ".repeat(width.saturating_sub(cell.chars().count())));
        out.push_str(" |");
    }
    out.push('\n');
}

/// Renders a frame as a boxed plain-text table for terminal output.
pub fn render_frame(df: &DataFrame) -> String {
    let columns = df.get_columns();
    let header: Vec<String> = columns.iter().map(|c| c.name().to_string()).collect();
    let rows: Vec<Vec<String>> = (0..df.height())
        .map(|row| {
            columns
                .iter()
                .map(|col| col.get(row).map(|v| cell_text(&v)).unwrap_or_default())
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut sep = String::from("+");
    for w in &widths {
        sep.push_str(&"-".repeat(w + 2));
        sep.push('+');
    }
    sep.push('\n');

    let mut out = sep.clone();
    push_row(&mut out, &header, &widths);
    out.push_str(&sep);
    for row in &rows {
        push_row(&mut out, row, &widths);
    }
    out.push_str(&sep);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::Schedule;
    use crate::task::Task;

    #[test]
    fn columns_are_padded_to_widest_cell() {
        let schedule = Schedule::new(
            vec![Task::new("T1", "Requirements analysis", 1, 4, "WP1")],
            Vec::new(),
        );
        let text = render_frame(&schedule.task_frame().unwrap());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[1].starts_with("| id | name                  |"));
        assert!(lines[3].contains("| Requirements analysis |"));
        assert!(lines.iter().all(|l| l.chars().count() == lines[0].chars().count()));
    }
}
