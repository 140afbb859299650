//! Plain-text rendering of a [`GridView`].

use std::fmt::Write;

use datagrid::view::{CellView, GridView, RowView};
use datagrid::Alignment;

/// Pixels per rendered character.
const PX_PER_CHAR: u32 = 10;
const MIN_CHARS: usize = 4;
const SEQUENCE_CHARS: usize = 5;
const CHECKBOX_CHARS: usize = 4;

fn chars(width_px: u32) -> usize {
    ((width_px / PX_PER_CHAR) as usize).max(MIN_CHARS)
}

/// Fit `text` into exactly `width` characters.
fn fit(text: &str, width: usize, align: Alignment) -> String {
    let count = text.chars().count();
    if count > width {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('~');
        return cut;
    }
    match align {
        Alignment::Left => format!("{:<width$}", text),
        Alignment::Center => format!("{:^width$}", text),
        Alignment::Right => format!("{:>width$}", text),
    }
}

fn cell_text(cell: &CellView) -> String {
    match (&cell.buffer, cell.editing) {
        (Some(buffer), true) => format!("[{}]", buffer),
        (None, true) => format!("[{}]", cell.value),
        _ => cell.value.to_string(),
    }
}

fn row_line(row: &RowView) -> String {
    let mut line = String::new();
    line.push_str(&fit(&row.sequence.to_string(), SEQUENCE_CHARS, Alignment::Right));
    line.push_str(if row.selected { " [x]" } else { " [ ]" });
    for cell in &row.cells {
        line.push_str(" |");
        line.push_str(&fit(&cell_text(cell), chars(cell.width), cell.align));
    }
    line
}

/// Render the whole grid.
pub fn render(view: &GridView) -> String {
    let mut out = String::new();

    let title = view.controls.title.as_deref().unwrap_or("Grid");
    let _ = writeln!(
        out,
        "== {} == {} rows, {} selected{}",
        title,
        view.controls.row_count,
        view.controls.selected_count,
        if view.controls.search { " (search)" } else { "" }
    );

    let lead = " ".repeat(SEQUENCE_CHARS + CHECKBOX_CHARS);
    if !view.groups.is_empty() {
        let mut line = lead.clone();
        let mut current: Option<&str> = None;
        for cell in &view.header.cells {
            let group = view
                .groups
                .iter()
                .find(|g| g.leaves.iter().any(|id| *id == cell.column_id));
            match group {
                Some(group) if current == Some(group.id.as_str()) => {}
                Some(group) => {
                    let width: usize = group
                        .leaves
                        .iter()
                        .filter_map(|id| view.header.cells.iter().find(|c| c.column_id == *id))
                        .map(|c| chars(c.width) + 2)
                        .sum();
                    line.push_str(" |");
                    line.push_str(&fit(&group.header, width.saturating_sub(2), Alignment::Center));
                    current = Some(group.id.as_str());
                }
                None => {
                    line.push_str(&" ".repeat(chars(cell.width) + 2));
                    current = None;
                }
            }
        }
        let _ = writeln!(out, "{}", line.trim_end());
    }

    let mut header = fit("#", SEQUENCE_CHARS, Alignment::Right);
    header.push_str(if view.header.all_selected { " [x]" } else { " [ ]" });
    for cell in &view.header.cells {
        header.push_str(" |");
        let label = match cell.pin {
            Some(_) => format!("{}*", cell.header),
            None => cell.header.clone(),
        };
        header.push_str(&fit(&label, chars(cell.width), Alignment::Left));
    }
    let _ = writeln!(out, "{}", header);
    let _ = writeln!(out, "{}", "-".repeat(header.chars().count()));

    if view.rows.is_empty() {
        let _ = writeln!(out, "{}(no rows)", lead);
    }
    for row in &view.rows {
        let _ = writeln!(out, "{}", row_line(row));
    }

    if let Some(summary) = &view.summary {
        let mut line = fit("sum", SEQUENCE_CHARS, Alignment::Right);
        line.push_str("    ");
        for (cell, header) in summary.iter().zip(&view.header.cells) {
            line.push_str(" |");
            let total = cell.total.map(|t| t.to_string()).unwrap_or_default();
            line.push_str(&fit(&total, chars(header.width), Alignment::Right));
        }
        let _ = writeln!(out, "{}", line);
    }

    if let Some(page) = &view.pagination {
        let pages = page
            .total_pages
            .map(|p| p.to_string())
            .unwrap_or_else(|| "?".into());
        let _ = writeln!(
            out,
            "{} page {}/{} {} ({} per page, {} total)",
            if page.can_previous { "<" } else { " " },
            page.page_index + 1,
            pages,
            if page.can_next { ">" } else { " " },
            page.page_size,
            page.total_elements
        );
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use datagrid::{CellValue, ColumnDef, DataGrid, GridOptions, PageState, Record};

    fn grid() -> DataGrid<Record> {
        DataGrid::new(
            vec![
                ColumnDef::new("code", "Code").width(100),
                ColumnDef::new("qty", "Qty").width(100).summary().align(Alignment::Right),
            ],
            GridOptions::default()
                .with_editable(true)
                .with_pagination(true)
                .with_summary(true)
                .with_title("Parts"),
        )
        .unwrap()
        .with_rows(vec![
            Record::new().set("id", 1).set("code", "X1").set("qty", 2),
            Record::new().set("id", 2).set("code", "X2").set("qty", 3),
        ])
        .with_page(PageState::new(0, 2, 5))
    }

    #[test]
    fn test_fit() {
        assert_eq!(fit("ab", 4, Alignment::Left), "ab  ");
        assert_eq!(fit("ab", 4, Alignment::Right), "  ab");
        assert_eq!(fit("abcdef", 4, Alignment::Left), "abc~");
        assert_eq!(chars(20), MIN_CHARS);
        assert_eq!(chars(150), 15);
    }

    #[test]
    fn test_render_grid() {
        let grid = grid();
        grid.toggle_row_selection("1");
        grid.begin_edit(0, "code");
        grid.update_buffer(CellValue::from("X9"));

        let text = render(&grid.view());

        assert!(text.starts_with("== Parts == 5 rows, 1 selected"));
        assert!(text.contains("[X9]"));
        assert!(text.contains("    2 [x]"));
        assert!(text.contains("page 1/3 >"));
        let sum_line = text.lines().find(|l| l.trim_start().starts_with("sum")).unwrap();
        assert!(sum_line.ends_with('5'));
    }
}
