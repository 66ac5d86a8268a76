use std::ops::Range;

use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    style::{Color, Modifier, Style, Stylize},
    symbols::border,
    text::Line,
    widgets::{Block, Cell, Paragraph, Row, Table},
};

use crate::color::Rgb;
use crate::domain::SortDirection;
use crate::style;
use crate::table::{CellView, HeaderView, RowView, TableView};
use crate::viewer::{DEFAULT_COLUMN_WIDTH, Viewer};

pub struct TableUI {
    instructions: Line<'static>,
}

impl Default for TableUI {
    fn default() -> Self {
        Self::new()
    }
}

impl TableUI {
    pub fn new() -> Self {
        Self {
            instructions: Line::from(vec![
                " Move ".into(),
                "<Arrows>".blue().bold(),
                " Page ".into(),
                "<PgUp/PgDn>".blue().bold(),
                " Sort ".into(),
                "<S>".blue().bold(),
                " Quit ".into(),
                "<Q> ".blue().bold(),
            ]),
        }
    }

    pub fn draw(&self, viewer: &Viewer, frame: &mut Frame) {
        let view = viewer.view();
        let [table_area, status_area] =
            Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(frame.area());

        let block = Block::bordered()
            .title(Line::from(format!(" {} ", viewer.name).bold()).centered())
            .title_bottom(self.instructions.clone().centered())
            .border_set(border::THICK);
        let inner = block.inner(table_area);
        frame.render_widget(block, table_area);

        let columns = viewer.visible_columns();
        let widths: Vec<Constraint> = view.headers[columns.clone()]
            .iter()
            .map(|header| {
                Constraint::Length(header.width.unwrap_or(DEFAULT_COLUMN_WIDTH as u16 - 1))
            })
            .collect();

        let [body_area, bottom_area] = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(view.bottom_rows.len() as u16),
        ])
        .areas(inner);

        let selected_column = viewer.selected_column();
        let first_row = viewer.first_visible_row();
        let header = Row::new(
            view.headers[columns.clone()]
                .iter()
                .map(header_cell)
                .collect::<Vec<_>>(),
        )
        .style(Style::new().bold().underlined());
        let rows = view.rows.iter().enumerate().map(|(i, row)| {
            let cursor = (first_row + i == viewer.selected_row()).then_some(selected_column);
            body_row(row, columns.clone(), cursor)
        });
        frame.render_widget(
            Table::new(rows, widths.clone())
                .header(header)
                .column_spacing(1),
            body_area,
        );

        if !view.bottom_rows.is_empty() {
            let bottom = view
                .bottom_rows
                .iter()
                .map(|row| body_row(row, columns.clone(), None).italic());
            frame.render_widget(Table::new(bottom, widths).column_spacing(1), bottom_area);
        }

        frame.render_widget(Paragraph::new(status_line(viewer)), status_area);
    }
}

fn status_line(viewer: &Viewer) -> Line<'static> {
    let table = viewer.table();
    let sort = match (table.sort_column_id(), table.sort_direction()) {
        (Some(column_id), Some(direction)) => {
            format!("sorted by {column_id} {}", sort_indicator(Some(direction)))
        }
        _ => "unsorted".to_string(),
    };
    Line::from(vec![
        format!(" {} rows ", table.data().len()).yellow(),
        format!("| row {} col {} ", viewer.selected_row() + 1, viewer.selected_column() + 1)
            .into(),
        format!("| {sort}").dark_gray(),
    ])
}

fn sort_indicator(direction: Option<SortDirection>) -> &'static str {
    match direction {
        Some(SortDirection::Ascending) => "▲",
        Some(SortDirection::Descending) => "▼",
        None => "",
    }
}

fn header_cell(header: &HeaderView) -> Cell<'static> {
    let indicator = sort_indicator(header.sort_direction);
    let contents = if indicator.is_empty() {
        header.contents.clone()
    } else {
        format!("{} {indicator}", header.contents)
    };
    let cell = Cell::from(contents);
    if has_class(header.class_name.as_deref(), "column-highlight") {
        cell.reversed()
    } else {
        cell
    }
}

fn body_row(row: &RowView, columns: Range<usize>, cursor: Option<usize>) -> Row<'static> {
    let start = columns.start;
    let cells: Vec<Cell> = row.cells[columns]
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let content = cell
                .content
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default();
            let mut style = cell_style(cell, row.highlighted);
            if cursor == Some(start + i) {
                style = style.add_modifier(Modifier::REVERSED);
            }
            Cell::from(content).style(style)
        })
        .collect();
    Row::new(cells)
}

/// Terminal style for a cell from its inline style and classes.
pub fn cell_style(cell: &CellView, highlighted_row: bool) -> Style {
    let mut style = Style::new();
    if let Some(cell_style) = &cell.style {
        style = apply_inline_style(style, cell_style);
    }
    if highlighted_row {
        if style.bg.is_none() {
            style = style.bg(Color::DarkGray);
        }
        style = style.add_modifier(Modifier::BOLD);
    }
    if has_class(cell.class_name.as_deref(), "column-highlight") {
        style = style.add_modifier(Modifier::BOLD);
    }
    if has_class(cell.class_name.as_deref(), "highlight-min-max") {
        style = style.add_modifier(Modifier::UNDERLINED);
    }
    style
}

fn apply_inline_style(mut style: Style, inline: &style::Style) -> Style {
    if let Some(rgb) = inline.get("backgroundColor").and_then(Rgb::parse) {
        style = style.bg(Color::Rgb(rgb.r, rgb.g, rgb.b));
    }
    if let Some(rgb) = inline.get("color").and_then(Rgb::parse) {
        style = style.fg(Color::Rgb(rgb.r, rgb.g, rgb.b));
    }
    style
}

fn has_class(class_name: Option<&str>, class: &str) -> bool {
    class_name.is_some_and(|names| names.split_whitespace().any(|name| name == class))
}

/// Plain text rendering of a table view, columns padded to their widest cell.
pub fn render_text(view: &TableView) -> String {
    let headers: Vec<String> = view
        .headers
        .iter()
        .map(|header| {
            let indicator = sort_indicator(header.sort_direction);
            if indicator.is_empty() {
                header.contents.clone()
            } else {
                format!("{} {indicator}", header.contents)
            }
        })
        .collect();
    let to_text = |row: &RowView| -> Vec<String> {
        row.cells
            .iter()
            .map(|cell| {
                cell.content
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_default()
            })
            .collect()
    };
    let body: Vec<Vec<String>> = view.rows.iter().map(to_text).collect();
    let bottom: Vec<Vec<String>> = view.bottom_rows.iter().map(to_text).collect();

    let widths: Vec<usize> = (0..headers.len())
        .map(|c| {
            body.iter()
                .chain(&bottom)
                .map(|cells| cells[c].chars().count())
                .chain([headers[c].chars().count()])
                .max()
                .unwrap_or(0)
        })
        .collect();
    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:<width$}"))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![line(&headers)];
    lines.push(
        widths
            .iter()
            .map(|&width| "-".repeat(width))
            .collect::<Vec<_>>()
            .join("  "),
    );
    lines.extend(body.iter().map(|cells| line(cells)));
    if !bottom.is_empty() {
        lines.push(lines[1].clone());
        lines.extend(bottom.iter().map(|cells| line(cells)));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::column::Column;
    use crate::domain::DataType;
    use crate::table::{Table as TacoTable, TableConfig};
    use crate::value::{Row as TacoRow, Value};

    #[test]
    fn inline_colors_become_terminal_colors() {
        let cell = CellView {
            content: Some(Value::from(3)),
            class_name: Some("has-heatmap column-highlight".to_string()),
            style: Some(style::Style::from([
                ("backgroundColor", "rgb(8, 48, 107)"),
                ("color", "#ffffff"),
            ])),
        };
        let style = cell_style(&cell, false);
        assert_eq!(style.bg, Some(Color::Rgb(8, 48, 107)));
        assert_eq!(style.fg, Some(Color::Rgb(255, 255, 255)));
        assert!(style.add_modifier.contains(Modifier::BOLD));
        assert!(!style.add_modifier.contains(Modifier::UNDERLINED));

        let plain = CellView {
            content: None,
            class_name: None,
            style: None,
        };
        assert_eq!(cell_style(&plain, true).bg, Some(Color::DarkGray));
    }

    #[test]
    fn renders_aligned_text() {
        let columns = vec![
            Column::new("name").data_type(DataType::String),
            Column::new("score").data_type(DataType::Number),
        ];
        let data = vec![
            Arc::new(TacoRow::from([("name", Value::from("Bob")), ("score", Value::from(2))])),
            Arc::new(TacoRow::from([("name", Value::from("Al")), ("score", Value::from(10))])),
        ];
        let table = TacoTable::new(
            columns,
            data,
            vec![],
            TableConfig::default().initial_sort_column_id("score"),
        );
        let text = render_text(&table.view());
        assert_eq!(
            text,
            "name  score ▲\n----  -------\nBob   2\nAl    10"
        );
    }
}
