//! State of the terminal viewer: a table plus the cursor moving over it.

use tracing::{debug, trace};

use crate::domain::Message;
use crate::table::{Table, TableView};

/// Border, header and status line.
const CHROME_HEIGHT: usize = 4;
pub const DEFAULT_COLUMN_WIDTH: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Running,
    Exiting,
}

pub struct Viewer {
    pub status: Status,
    pub name: String,
    table: Table,
    cursor_row: usize,
    offset_row: usize,
    cursor_column: usize,
    offset_column: usize,
    table_height: usize,
    visible_columns: usize,
}

impl Viewer {
    pub fn new(name: impl Into<String>, table: Table, width: usize, height: usize) -> Self {
        let mut viewer = Self {
            status: Status::Running,
            name: name.into(),
            table,
            cursor_row: 0,
            offset_row: 0,
            cursor_column: 0,
            offset_column: 0,
            table_height: 1,
            visible_columns: 1,
        };
        viewer.resize(width, height);
        viewer
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn selected_row(&self) -> usize {
        self.offset_row + self.cursor_row
    }

    pub fn first_visible_row(&self) -> usize {
        self.offset_row
    }

    pub fn selected_column(&self) -> usize {
        self.offset_column + self.cursor_column
    }

    pub fn table_height(&self) -> usize {
        self.table_height
    }

    /// Index range of the columns on screen.
    pub fn visible_columns(&self) -> std::ops::Range<usize> {
        let end = (self.offset_column + self.visible_columns).min(self.table.columns().len());
        self.offset_column..end
    }

    /// The table view restricted to the rows on screen.
    pub fn view(&self) -> TableView {
        self.table
            .view_window(self.offset_row..self.offset_row + self.table_height)
    }

    pub fn update(&mut self, message: Message) {
        match message {
            Message::Quit => self.status = Status::Exiting,
            Message::MoveUp => self.move_up(1),
            Message::MoveDown => self.move_down(1),
            Message::MovePageUp => self.move_up(self.table_height),
            Message::MovePageDown => self.move_down(self.table_height),
            Message::MoveLeft => self.move_left(),
            Message::MoveRight => self.move_right(),
            Message::Sort => self.sort_current_column(),
            Message::Resize(width, height) => self.resize(width, height),
        }
        self.sync_highlight();
    }

    fn resize(&mut self, width: usize, height: usize) {
        let table_height = height
            .saturating_sub(CHROME_HEIGHT + self.table.bottom_row_count())
            .max(1);
        trace!(
            "UI was resized! w:{width}, h:{}->{}",
            self.table_height, table_height
        );
        self.table_height = table_height;
        self.visible_columns = (width.saturating_sub(2) / DEFAULT_COLUMN_WIDTH).max(1);

        // keep the selection on screen
        let selected_row = self.selected_row();
        if self.cursor_row >= self.table_height {
            self.cursor_row = self.table_height - 1;
            self.offset_row = selected_row - self.cursor_row;
        }
        let selected_column = self.selected_column();
        if self.cursor_column >= self.visible_columns {
            self.cursor_column = self.visible_columns - 1;
            self.offset_column = selected_column - self.cursor_column;
        }
    }

    fn move_up(&mut self, size: usize) {
        if self.cursor_row >= size {
            self.cursor_row -= size;
        } else {
            // at the top of the screen, shift the window by the rest
            self.offset_row = self.offset_row.saturating_sub(size - self.cursor_row);
            self.cursor_row = 0;
        }
    }

    fn move_down(&mut self, size: usize) {
        let rows = self.table.data().len();
        if self.selected_row() + 1 >= rows {
            return;
        }
        if self.cursor_row + size < self.table_height {
            self.cursor_row = (self.cursor_row + size).min(rows - 1 - self.offset_row);
        } else {
            // at the bottom of the screen, shift the window
            let selected = (self.selected_row() + size).min(rows - 1);
            self.cursor_row = self.table_height - 1;
            self.offset_row = selected.saturating_sub(self.cursor_row);
            self.cursor_row = selected - self.offset_row;
        }
    }

    fn move_left(&mut self) {
        if self.cursor_column > 0 {
            self.cursor_column -= 1;
        } else if self.offset_column > 0 {
            self.offset_column -= 1;
        }
    }

    fn move_right(&mut self) {
        if self.selected_column() + 1 >= self.table.columns().len() {
            return;
        }
        if self.cursor_column + 1 < self.visible_columns {
            self.cursor_column += 1;
        } else {
            self.offset_column += 1;
        }
    }

    fn sort_current_column(&mut self) {
        let Some(column_id) = self
            .table
            .columns()
            .get(self.selected_column())
            .map(|column| column.id.clone())
        else {
            return;
        };
        if self.table.sort(&column_id) {
            debug!(
                "Sorted {} by {column_id} {:?}",
                self.name,
                self.table.sort_direction()
            );
        }
    }

    fn sync_highlight(&mut self) {
        let row = self.table.data().get(self.selected_row()).cloned();
        let column_id = self
            .table
            .columns()
            .get(self.selected_column())
            .map(|column| column.id.clone());
        self.table.highlight_row(row);
        self.table.highlight_column(column_id);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::column::Column;
    use crate::domain::{DataType, SortDirection};
    use crate::table::TableConfig;
    use crate::value::{Row, Value};

    fn viewer(rows: usize, height: usize) -> Viewer {
        let columns = vec![
            Column::new("id").data_type(DataType::Number),
            Column::new("name").data_type(DataType::String),
            Column::new("score").data_type(DataType::Number),
        ];
        let data = (0..rows)
            .map(|i| {
                Arc::new(Row::from([
                    ("id", Value::from(i)),
                    ("name", Value::from(format!("n{}", rows - i))),
                    ("score", Value::from(i % 3)),
                ]))
            })
            .collect();
        let table = Table::new(
            columns,
            data,
            vec![],
            TableConfig::default().column_highlighting(true),
        );
        Viewer::new("test", table, 2 + 2 * DEFAULT_COLUMN_WIDTH, height)
    }

    #[test]
    fn moving_down_scrolls_the_window() {
        let mut viewer = viewer(10, CHROME_HEIGHT + 3);
        assert_eq!(viewer.table_height(), 3);
        for _ in 0..4 {
            viewer.update(Message::MoveDown);
        }
        assert_eq!(viewer.selected_row(), 4);
        assert_eq!(viewer.view().rows.len(), 3);
        assert!(viewer.view().rows[2].highlighted);

        viewer.update(Message::MovePageDown);
        viewer.update(Message::MovePageDown);
        assert_eq!(viewer.selected_row(), 9);
        viewer.update(Message::MoveDown);
        assert_eq!(viewer.selected_row(), 9);

        viewer.update(Message::MovePageUp);
        viewer.update(Message::MovePageUp);
        viewer.update(Message::MovePageUp);
        viewer.update(Message::MovePageUp);
        assert_eq!(viewer.selected_row(), 0);
    }

    #[test]
    fn page_up_moves_a_full_page_from_mid_screen() {
        let mut viewer = viewer(30, CHROME_HEIGHT + 5);
        for _ in 0..24 {
            viewer.update(Message::MoveDown);
        }
        assert_eq!(viewer.first_visible_row(), 20);
        viewer.update(Message::MoveUp);
        assert_eq!(viewer.selected_row(), 23);

        viewer.update(Message::MovePageUp);
        assert_eq!(viewer.selected_row(), 18);
        assert_eq!(viewer.first_visible_row(), 18);
        assert!(viewer.view().rows[0].highlighted);
    }

    #[test]
    fn moving_right_scrolls_columns() {
        let mut viewer = viewer(3, 20);
        assert_eq!(viewer.visible_columns(), 0..2);
        viewer.update(Message::MoveRight);
        viewer.update(Message::MoveRight);
        viewer.update(Message::MoveRight);
        assert_eq!(viewer.selected_column(), 2);
        assert_eq!(viewer.visible_columns(), 1..3);
        assert_eq!(viewer.table().highlighted_column_id(), Some("score"));
        viewer.update(Message::MoveLeft);
        viewer.update(Message::MoveLeft);
        assert_eq!(viewer.visible_columns(), 0..2);
    }

    #[test]
    fn sort_uses_selected_column_and_toggles() {
        let mut viewer = viewer(3, 20);
        viewer.update(Message::MoveRight);
        viewer.update(Message::Sort);
        assert_eq!(viewer.table().sort_column_id(), Some("name"));
        assert_eq!(viewer.table().sort_direction(), Some(SortDirection::Ascending));
        assert_eq!(viewer.table().data()[0].get("name"), &Value::from("n1"));
        viewer.update(Message::Sort);
        assert_eq!(viewer.table().sort_direction(), Some(SortDirection::Descending));
        assert_eq!(viewer.table().data()[0].get("name"), &Value::from("n3"));
    }

    #[test]
    fn resize_keeps_cursor_visible_and_quit_exits() {
        let mut viewer = viewer(20, 30);
        for _ in 0..10 {
            viewer.update(Message::MoveDown);
        }
        viewer.update(Message::Resize(80, CHROME_HEIGHT + 4));
        assert_eq!(viewer.selected_row(), 10);
        assert_eq!(viewer.view().rows.len(), 4);
        viewer.update(Message::Quit);
        assert_eq!(viewer.status, Status::Exiting);
    }
}
