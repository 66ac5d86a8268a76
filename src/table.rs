//! The table controller: owns rows, sort and highlight state and summaries,
//! and produces a render-ready [`TableView`].

use std::ops::Range;
use std::sync::Arc;

use derive_setters::Setters;
use tracing::{debug, trace};

use crate::column::{BottomCell, Column, column_by_id, validate_columns};
use crate::domain::{DataType, SortDirection};
use crate::plugin::{Plugin, compute_td_class_name, compute_td_style, summarize_columns};
use crate::resolve::{BottomContext, CellContext, RowNumber, get_cell_data, render_cell};
use crate::sort::sort_data;
use crate::style::{Style, class_names};
use crate::summarize::Summary;
use crate::value::{Row, Value};

pub type RowClassNameFn = Arc<dyn Fn(&Row, usize) -> Option<String> + Send + Sync>;
pub type OnSort = Arc<dyn Fn(&str, SortDirection, &[Arc<Row>]) + Send + Sync>;

/// Columns shown under a shared header.
#[derive(Debug, Clone, Default, Setters)]
#[setters(strip_option, into)]
pub struct ColumnGroup {
    pub header: Option<String>,
    #[setters(skip)]
    pub columns: Vec<String>,
    pub class_name: Option<String>,
}

impl ColumnGroup {
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    fn position(&self, column_id: &str) -> Option<usize> {
        self.columns.iter().position(|id| id == column_id)
    }

    fn classes(&self, column_id: &str) -> Vec<&str> {
        let mut classes: Vec<&str> = self.class_name.as_deref().into_iter().collect();
        if self.position(column_id) == Some(0) {
            classes.push("group-first");
        }
        if self.position(column_id) == Some(self.columns.len().saturating_sub(1)) {
            classes.push("group-last");
        }
        classes
    }
}

/// Rows rendered below the data, outside sorting.
#[derive(Clone)]
pub enum BottomRows {
    /// Built from each column's `bottom_data`.
    FromColumns,
    Rows(Vec<Arc<Row>>),
}

#[derive(Clone, Setters)]
#[setters(strip_option)]
pub struct TableConfig {
    pub sortable: bool,
    #[setters(into)]
    pub initial_sort_column_id: Option<String>,
    pub initial_sort_direction: Option<SortDirection>,
    pub row_highlighting: bool,
    pub column_highlighting: bool,
    pub striped: bool,
    pub full_width: bool,
    #[setters(into)]
    pub class_name: Option<String>,
    pub column_groups: Vec<ColumnGroup>,
    pub bottom_rows: Option<BottomRows>,
    #[setters(skip)]
    pub row_class_name: Option<RowClassNameFn>,
    #[setters(skip)]
    pub on_sort: Option<OnSort>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            sortable: true,
            initial_sort_column_id: None,
            initial_sort_direction: None,
            row_highlighting: true,
            column_highlighting: false,
            striped: false,
            full_width: true,
            class_name: None,
            column_groups: Vec::new(),
            bottom_rows: None,
            row_class_name: None,
            on_sort: None,
        }
    }
}

impl TableConfig {
    pub fn row_class_name(
        mut self,
        f: impl Fn(&Row, usize) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.row_class_name = Some(Arc::new(f));
        self
    }

    pub fn on_sort(
        mut self,
        f: impl Fn(&str, SortDirection, &[Arc<Row>]) + Send + Sync + 'static,
    ) -> Self {
        self.on_sort = Some(Arc::new(f));
        self
    }

    fn column_group(&self, column_id: &str) -> Option<&ColumnGroup> {
        self.column_groups
            .iter()
            .find(|group| group.position(column_id).is_some())
    }
}

/// Result of a sort request, ready to be applied.
#[derive(Debug, Clone)]
pub struct SortOutcome {
    pub sort_direction: SortDirection,
    pub sort_column_id: String,
    pub data: Vec<Arc<Row>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderView {
    pub column_id: String,
    pub contents: String,
    pub class_name: Option<String>,
    pub sortable: bool,
    pub sort_direction: Option<SortDirection>,
    pub width: Option<u16>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroupHeaderView {
    pub contents: Option<String>,
    pub span: usize,
    pub class_name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CellView {
    /// `None` renders an empty cell.
    pub content: Option<Value>,
    pub class_name: Option<String>,
    pub style: Option<Style>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub class_name: Option<String>,
    pub highlighted: bool,
    pub cells: Vec<CellView>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub class_name: String,
    pub group_headers: Option<Vec<GroupHeaderView>>,
    pub headers: Vec<HeaderView>,
    pub rows: Vec<RowView>,
    pub bottom_rows: Vec<RowView>,
}

pub struct Table {
    columns: Vec<Column>,
    plugins: Vec<Arc<dyn Plugin>>,
    config: TableConfig,
    data: Vec<Arc<Row>>,
    summaries: Vec<Option<Summary>>,
    sort_column_id: Option<String>,
    sort_direction: Option<SortDirection>,
    highlighted_row: Option<Arc<Row>>,
    highlighted_column_id: Option<String>,
}

impl Table {
    pub fn new(
        columns: Vec<Column>,
        data: Vec<Arc<Row>>,
        plugins: Vec<Arc<dyn Plugin>>,
        config: TableConfig,
    ) -> Self {
        if cfg!(debug_assertions) {
            validate_columns(&columns);
        }

        let summaries = summarize_columns(&columns, &data, &plugins);
        let mut table = Self {
            columns,
            plugins,
            config,
            data,
            summaries,
            sort_column_id: None,
            sort_direction: None,
            highlighted_row: None,
            highlighted_column_id: None,
        };

        if table.config.sortable {
            let initial = table.config.initial_sort_column_id.as_deref().and_then(|id| {
                column_by_id(&table.columns, id).map(|column| {
                    let direction = table
                        .config
                        .initial_sort_direction
                        .or(column.first_sort_direction)
                        .unwrap_or_default();
                    (column.id.clone(), direction)
                })
            });
            if let Some((column_id, direction)) = initial {
                debug!("Initial sort by {column_id} {direction:?}");
                table.data = sort_data(&table.data, &column_id, direction, &table.columns);
                table.sort_column_id = Some(column_id);
                table.sort_direction = Some(direction);
            }
        }
        table
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Rows in display order.
    pub fn data(&self) -> &[Arc<Row>] {
        &self.data
    }

    /// Summaries index-aligned with the columns.
    pub fn summaries(&self) -> &[Option<Summary>] {
        &self.summaries
    }

    pub fn sort_column_id(&self) -> Option<&str> {
        self.sort_column_id.as_deref()
    }

    pub fn sort_direction(&self) -> Option<SortDirection> {
        self.sort_direction
    }

    pub fn highlighted_row(&self) -> Option<&Arc<Row>> {
        self.highlighted_row.as_ref()
    }

    pub fn highlighted_column_id(&self) -> Option<&str> {
        self.highlighted_column_id.as_deref()
    }

    /// Works out what sorting by a column would do without changing the table.
    /// A new column starts at its first sort direction, the current column
    /// flips direction.
    pub fn sort_request(&self, column_id: &str) -> Option<SortOutcome> {
        let column = column_by_id(&self.columns, column_id)?;
        let sort_direction = match self.sort_direction {
            Some(direction) if self.sort_column_id.as_deref() == Some(column_id) => {
                direction.invert()
            }
            _ => column.first_sort_direction.unwrap_or_default(),
        };

        Some(SortOutcome {
            sort_direction,
            sort_column_id: column.id.clone(),
            data: sort_data(&self.data, column_id, sort_direction, &self.columns),
        })
    }

    /// Sorts by a column and notifies `on_sort`. Returns false when the table
    /// is not sortable or the column is unknown.
    pub fn sort(&mut self, column_id: &str) -> bool {
        if !self.config.sortable {
            trace!("Ignoring sort request on a table that is not sortable");
            return false;
        }
        let Some(outcome) = self.sort_request(column_id) else {
            return false;
        };

        debug!(
            "Sorted by {} {:?}",
            outcome.sort_column_id, outcome.sort_direction
        );
        self.data = outcome.data;
        self.sort_direction = Some(outcome.sort_direction);
        self.sort_column_id = Some(outcome.sort_column_id);
        if let (Some(on_sort), Some(column_id)) = (&self.config.on_sort, &self.sort_column_id) {
            on_sort(column_id, outcome.sort_direction, &self.data);
        }
        true
    }

    /// Replaces the rows, keeping the current sort and recomputing summaries.
    pub fn set_data(&mut self, data: Vec<Arc<Row>>) {
        if cfg!(debug_assertions) {
            validate_columns(&self.columns);
        }

        self.summaries = summarize_columns(&self.columns, &data, &self.plugins);
        self.data = match (&self.sort_column_id, self.sort_direction) {
            (Some(column_id), Some(direction)) => {
                sort_data(&data, column_id, direction, &self.columns)
            }
            _ => data,
        };
        trace!("Table data set to {} rows", self.data.len());
    }

    /// Highlights a row, or clears the highlight with `None`. Returns false
    /// when row highlighting is switched off.
    pub fn highlight_row(&mut self, row: Option<Arc<Row>>) -> bool {
        if !self.config.row_highlighting {
            return false;
        }
        self.highlighted_row = row;
        true
    }

    pub fn highlight_column(&mut self, column_id: Option<String>) -> bool {
        if !self.config.column_highlighting {
            return false;
        }
        self.highlighted_column_id = column_id;
        true
    }

    fn is_highlighted_row(&self, row: &Arc<Row>) -> bool {
        self.highlighted_row
            .as_ref()
            .is_some_and(|highlighted| Arc::ptr_eq(highlighted, row))
    }

    fn is_highlighted_column(&self, column: &Column) -> bool {
        self.highlighted_column_id.as_deref() == Some(column.id.as_str())
    }

    fn header_sortable(&self, column: &Column) -> bool {
        self.config.sortable && column.data_type != DataType::None && column.sortable
    }

    fn group_headers(&self) -> Option<Vec<GroupHeaderView>> {
        let groups = &self.config.column_groups;
        if !groups.iter().any(|group| group.header.is_some()) {
            return None;
        }

        let headers = self
            .columns
            .iter()
            .enumerate()
            .filter_map(|(i, column)| match self.config.column_group(&column.id) {
                None => Some(GroupHeaderView {
                    contents: None,
                    span: 1,
                    class_name: "group-header-no-group".to_string(),
                }),
                Some(group) if group.position(&column.id) == Some(0) => {
                    let numbered = format!("group-header-{i}");
                    Some(GroupHeaderView {
                        contents: group.header.clone(),
                        span: group.columns.len(),
                        class_name: class_names([
                            Some("group-header"),
                            Some(numbered.as_str()),
                            group.class_name.as_deref(),
                        ])
                        .unwrap_or_default(),
                    })
                }
                Some(_) => None,
            })
            .collect();
        Some(headers)
    }

    fn header(&self, column: &Column) -> HeaderView {
        let sortable = self.header_sortable(column);
        let sort_direction = self
            .sort_direction
            .filter(|_| self.sort_column_id.as_deref() == Some(column.id.as_str()));
        let group_classes = self
            .config
            .column_group(&column.id)
            .map(|group| group.classes(&column.id))
            .unwrap_or_default();
        let data_type = format!("data-type-{}", column.data_type);

        let mut classes = vec![column.class_name.as_deref(), column.th_class_name.as_deref()];
        classes.extend(group_classes.into_iter().map(Some));
        classes.extend([
            Some(data_type.as_str()),
            sortable.then_some("sortable"),
            self.is_highlighted_column(column).then_some("column-highlight"),
            (sort_direction == Some(SortDirection::Ascending)).then_some("sort-ascending"),
            (sort_direction == Some(SortDirection::Descending)).then_some("sort-descending"),
            sort_direction.is_some().then_some("sorted"),
        ]);

        HeaderView {
            column_id: column.id.clone(),
            contents: column.header_text().to_string(),
            class_name: class_names(classes),
            sortable,
            sort_direction,
            width: column.width,
        }
    }

    fn cell(
        &self,
        column_index: usize,
        row: &Row,
        row_number: RowNumber,
        highlighted_row: bool,
    ) -> CellView {
        let column = &self.columns[column_index];
        let cell_data = get_cell_data(column, row, row_number, &self.data, &self.columns);
        let highlighted_column = self.is_highlighted_column(column);
        let cell = CellContext {
            cell_data: &cell_data,
            column_summary: self.summaries.get(column_index).and_then(Option::as_ref),
            column,
            row,
            highlighted_column,
            highlighted_row,
            row_number,
            table_data: &self.data,
            columns: &self.columns,
        };

        let td_class_name = compute_td_class_name(&cell, &self.plugins);
        let group_classes = self
            .config
            .column_group(&column.id)
            .map(|group| group.classes(&column.id))
            .unwrap_or_default();
        let data_type = format!("data-type-{}", column.data_type);

        let mut classes = vec![column.class_name.as_deref()];
        classes.extend(group_classes.into_iter().map(Some));
        classes.extend([
            td_class_name.as_deref(),
            Some(data_type.as_str()),
            highlighted_column.then_some("column-highlight"),
        ]);

        CellView {
            content: render_cell(&cell_data, column, row, row_number, &self.data, &self.columns),
            class_name: class_names(classes),
            style: compute_td_style(&cell, &self.plugins),
        }
    }

    fn body_row(&self, i: usize, row: &Arc<Row>) -> RowView {
        let highlighted = self.is_highlighted_row(row);
        let row_class_name = self
            .config
            .row_class_name
            .as_ref()
            .and_then(|row_class_name| row_class_name(row, i));

        RowView {
            class_name: class_names([
                row_class_name.as_deref(),
                highlighted.then_some("row-highlight"),
            ]),
            highlighted,
            cells: (0..self.columns.len())
                .map(|c| self.cell(c, row, RowNumber::Data(i), highlighted))
                .collect(),
        }
    }

    /// Rows built from the columns' bottom data. Each cell is computed from
    /// the column summary and the sorted data.
    fn bottom_data_rows(&self) -> Vec<Row> {
        let count = self
            .columns
            .iter()
            .filter_map(|column| column.bottom_data.as_ref().map(|bottom| bottom.len()))
            .max()
            .unwrap_or(0);

        (0..count)
            .map(|i| {
                self.columns
                    .iter()
                    .enumerate()
                    .filter_map(|(c, column)| {
                        let cell = column.bottom_data.as_ref()?.cell(i)?;
                        let value = match cell {
                            BottomCell::Static(value) => value.clone(),
                            BottomCell::Compute(f) => f(&BottomContext {
                                column_summary: self.summaries.get(c).and_then(Option::as_ref),
                                column,
                                table_data: &self.data,
                                columns: &self.columns,
                            }),
                        };
                        Some((column.id.clone(), value))
                    })
                    .collect()
            })
            .collect()
    }

    fn bottom_row(&self, i: usize, row: &Row) -> RowView {
        RowView {
            class_name: Some("bottom-row".to_string()),
            highlighted: false,
            cells: (0..self.columns.len())
                .map(|c| self.cell(c, row, RowNumber::Bottom(i), false))
                .collect(),
        }
    }

    pub fn bottom_row_count(&self) -> usize {
        match &self.config.bottom_rows {
            None => 0,
            Some(BottomRows::FromColumns) => self
                .columns
                .iter()
                .filter_map(|column| column.bottom_data.as_ref().map(|bottom| bottom.len()))
                .max()
                .unwrap_or(0),
            Some(BottomRows::Rows(rows)) => rows.len(),
        }
    }

    pub fn view(&self) -> TableView {
        self.view_window(0..self.data.len())
    }

    /// Same as `view` but only builds the body rows in `rows`. Row numbers
    /// stay relative to the whole sorted data.
    pub fn view_window(&self, rows: Range<usize>) -> TableView {
        let end = rows.end.min(self.data.len());
        let rows = rows.start.min(end)..end;
        let bottom_rows: Vec<RowView> = match &self.config.bottom_rows {
            None => Vec::new(),
            Some(BottomRows::FromColumns) => self
                .bottom_data_rows()
                .iter()
                .enumerate()
                .map(|(i, row)| self.bottom_row(i, row))
                .collect(),
            Some(BottomRows::Rows(rows)) => rows
                .iter()
                .enumerate()
                .map(|(i, row)| self.bottom_row(i, row))
                .collect(),
        };

        let class_name = class_names([
            Some("taco-table"),
            self.config.class_name.as_deref(),
            Some(if self.config.full_width {
                "table-full-width"
            } else {
                "table-not-full-width"
            }),
            self.config.striped.then_some("table-striped"),
            self.config.sortable.then_some("table-sortable"),
        ])
        .unwrap_or_default();

        TableView {
            class_name,
            group_headers: self.group_headers(),
            headers: self.columns.iter().map(|column| self.header(column)).collect(),
            rows: self.data[rows.clone()]
                .iter()
                .enumerate()
                .map(|(i, row)| self.body_row(rows.start + i, row))
                .collect(),
            bottom_rows,
        }
    }
}
