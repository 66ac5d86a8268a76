//! Resolution of cell data, sort values and rendered content.

use std::sync::Arc;

use crate::column::{Column, ValueSource};
use crate::summarize::Summary;
use crate::value::{Row, Value};

/// Position of a row being resolved. Bottom rows are not part of the table
/// data; their cells are read by column id and never go through `value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowNumber {
    Data(usize),
    Bottom(usize),
}

impl RowNumber {
    pub fn is_bottom(self) -> bool {
        matches!(self, RowNumber::Bottom(_))
    }

    pub fn index(self) -> usize {
        match self {
            RowNumber::Data(i) | RowNumber::Bottom(i) => i,
        }
    }
}

/// Passed to `value` functions.
pub struct ValueContext<'a> {
    pub row_index: usize,
    pub table_data: &'a [Arc<Row>],
    pub columns: &'a [Column],
}

/// Passed to renderers.
pub struct RenderContext<'a> {
    pub column: &'a Column,
    pub row: &'a Row,
    pub row_number: RowNumber,
    pub table_data: &'a [Arc<Row>],
    pub columns: &'a [Column],
}

/// Passed to bottom row functions.
pub struct BottomContext<'a> {
    pub column_summary: Option<&'a Summary>,
    pub column: &'a Column,
    pub table_data: &'a [Arc<Row>],
    pub columns: &'a [Column],
}

/// Everything known about a cell when computing its class name and style.
pub struct CellContext<'a> {
    pub cell_data: &'a Value,
    pub column_summary: Option<&'a Summary>,
    pub column: &'a Column,
    pub row: &'a Row,
    pub highlighted_column: bool,
    pub highlighted_row: bool,
    pub row_number: RowNumber,
    pub table_data: &'a [Arc<Row>],
    pub columns: &'a [Column],
}

impl CellContext<'_> {
    pub fn sort_value(&self) -> Value {
        get_sort_value_from_cell_data(self.cell_data, self.column, self.row)
    }

    /// Field of the column summary, `Null` when there is no summary.
    pub fn summary_field(&self, key: &str) -> &Value {
        match self.column_summary {
            Some(summary) => summary.get(key),
            None => &Value::Null,
        }
    }
}

/// Gets the value of a cell. A `Compute` source is called, a `Key` source reads
/// that key of the row, and without a source the column id is the key.
pub fn get_cell_data(
    column: &Column,
    row: &Row,
    row_number: RowNumber,
    table_data: &[Arc<Row>],
    columns: &[Column],
) -> Value {
    if row_number.is_bottom() {
        return row.get(&column.id).clone();
    }

    match &column.value {
        Some(ValueSource::Compute(f)) => f(
            row,
            &ValueContext {
                row_index: row_number.index(),
                table_data,
                columns,
            },
        ),
        Some(ValueSource::Key(key)) => row.get(key).clone(),
        None => row.get(&column.id).clone(),
    }
}

pub fn get_sort_value_from_cell_data(cell_data: &Value, column: &Column, row: &Row) -> Value {
    match &column.sort_value {
        Some(sort_value) => sort_value(cell_data, row),
        None => cell_data.clone(),
    }
}

pub fn get_sort_value(
    column: &Column,
    row: &Row,
    row_number: RowNumber,
    table_data: &[Arc<Row>],
    columns: &[Column],
) -> Value {
    let cell_data = get_cell_data(column, row, row_number, table_data, columns);
    get_sort_value_from_cell_data(&cell_data, column, row)
}

/// Decides what a cell displays. `None` means the cell is left empty.
pub fn render_cell(
    cell_data: &Value,
    column: &Column,
    row: &Row,
    row_number: RowNumber,
    table_data: &[Arc<Row>],
    columns: &[Column],
) -> Option<Value> {
    // bottom rows hold content that is already rendered
    if row_number.is_bottom() {
        return Some(cell_data.clone());
    }

    if cell_data.is_null() && !column.render_on_null {
        return None;
    }

    match &column.renderer {
        Some(renderer) => Some(renderer(
            cell_data,
            &RenderContext {
                column,
                row,
                row_number,
                table_data,
                columns,
            },
        )),
        None => Some(cell_data.clone()),
    }
}
