//! Class name functions for `Column::td_class_name_fn` that mark the cells
//! holding a column's extremes. They need a summary with `min` and `max`.

use crate::resolve::CellContext;

fn matches_summary(cell: &CellContext<'_>, key: &str) -> bool {
    cell.column_summary.is_some_and(|summary| summary.contains(key))
        && cell.sort_value() == *cell.summary_field(key)
}

/// `highlight-min-max` plus `highlight-min` or `highlight-max`.
pub fn min_max_class_name(cell: &CellContext<'_>) -> Option<String> {
    if matches_summary(cell, "min") {
        Some("highlight-min-max highlight-min".to_string())
    } else if matches_summary(cell, "max") {
        Some("highlight-min-max highlight-max".to_string())
    } else {
        None
    }
}

pub fn min_class_name(cell: &CellContext<'_>) -> Option<String> {
    matches_summary(cell, "min").then(|| "highlight-min".to_string())
}

pub fn max_class_name(cell: &CellContext<'_>) -> Option<String> {
    matches_summary(cell, "max").then(|| "highlight-max".to_string())
}
