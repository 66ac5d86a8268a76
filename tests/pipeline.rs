use std::sync::Arc;

use proptest::prelude::*;

use taco_table::column::Column;
use taco_table::domain::{DataType, SortDirection};
use taco_table::plugin::{Heatmap, HighlightOnly, HighlightOptions, Plugin};
use taco_table::sort::sort_data;
use taco_table::style::Style;
use taco_table::table::{Table, TableConfig};
use taco_table::value::{Row, Value};

fn score_columns() -> Vec<Column> {
    vec![
        Column::new("name").data_type(DataType::String),
        Column::new("score").data_type(DataType::Number),
    ]
}

fn score_rows() -> Vec<Arc<Row>> {
    [("B", 2), ("A", 2), ("C", 1)]
        .into_iter()
        .map(|(name, score)| {
            Arc::new(Row::from([
                ("name", Value::from(name)),
                ("score", Value::from(score)),
            ]))
        })
        .collect()
}

fn names(rows: &[Arc<Row>]) -> Vec<String> {
    rows.iter().map(|row| row.get("name").to_key()).collect()
}

#[test]
fn sorting_by_score_then_toggling_reverses() {
    let mut table = Table::new(score_columns(), score_rows(), vec![], TableConfig::default());

    assert!(table.sort("score"));
    assert_eq!(table.sort_direction(), Some(SortDirection::Ascending));
    assert_eq!(names(table.data()), ["C", "B", "A"]);

    assert!(table.sort("score"));
    assert_eq!(table.sort_direction(), Some(SortDirection::Descending));
    assert_eq!(names(table.data()), ["B", "A", "C"]);
}

#[test]
fn heatmap_styles_number_cells_only() {
    let plugins: Vec<Arc<dyn Plugin>> = vec![Arc::new(Heatmap)];
    let table = Table::new(score_columns(), score_rows(), plugins, TableConfig::default());

    let summary = table.summaries()[1].as_ref().expect("score has a summary");
    assert_eq!(summary.get("min"), &Value::from(1));
    assert_eq!(summary.get("max"), &Value::from(2));
    assert!(table.summaries()[0].is_none());

    let view = table.view();
    for row in &view.rows {
        assert!(row.cells[0].style.is_none());
        let style = row.cells[1].style.as_ref().expect("score cells are colored");
        assert!(style.get("backgroundColor").is_some());
        assert!(style.get("color").is_some());
        let class_name = row.cells[1].class_name.as_deref().unwrap_or_default();
        assert!(class_name.split(' ').any(|name| name == "has-heatmap"));
    }
    // lowest and highest scores sit at opposite ends of the scale
    assert_ne!(
        view.rows[0].cells[1].style.as_ref().and_then(|s| s.get("backgroundColor")),
        view.rows[2].cells[1].style.as_ref().and_then(|s| s.get("backgroundColor"))
    );
}

#[test]
fn column_hooks_override_plugin_results() {
    let columns = vec![
        Column::new("name").data_type(DataType::String),
        Column::new("score")
            .data_type(DataType::Number)
            .td_class_name("mine")
            .td_style(Style::from([("backgroundColor", "red"), ("width", "4em")])),
    ];
    let plugins: Vec<Arc<dyn Plugin>> = vec![Arc::new(Heatmap)];
    let table = Table::new(columns, score_rows(), plugins, TableConfig::default());

    let cell = &table.view().rows[0].cells[1];
    let style = cell.style.as_ref().expect("merged style");
    assert_eq!(style.get("backgroundColor"), Some("red"));
    assert_eq!(style.get("width"), Some("4em"));
    assert!(style.get("color").is_some());
    assert!(
        cell.class_name
            .as_deref()
            .is_some_and(|class_name| class_name.contains("has-heatmap mine"))
    );
}

#[test]
fn highlight_only_heatmap_follows_the_highlighted_row() {
    let plugins: Vec<Arc<dyn Plugin>> = vec![Arc::new(HighlightOnly::new(
        Heatmap,
        HighlightOptions {
            on_row_highlight: true,
            on_column_highlight: false,
        },
    ))];
    let mut table = Table::new(score_columns(), score_rows(), plugins, TableConfig::default());
    assert!(table.view().rows.iter().all(|row| row.cells[1].style.is_none()));

    let second = table.data()[1].clone();
    assert!(table.highlight_row(Some(second)));
    let view = table.view();
    assert!(view.rows[1].highlighted);
    assert!(view.rows[1].cells[1].style.is_some());
    assert!(view.rows[0].cells[1].style.is_none());
    assert!(view.rows[2].cells[1].style.is_none());
}

fn number_rows(values: &[Option<i32>]) -> Vec<Arc<Row>> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| Arc::new(Row::from([("i", Value::from(i)), ("v", Value::from(*v))])))
        .collect()
}

fn indices(rows: &[Arc<Row>]) -> Vec<usize> {
    rows.iter()
        .map(|row| row.get("i").as_f64().unwrap_or(-1.0) as usize)
        .collect()
}

fn direction() -> impl Strategy<Value = SortDirection> {
    any::<bool>().prop_map(SortDirection::from)
}

proptest! {
    #[test]
    fn sorting_is_a_stable_permutation(
        values in prop::collection::vec(prop::option::of(0..5i32), 0..40),
        direction in direction(),
    ) {
        let columns = vec![Column::new("v").data_type(DataType::Number)];
        let rows = number_rows(&values);
        let sorted = sort_data(&rows, "v", direction, &columns);

        let mut seen = indices(&sorted);
        seen.sort_unstable();
        prop_assert_eq!(seen, (0..values.len()).collect::<Vec<_>>());

        let order = indices(&sorted);
        for pair in order.windows(2) {
            let (a, b) = (values[pair[0]], values[pair[1]]);
            if a == b {
                prop_assert!(pair[0] < pair[1]);
            }
        }
    }

    #[test]
    fn number_nulls_sort_last_in_both_directions(
        values in prop::collection::vec(prop::option::of(-50..50i32), 0..40),
        direction in direction(),
    ) {
        let columns = vec![Column::new("v").data_type(DataType::Number)];
        let sorted = sort_data(&number_rows(&values), "v", direction, &columns);
        let nulls: Vec<bool> = sorted.iter().map(|row| row.get("v").is_null()).collect();
        let first_null = nulls.iter().position(|&n| n).unwrap_or(nulls.len());
        prop_assert!(nulls[first_null..].iter().all(|&n| n));
    }

    #[test]
    fn string_nulls_sort_first_in_both_directions(
        values in prop::collection::vec(prop::option::of("[a-dA-D]{1,3}"), 0..40),
        direction in direction(),
    ) {
        let columns = vec![Column::new("v").data_type(DataType::String)];
        let rows: Vec<Arc<Row>> = values
            .iter()
            .map(|v| Arc::new(Row::from([("v", Value::from(v.clone()))])))
            .collect();
        let sorted = sort_data(&rows, "v", direction, &columns);
        let nulls: Vec<bool> = sorted.iter().map(|row| row.get("v").is_null()).collect();
        let present = nulls.iter().position(|&n| !n).unwrap_or(nulls.len());
        prop_assert!(nulls[present..].iter().all(|&n| !n));
    }

    #[test]
    fn ascending_after_descending_matches_ascending(
        values in prop::collection::vec(prop::option::of(0..8i32), 0..40),
    ) {
        let columns = vec![Column::new("v").data_type(DataType::Number)];
        let rows = number_rows(&values);
        let direct = sort_data(&rows, "v", SortDirection::Ascending, &columns);
        let descending = sort_data(&rows, "v", SortDirection::Descending, &columns);
        let round_trip = sort_data(&descending, "v", SortDirection::Ascending, &columns);
        prop_assert_eq!(indices(&direct), indices(&round_trip));
    }
}
