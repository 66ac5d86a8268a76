//! Plugins bundle summaries, class names and styles that apply across
//! columns. Each plugin decides which columns it runs on through
//! [`Plugin::column_test`] and reads per-column options from
//! `column.plugins[plugin.id()]`.

mod heatmap;
mod highlight_only;

pub use heatmap::{HEATMAP_CLASS_NAME, HEATMAP_ID, Heatmap};
pub use highlight_only::{HighlightOnly, HighlightOptions};

use std::collections::BTreeMap;
use std::sync::Arc;

use derive_setters::Setters;
use tracing::trace;

use crate::color::{ColorScale, ColorScheme};
use crate::column::Column;
use crate::resolve::CellContext;
use crate::style::{Style, class_names};
use crate::summarize::Summary;
use crate::value::{Row, Value};

pub trait Plugin: Send + Sync {
    fn id(&self) -> &str;

    /// Whether the plugin runs on this column at all.
    fn column_test(&self, _column: &Column) -> bool {
        true
    }

    fn summarize(&self, _column: &Column, _data: &[Arc<Row>], _columns: &[Column]) -> Option<Summary> {
        None
    }

    fn td_class_name(&self, _cell: &CellContext<'_>) -> Option<String> {
        None
    }

    fn td_style(&self, _cell: &CellContext<'_>) -> Option<Style> {
        None
    }
}

/// When a highlight-gated plugin runs on a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HighlightMode {
    /// Only on highlighted rows or columns.
    #[default]
    OnHighlight,
    Always,
}

/// Per-column options for a plugin.
#[derive(Debug, Clone, Default, Setters)]
#[setters(strip_option)]
pub struct PluginConfig {
    pub highlight: HighlightMode,
    /// Value range mapped onto the color scale, defaults to the summary's min and max.
    pub domain: Option<(f64, f64)>,
    pub color_scheme: Option<ColorScheme>,
    /// Offset in [0, 1) used to derive the text color from the background scale.
    pub color_shift: Option<f64>,
    pub reverse_colors: bool,
    pub background_scale: Option<ColorScale>,
    pub color_scale: Option<ColorScale>,
    /// Options of third party plugins.
    #[setters(skip)]
    pub extra: BTreeMap<String, Value>,
}

impl PluginConfig {
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// What a column says about a plugin.
#[derive(Debug, Clone)]
pub enum PluginOption {
    /// Explicitly switched off for this column.
    Disabled,
    Enabled(PluginConfig),
}

/// Cell attributes that plugins and columns can both compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellProperty {
    TdClassName,
    TdStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    ClassName(String),
    Style(Style),
}

impl PropertyValue {
    fn is_truthy(&self) -> bool {
        match self {
            PropertyValue::ClassName(name) => !name.is_empty(),
            PropertyValue::Style(_) => true,
        }
    }
}

/// One contributor's result, or all of them in order when there were several.
#[derive(Debug, Clone, PartialEq)]
pub enum Composed<T> {
    Single(T),
    Many(Vec<T>),
}

impl<T> Composed<T> {
    fn from_vec(mut values: Vec<T>) -> Option<Self> {
        match values.len() {
            0 => None,
            1 => values.pop().map(Composed::Single),
            _ => Some(Composed::Many(values)),
        }
    }

    pub fn into_vec(self) -> Vec<T> {
        match self {
            Composed::Single(value) => vec![value],
            Composed::Many(values) => values,
        }
    }
}

fn plugin_property(
    plugin: &dyn Plugin,
    property: CellProperty,
    cell: &CellContext<'_>,
) -> Option<PropertyValue> {
    match property {
        CellProperty::TdClassName => plugin.td_class_name(cell).map(PropertyValue::ClassName),
        CellProperty::TdStyle => plugin.td_style(cell).map(PropertyValue::Style),
    }
}

fn column_property(property: CellProperty, cell: &CellContext<'_>) -> Option<PropertyValue> {
    match property {
        CellProperty::TdClassName => cell
            .column
            .td_class_name
            .as_ref()
            .and_then(|computed| computed.evaluate(cell))
            .map(PropertyValue::ClassName),
        CellProperty::TdStyle => cell
            .column
            .td_style
            .as_ref()
            .and_then(|computed| computed.evaluate(cell))
            .map(PropertyValue::Style),
    }
}

/// Collects a property from every plugin that runs on the cell's column, then
/// from the column itself. Empty results are dropped.
pub fn compute_with_plugins(
    property: CellProperty,
    cell: &CellContext<'_>,
    plugins: &[Arc<dyn Plugin>],
) -> Option<Composed<PropertyValue>> {
    let mut values: Vec<PropertyValue> = plugins
        .iter()
        .filter(|plugin| plugin.column_test(cell.column))
        .filter_map(|plugin| plugin_property(plugin.as_ref(), property, cell))
        .filter(PropertyValue::is_truthy)
        .collect();

    if let Some(own) = column_property(property, cell).filter(PropertyValue::is_truthy) {
        values.push(own);
    }

    Composed::from_vec(values)
}

/// The cell style, with the column's own properties overriding plugins'.
pub fn compute_td_style(cell: &CellContext<'_>, plugins: &[Arc<dyn Plugin>]) -> Option<Style> {
    let composed = compute_with_plugins(CellProperty::TdStyle, cell, plugins)?;
    let style = composed
        .into_vec()
        .into_iter()
        .fold(Style::new(), |mut style, value| {
            if let PropertyValue::Style(other) = value {
                style.merge(&other);
            }
            style
        });
    Some(style)
}

pub fn compute_td_class_name(cell: &CellContext<'_>, plugins: &[Arc<dyn Plugin>]) -> Option<String> {
    let composed = compute_with_plugins(CellProperty::TdClassName, cell, plugins)?;
    let names = composed.into_vec();
    class_names(names.iter().map(|value| match value {
        PropertyValue::ClassName(name) => Some(name.as_str()),
        PropertyValue::Style(_) => None,
    }))
}

/// Summarizes every column, index-aligned with `columns`. Summaries of the
/// plugins running on a column are merged first and the column's own last.
pub fn summarize_columns(
    columns: &[Column],
    data: &[Arc<Row>],
    plugins: &[Arc<dyn Plugin>],
) -> Vec<Option<Summary>> {
    columns
        .iter()
        .map(|column| {
            let mut summaries: Vec<Summary> = plugins
                .iter()
                .filter(|plugin| plugin.column_test(column))
                .filter_map(|plugin| plugin.summarize(column, data, columns))
                .collect();
            if let Some(summarize) = &column.summarize {
                summaries.push(summarize(column, data, columns));
            }
            trace!("Column {} has {} summaries", column.id, summaries.len());

            summaries.into_iter().reduce(|mut merged, summary| {
                merged.merge(summary);
                merged
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::RowNumber;

    struct Fixed {
        id: &'static str,
        class_name: &'static str,
        style: Style,
        only: Option<&'static str>,
    }

    impl Plugin for Fixed {
        fn id(&self) -> &str {
            self.id
        }

        fn column_test(&self, column: &Column) -> bool {
            self.only.is_none_or(|id| id == column.id)
        }

        fn summarize(&self, _: &Column, data: &[Arc<Row>], _: &[Column]) -> Option<Summary> {
            Some(Summary::from([("rows", data.len()), ("source", 1)]))
        }

        fn td_class_name(&self, _: &CellContext<'_>) -> Option<String> {
            Some(self.class_name.to_string())
        }

        fn td_style(&self, _: &CellContext<'_>) -> Option<Style> {
            Some(self.style.clone())
        }
    }

    fn fixed(id: &'static str, class_name: &'static str, style: Style) -> Arc<dyn Plugin> {
        Arc::new(Fixed {
            id,
            class_name,
            style,
            only: None,
        })
    }

    fn with_cell<T>(column: &Column, f: impl FnOnce(&CellContext<'_>) -> T) -> T {
        let row = Row::from([("v", 1)]);
        let data = vec![Arc::new(row.clone())];
        let cell_data = row.get("v").clone();
        let cell = CellContext {
            cell_data: &cell_data,
            column_summary: None,
            column,
            row: &row,
            highlighted_column: false,
            highlighted_row: false,
            row_number: RowNumber::Data(0),
            table_data: &data,
            columns: std::slice::from_ref(column),
        };
        f(&cell)
    }

    #[test]
    fn column_style_overrides_plugin_style() {
        let plugins = vec![fixed(
            "bg",
            "",
            Style::from([("backgroundColor", "blue"), ("color", "white")]),
        )];
        let column = Column::new("v").td_style(Style::from([("color", "red")]));
        let style = with_cell(&column, |cell| compute_td_style(cell, &plugins));
        assert_eq!(
            style,
            Some(Style::from([("backgroundColor", "blue"), ("color", "red")]))
        );
    }

    #[test]
    fn single_contributor_is_not_wrapped() {
        let column = Column::new("v").td_class_name("own");
        let composed = with_cell(&column, |cell| {
            compute_with_plugins(CellProperty::TdClassName, cell, &[])
        });
        assert_eq!(
            composed,
            Some(Composed::Single(PropertyValue::ClassName("own".into())))
        );
        let nothing = with_cell(&Column::new("v"), |cell| {
            compute_with_plugins(CellProperty::TdClassName, cell, &[])
        });
        assert_eq!(nothing, None);
    }

    #[test]
    fn plugins_come_before_the_column_and_empty_names_are_dropped() {
        let plugins = vec![
            fixed("a", "from-a", Style::new()),
            fixed("b", "", Style::new()),
            Arc::new(Fixed {
                id: "c",
                class_name: "from-c",
                style: Style::new(),
                only: Some("other"),
            }) as Arc<dyn Plugin>,
        ];
        let column = Column::new("v").td_class_name_fn(|cell| {
            cell.cell_data.is_truthy().then(|| "own".to_string())
        });
        let composed = with_cell(&column, |cell| {
            compute_with_plugins(CellProperty::TdClassName, cell, &plugins)
        });
        assert_eq!(
            composed,
            Some(Composed::Many(vec![
                PropertyValue::ClassName("from-a".into()),
                PropertyValue::ClassName("own".into()),
            ]))
        );
        let joined = with_cell(&column, |cell| compute_td_class_name(cell, &plugins));
        assert_eq!(joined.as_deref(), Some("from-a own"));
    }

    #[test]
    fn summaries_merge_plugins_then_column() {
        let plugins = vec![fixed("a", "", Style::new())];
        let columns = vec![
            Column::new("v").summarize(Arc::new(|_: &Column, _: &[Arc<Row>], _: &[Column]| {
                Summary::from([("source", 2)])
            })),
            Column::new("w"),
        ];
        let data = vec![Arc::new(Row::from([("v", 1)]))];
        let summaries = summarize_columns(&columns, &data, &plugins);
        let first = summaries[0].as_ref().map(|s| s.number("source"));
        assert_eq!(first, Some(Some(2.0)));
        assert_eq!(summaries[1].as_ref().map(|s| s.number("rows")), Some(Some(1.0)));
        assert_eq!(summarize_columns(&columns[1..], &data, &[]), vec![None]);
    }
}
