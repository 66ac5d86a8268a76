use std::sync::Arc;

use crate::column::Column;
use crate::plugin::{HighlightMode, Plugin};
use crate::resolve::CellContext;
use crate::style::Style;
use crate::summarize::Summary;
use crate::value::Row;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightOptions {
    pub on_row_highlight: bool,
    pub on_column_highlight: bool,
}

impl Default for HighlightOptions {
    fn default() -> Self {
        Self {
            on_row_highlight: true,
            on_column_highlight: true,
        }
    }
}

/// Wraps a plugin so its class names and styles only show on highlighted
/// cells. A column can still ask for them everywhere by setting the plugin's
/// `highlight` option to [`HighlightMode::Always`].
pub struct HighlightOnly<P> {
    plugin: P,
    options: HighlightOptions,
}

impl<P: Plugin> HighlightOnly<P> {
    pub fn new(plugin: P, options: HighlightOptions) -> Self {
        Self { plugin, options }
    }

    fn is_active(&self, cell: &CellContext<'_>) -> bool {
        let always = cell
            .column
            .plugin_settings(self.plugin.id())
            .is_some_and(|config| config.highlight == HighlightMode::Always);

        (self.options.on_row_highlight && cell.highlighted_row)
            || (self.options.on_column_highlight && cell.highlighted_column)
            || always
    }
}

impl<P: Plugin> Plugin for HighlightOnly<P> {
    fn id(&self) -> &str {
        self.plugin.id()
    }

    fn column_test(&self, column: &Column) -> bool {
        self.plugin.column_test(column)
    }

    fn summarize(&self, column: &Column, data: &[Arc<Row>], columns: &[Column]) -> Option<Summary> {
        self.plugin.summarize(column, data, columns)
    }

    fn td_class_name(&self, cell: &CellContext<'_>) -> Option<String> {
        if !self.is_active(cell) {
            return None;
        }
        self.plugin.td_class_name(cell)
    }

    fn td_style(&self, cell: &CellContext<'_>) -> Option<Style> {
        if !self.is_active(cell) {
            return None;
        }
        self.plugin.td_style(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DataType;
    use crate::plugin::{HEATMAP_ID, Heatmap, PluginConfig};
    use crate::resolve::RowNumber;
    use crate::value::Value;

    fn check<T>(
        plugin: &impl Plugin,
        column: &Column,
        highlighted_row: bool,
        highlighted_column: bool,
        f: impl FnOnce(&dyn Plugin, &CellContext<'_>) -> T,
    ) -> T {
        let row = Row::from([("n", 5)]);
        let data = vec![Arc::new(row.clone())];
        let summary = Summary::from([("min", 0), ("max", 10)]);
        let cell_data = Value::from(5);
        let cell = CellContext {
            cell_data: &cell_data,
            column_summary: Some(&summary),
            column,
            row: &row,
            highlighted_column,
            highlighted_row,
            row_number: RowNumber::Data(0),
            table_data: &data,
            columns: std::slice::from_ref(column),
        };
        f(plugin, &cell)
    }

    #[test]
    fn style_only_on_highlighted_cells() {
        let plugin = HighlightOnly::new(Heatmap, HighlightOptions::default());
        let column = Column::new("n").data_type(DataType::Number);
        assert_eq!(check(&plugin, &column, false, false, |p, c| p.td_style(c)), None);
        assert!(check(&plugin, &column, true, false, |p, c| p.td_style(c)).is_some());
        assert!(check(&plugin, &column, false, true, |p, c| p.td_style(c)).is_some());
        assert_eq!(
            check(&plugin, &column, true, false, |p, c| p.td_class_name(c)).as_deref(),
            Some("has-heatmap")
        );
        assert_eq!(plugin.id(), HEATMAP_ID);
    }

    #[test]
    fn options_pick_which_highlight_counts() {
        let plugin = HighlightOnly::new(
            Heatmap,
            HighlightOptions {
                on_row_highlight: false,
                on_column_highlight: true,
            },
        );
        let column = Column::new("n").data_type(DataType::Number);
        assert_eq!(check(&plugin, &column, true, false, |p, c| p.td_style(c)), None);
        assert!(check(&plugin, &column, false, true, |p, c| p.td_style(c)).is_some());
    }

    #[test]
    fn always_mode_overrides_the_gate() {
        let plugin = HighlightOnly::new(Heatmap, HighlightOptions::default());
        let column = Column::new("n").data_type(DataType::Number).plugin_config(
            HEATMAP_ID,
            PluginConfig::default().highlight(HighlightMode::Always),
        );
        let style = check(&plugin, &column, false, false, |p, c| p.td_style(c));
        let direct = check(&Heatmap, &column, false, false, |p, c| p.td_style(c));
        assert_eq!(style, direct);
        assert!(style.is_some());
    }
}
