use std::sync::Arc;

use crate::column::Column;
use crate::domain::DataType;
use crate::plugin::{Plugin, PluginConfig, PluginOption};
use crate::resolve::CellContext;
use crate::style::Style;
use crate::summarize::{Summary, min_max_summarizer};
use crate::value::Row;

pub const HEATMAP_ID: &str = "heatmap";
pub const HEATMAP_CLASS_NAME: &str = "has-heatmap";

const DEFAULT_COLOR_SHIFT: f64 = 0.5;

/// Colors cells by where their sort value falls between the column's min and max.
#[derive(Debug, Clone, Copy, Default)]
pub struct Heatmap;

/// Linear map of `domain` onto [0, 1], clamped. A collapsed domain maps
/// everything to the middle.
fn domain_scale(domain: (f64, f64), value: f64) -> f64 {
    let (from, to) = domain;
    if from == to {
        return 0.5;
    }
    ((value - from) / (to - from)).clamp(0.0, 1.0)
}

fn domain(config: Option<&PluginConfig>, summary: Option<&Summary>) -> Option<(f64, f64)> {
    let domain = match config.and_then(|config| config.domain) {
        Some(domain) => domain,
        None => {
            let summary = summary?;
            (summary.number("min")?, summary.number("max")?)
        }
    };
    match config {
        Some(config) if config.reverse_colors => Some((domain.1, domain.0)),
        _ => Some(domain),
    }
}

impl Plugin for Heatmap {
    fn id(&self) -> &str {
        HEATMAP_ID
    }

    fn column_test(&self, column: &Column) -> bool {
        match column.plugin_option(HEATMAP_ID) {
            Some(PluginOption::Enabled(_)) => true,
            Some(PluginOption::Disabled) => false,
            None => column.data_type == DataType::Number,
        }
    }

    fn summarize(&self, column: &Column, data: &[Arc<Row>], columns: &[Column]) -> Option<Summary> {
        Some(min_max_summarizer(column, data, columns))
    }

    fn td_class_name(&self, _cell: &CellContext<'_>) -> Option<String> {
        Some(HEATMAP_CLASS_NAME.to_string())
    }

    fn td_style(&self, cell: &CellContext<'_>) -> Option<Style> {
        let config = cell.column.plugin_settings(HEATMAP_ID);
        let value = cell.sort_value().to_number()?;
        let domain = domain(config, cell.column_summary)?;
        let t = domain_scale(domain, value);

        let background_scale = config.and_then(|c| c.background_scale.as_ref());
        let color_scale = config.and_then(|c| c.color_scale.as_ref());
        let color_shift = config.and_then(|c| c.color_shift).filter(|shift| *shift != 0.0);

        let mut style = Style::new();
        match background_scale {
            Some(background_scale) => {
                style.set("backgroundColor", background_scale.at(t).to_string());
                if let Some(color_scale) = color_scale {
                    style.set("color", color_scale.at(t).to_string());
                } else if let Some(shift) = color_shift {
                    style.set("color", background_scale.at((t + shift) % 1.0).to_string());
                }
            }
            None => {
                let scheme = config.and_then(|c| c.color_scheme).unwrap_or_default();
                style.set("backgroundColor", scheme.interpolate(t).to_string());
                let color = match color_scale {
                    Some(color_scale) => color_scale.at(t),
                    None => {
                        let shift = color_shift.unwrap_or(DEFAULT_COLOR_SHIFT);
                        scheme.interpolate((t + shift) % 1.0)
                    }
                };
                style.set("color", color.to_string());
            }
        }
        Some(style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{ColorScale, ColorScheme, Rgb};
    use crate::resolve::RowNumber;
    use crate::value::Value;

    fn style_for(column: &Column, value: f64, summary: Option<&Summary>) -> Option<Style> {
        let row = Row::from([(column.id.as_str(), value)]);
        let data = vec![Arc::new(row.clone())];
        let cell_data = Value::from(value);
        let cell = CellContext {
            cell_data: &cell_data,
            column_summary: summary,
            column,
            row: &row,
            highlighted_column: false,
            highlighted_row: false,
            row_number: RowNumber::Data(0),
            table_data: &data,
            columns: std::slice::from_ref(column),
        };
        Heatmap.td_style(&cell)
    }

    #[test]
    fn runs_on_number_columns_unless_disabled() {
        let number = Column::new("n").data_type(DataType::Number);
        assert!(Heatmap.column_test(&number));
        assert!(!Heatmap.column_test(&number.clone().plugin(HEATMAP_ID, PluginOption::Disabled)));
        let text = Column::new("t").data_type(DataType::String);
        assert!(!Heatmap.column_test(&text));
        assert!(Heatmap.column_test(&text.plugin_config(HEATMAP_ID, PluginConfig::default())));
    }

    #[test]
    fn colors_the_ends_of_the_domain() {
        let column = Column::new("n").data_type(DataType::Number);
        let summary = Summary::from([("min", 0), ("max", 10)]);
        let low = style_for(&column, 0.0, Some(&summary)).unwrap();
        let high = style_for(&column, 10.0, Some(&summary)).unwrap();
        let above = style_for(&column, 50.0, Some(&summary)).unwrap();
        assert_eq!(low.get("backgroundColor"), Some("rgb(247, 251, 255)"));
        assert_eq!(high.get("backgroundColor"), Some("rgb(8, 48, 107)"));
        assert_eq!(above.get("backgroundColor"), high.get("backgroundColor"));
        let mid = ColorScheme::Blues.interpolate(0.5).to_string();
        assert_eq!(low.get("color"), Some(mid.as_str()));
    }

    #[test]
    fn reverse_colors_flips_the_domain() {
        let column = Column::new("n").plugin_config(
            HEATMAP_ID,
            PluginConfig::default()
                .domain((0.0, 10.0))
                .reverse_colors(true)
                .color_scheme(ColorScheme::Greys),
        );
        let style = style_for(&column, 10.0, None).unwrap();
        assert_eq!(style.get("backgroundColor"), Some("rgb(255, 255, 255)"));
    }

    #[test]
    fn background_scale_with_shift() {
        let black_to_white = ColorScale::Stops(vec![Rgb::new(0, 0, 0), Rgb::new(255, 255, 255)]);
        let column = Column::new("n").plugin_config(
            HEATMAP_ID,
            PluginConfig::default()
                .background_scale(black_to_white.clone())
                .color_shift(0.5),
        );
        let summary = Summary::from([("min", 0), ("max", 4)]);
        let style = style_for(&column, 1.0, Some(&summary)).unwrap();
        assert_eq!(style.get("backgroundColor"), Some(black_to_white.at(0.25).to_string().as_str()));
        assert_eq!(style.get("color"), Some(black_to_white.at(0.75).to_string().as_str()));

        let unshifted = Column::new("n").plugin_config(
            HEATMAP_ID,
            PluginConfig::default().background_scale(black_to_white),
        );
        let style = style_for(&unshifted, 1.0, Some(&summary)).unwrap();
        assert_eq!(style.get("color"), None);
    }

    #[test]
    fn no_style_without_a_domain() {
        let column = Column::new("n").data_type(DataType::Number);
        assert_eq!(style_for(&column, 3.0, None), None);
        let equal = Summary::from([("min", 3), ("max", 3)]);
        let style = style_for(&column, 3.0, Some(&equal)).unwrap();
        let mid = ColorScheme::Blues.interpolate(0.5).to_string();
        assert_eq!(style.get("backgroundColor"), Some(mid.as_str()));
    }
}
