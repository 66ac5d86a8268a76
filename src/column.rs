use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use derive_setters::Setters;
use tracing::warn;

use crate::domain::{DataType, SortDirection};
use crate::format::Formatter;
use crate::plugin::{PluginConfig, PluginOption};
use crate::resolve::{BottomContext, CellContext, RenderContext, ValueContext};
use crate::style::Style;
use crate::summarize::Summary;
use crate::value::{Row, Value};

pub type ValueFn = Arc<dyn Fn(&Row, &ValueContext<'_>) -> Value + Send + Sync>;
pub type SortValueFn = Arc<dyn Fn(&Value, &Row) -> Value + Send + Sync>;
pub type Summarizer = Arc<dyn Fn(&Column, &[Arc<Row>], &[Column]) -> Summary + Send + Sync>;
pub type Renderer = Arc<dyn Fn(&Value, &RenderContext<'_>) -> Value + Send + Sync>;
pub type CellFn<T> = Arc<dyn Fn(&CellContext<'_>) -> Option<T> + Send + Sync>;
pub type BottomFn = Arc<dyn Fn(&BottomContext<'_>) -> Value + Send + Sync>;

/// Where a column reads its cell data from.
#[derive(Clone)]
pub enum ValueSource {
    /// A key into the row record.
    Key(String),
    /// Derived from the whole row.
    Compute(ValueFn),
}

/// A presentation attribute that is either fixed or computed per cell.
#[derive(Clone)]
pub enum Computed<T> {
    Static(T),
    Dynamic(CellFn<T>),
}

impl<T: Clone> Computed<T> {
    pub fn evaluate(&self, cell: &CellContext<'_>) -> Option<T> {
        match self {
            Computed::Static(value) => Some(value.clone()),
            Computed::Dynamic(f) => f(cell),
        }
    }
}

/// Content of one cell of a bottom row.
#[derive(Clone)]
pub enum BottomCell {
    Static(Value),
    Compute(BottomFn),
}

/// Bottom row content for a column: one cell, or one cell per bottom row.
#[derive(Clone)]
pub enum BottomData {
    Single(BottomCell),
    Rows(Vec<BottomCell>),
}

impl BottomData {
    pub fn len(&self) -> usize {
        match self {
            BottomData::Single(_) => 1,
            BottomData::Rows(cells) => cells.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cell(&self, index: usize) -> Option<&BottomCell> {
        match self {
            BottomData::Single(cell) => (index == 0).then_some(cell),
            BottomData::Rows(cells) => cells.get(index),
        }
    }
}

impl From<Value> for BottomData {
    fn from(value: Value) -> Self {
        BottomData::Single(BottomCell::Static(value))
    }
}

/// Definition of one table column.
#[derive(Clone, Setters)]
#[setters(strip_option)]
pub struct Column {
    #[setters(skip)]
    pub id: String,
    pub data_type: DataType,
    /// Overrides `data_type` when picking a comparator.
    pub sort_type: Option<DataType>,
    #[setters(skip)]
    pub value: Option<ValueSource>,
    #[setters(skip)]
    pub sort_value: Option<SortValueFn>,
    /// A column can opt out of sorting even in a sortable table.
    pub sortable: bool,
    pub summarize: Option<Summarizer>,
    #[setters(skip)]
    pub renderer: Option<Renderer>,
    pub render_on_null: bool,
    #[setters(skip)]
    pub td_class_name: Option<Computed<String>>,
    #[setters(skip)]
    pub td_style: Option<Computed<Style>>,
    pub first_sort_direction: Option<SortDirection>,
    #[setters(skip)]
    pub plugins: BTreeMap<String, PluginOption>,
    #[setters(into)]
    pub header: Option<String>,
    #[setters(into)]
    pub class_name: Option<String>,
    #[setters(into)]
    pub th_class_name: Option<String>,
    pub width: Option<u16>,
    pub bottom_data: Option<BottomData>,
}

impl Column {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            data_type: DataType::None,
            sort_type: None,
            value: None,
            sort_value: None,
            sortable: true,
            summarize: None,
            renderer: None,
            render_on_null: false,
            td_class_name: None,
            td_style: None,
            first_sort_direction: None,
            plugins: BTreeMap::new(),
            header: None,
            class_name: None,
            th_class_name: None,
            width: None,
            bottom_data: None,
        }
    }

    pub fn value_key(mut self, key: impl Into<String>) -> Self {
        self.value = Some(ValueSource::Key(key.into()));
        self
    }

    pub fn value_fn(
        mut self,
        f: impl Fn(&Row, &ValueContext<'_>) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.value = Some(ValueSource::Compute(Arc::new(f)));
        self
    }

    pub fn sort_value_fn(mut self, f: impl Fn(&Value, &Row) -> Value + Send + Sync + 'static) -> Self {
        self.sort_value = Some(Arc::new(f));
        self
    }

    pub fn renderer_fn(
        mut self,
        f: impl Fn(&Value, &RenderContext<'_>) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.renderer = Some(Arc::new(f));
        self
    }

    /// Renders the cell through a formatter that only looks at the cell data.
    pub fn formatter(mut self, formatter: Formatter) -> Self {
        self.renderer = Some(Arc::new(move |cell_data: &Value, _: &RenderContext<'_>| {
            formatter(cell_data)
        }));
        self
    }

    pub fn td_class_name(mut self, class_name: impl Into<String>) -> Self {
        self.td_class_name = Some(Computed::Static(class_name.into()));
        self
    }

    pub fn td_class_name_fn(
        mut self,
        f: impl Fn(&CellContext<'_>) -> Option<String> + Send + Sync + 'static,
    ) -> Self {
        self.td_class_name = Some(Computed::Dynamic(Arc::new(f)));
        self
    }

    pub fn td_style(mut self, style: Style) -> Self {
        self.td_style = Some(Computed::Static(style));
        self
    }

    pub fn td_style_fn(
        mut self,
        f: impl Fn(&CellContext<'_>) -> Option<Style> + Send + Sync + 'static,
    ) -> Self {
        self.td_style = Some(Computed::Dynamic(Arc::new(f)));
        self
    }

    pub fn plugin(mut self, plugin_id: impl Into<String>, option: PluginOption) -> Self {
        self.plugins.insert(plugin_id.into(), option);
        self
    }

    pub fn plugin_config(self, plugin_id: impl Into<String>, config: PluginConfig) -> Self {
        self.plugin(plugin_id, PluginOption::Enabled(config))
    }

    pub fn bottom_fn(
        mut self,
        f: impl Fn(&BottomContext<'_>) -> Value + Send + Sync + 'static,
    ) -> Self {
        self.bottom_data = Some(BottomData::Single(BottomCell::Compute(Arc::new(f))));
        self
    }

    /// Per-column options for the plugin with this id, if any were given.
    pub fn plugin_option(&self, plugin_id: &str) -> Option<&PluginOption> {
        self.plugins.get(plugin_id)
    }

    /// The enabled config for a plugin, `None` when absent or disabled.
    pub fn plugin_settings(&self, plugin_id: &str) -> Option<&PluginConfig> {
        match self.plugins.get(plugin_id) {
            Some(PluginOption::Enabled(config)) => Some(config),
            _ => None,
        }
    }

    pub fn sort_data_type(&self) -> DataType {
        self.sort_type.unwrap_or(self.data_type)
    }

    pub fn header_text(&self) -> &str {
        self.header.as_deref().unwrap_or(&self.id)
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match &self.value {
            Some(ValueSource::Key(key)) => format!("key({key})"),
            Some(ValueSource::Compute(_)) => "fn".to_string(),
            None => "id".to_string(),
        };
        f.debug_struct("Column")
            .field("id", &self.id)
            .field("data_type", &self.data_type)
            .field("sort_type", &self.sort_type)
            .field("value", &value)
            .field("sortable", &self.sortable)
            .field("summarize", &self.summarize.is_some())
            .field("first_sort_direction", &self.first_sort_direction)
            .field("plugins", &self.plugins.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

pub fn column_by_id<'a>(columns: &'a [Column], column_id: &str) -> Option<&'a Column> {
    columns.iter().find(|column| column.id == column_id)
}

pub fn column_index(columns: &[Column], column_id: &str) -> Option<usize> {
    columns.iter().position(|column| column.id == column_id)
}

/// Checks column definitions for ids used more than once. Each offending id is
/// logged as a warning and returned with the indices that use it.
pub fn validate_columns(columns: &[Column]) -> Vec<(String, Vec<usize>)> {
    let mut ids: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (i, column) in columns.iter().enumerate() {
        ids.entry(column.id.as_str()).or_default().push(i);
    }

    ids.into_iter()
        .filter(|(_, indices)| indices.len() > 1)
        .map(|(id, indices)| {
            warn!(
                "Column ID '{id}' used in multiple columns {:?}: {:?}",
                indices,
                indices.iter().map(|&i| &columns[i]).collect::<Vec<_>>()
            );
            (id.to_string(), indices)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_columns_reports_duplicate_ids() {
        let columns = vec![
            Column::new("name"),
            Column::new("score"),
            Column::new("name"),
            Column::new("rank"),
            Column::new("score"),
        ];
        let duplicates = validate_columns(&columns);
        assert_eq!(
            duplicates,
            vec![
                ("name".to_string(), vec![0, 2]),
                ("score".to_string(), vec![1, 4])
            ]
        );
        assert!(validate_columns(&columns[..2]).is_empty());
    }

    #[test]
    fn column_lookup_uses_first_definition() {
        let columns = vec![
            Column::new("a").data_type(DataType::Number),
            Column::new("a").data_type(DataType::String),
        ];
        assert_eq!(
            column_by_id(&columns, "a").map(|c| c.data_type),
            Some(DataType::Number)
        );
        assert!(column_by_id(&columns, "b").is_none());
    }

    #[test]
    fn sort_type_overrides_data_type() {
        let column = Column::new("year")
            .data_type(DataType::String)
            .sort_type(DataType::NumberOrdinal);
        assert_eq!(column.sort_data_type(), DataType::NumberOrdinal);
        assert_eq!(Column::new("x").header("X").header_text(), "X");
        assert_eq!(Column::new("x").header_text(), "x");
    }

    #[test]
    fn bottom_data_single_only_fills_first_row() {
        let bottom = BottomData::from(Value::from("Summary"));
        assert!(bottom.cell(0).is_some());
        assert!(bottom.cell(1).is_none());
        assert_eq!(bottom.len(), 1);
    }
}
