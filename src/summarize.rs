//! Column summarizers. Each folds over every row of the table for one column
//! and produces a [`Summary`]; none depend on sort order or highlight state.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use crate::column::{Column, Summarizer, column_by_id};
use crate::resolve::{RowNumber, get_cell_data, get_sort_value};
use crate::value::{Row, Value};

static NULL: Value = Value::Null;

/// Named fields derived from a column's worth of data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary(BTreeMap<String, Value>);

impl Summary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Field by name, `Null` when the summary does not have it.
    pub fn get(&self, key: &str) -> &Value {
        self.0.get(key).unwrap_or(&NULL)
    }

    pub fn number(&self, key: &str) -> Option<f64> {
        self.get(key).to_number()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Shallow merge, fields of `other` replace fields with the same name.
    pub fn merge(&mut self, other: Summary) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for Summary {
    fn from(fields: [(K, V); N]) -> Self {
        Summary(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

fn sort_values<'a>(
    column: &'a Column,
    data: &'a [Arc<Row>],
    columns: &'a [Column],
) -> impl Iterator<Item = Value> + 'a {
    data.iter()
        .enumerate()
        .map(move |(i, row)| get_sort_value(column, row, RowNumber::Data(i), data, columns))
}

/// Smallest and largest sort values as `min` and `max`. A missing value only
/// fills an extremum that is still missing.
pub fn min_max_summarizer(column: &Column, data: &[Arc<Row>], columns: &[Column]) -> Summary {
    let mut min: Option<Value> = None;
    let mut max: Option<Value> = None;

    for value in sort_values(column, data, columns) {
        if min
            .as_ref()
            .is_none_or(|current| current.is_missing() || value < *current)
        {
            min = Some(value.clone());
        }
        if max
            .as_ref()
            .is_none_or(|current| current.is_missing() || value > *current)
        {
            max = Some(value);
        }
    }

    let mut summary = Summary::new();
    if let Some(min) = min {
        summary.insert("min", min);
    }
    if let Some(max) = max {
        summary.insert("max", max);
    }
    summary
}

/// `sum`, `count` and `mean` of the sort values. Only truthy numbers add to
/// the sum, so zeros are skipped, while `count` is the number of rows.
pub fn mean_summarizer(column: &Column, data: &[Arc<Row>], columns: &[Column]) -> Summary {
    let sum = sort_values(column, data, columns)
        .filter(Value::is_truthy)
        .filter_map(|value| value.to_number())
        .fold(None, |sum: Option<f64>, n| Some(sum.unwrap_or(0.0) + n));
    let count = data.len();
    let mean = sum.map(|sum| sum / count as f64);

    Summary::from([
        ("sum", Value::from(sum)),
        ("count", Value::from(count)),
        ("mean", Value::from(mean)),
    ])
}

/// Average of the column weighted by the sort values of another column.
/// Rows contribute only when both the value and its weight are present.
pub fn weighted_average_summarizer(weight_column_id: impl Into<String>) -> Summarizer {
    let weight_column_id = weight_column_id.into();
    Arc::new(move |column: &Column, data: &[Arc<Row>], columns: &[Column]| {
        let weight_column = column_by_id(columns, &weight_column_id);
        if weight_column.is_none() {
            debug!("Weight column {weight_column_id} not found for {}", column.id);
        }

        let mut numerator = 0.0;
        let mut denominator = 0.0;
        for (i, row) in data.iter().enumerate() {
            let Some(weight_column) = weight_column else {
                break;
            };
            let value = get_sort_value(column, row, RowNumber::Data(i), data, columns);
            let weight = get_sort_value(weight_column, row, RowNumber::Data(i), data, columns);
            if let (Some(value), Some(weight)) = (value.to_number(), weight.to_number()) {
                numerator += weight * value;
                denominator += weight;
            }
        }

        let weighted_average = (denominator != 0.0).then(|| numerator / denominator);
        Summary::from([
            ("weightedAverage", Value::from(weighted_average)),
            ("numerator", Value::from(numerator)),
            ("denominator", Value::from(denominator)),
        ])
    })
}

/// Occurrences of each distinct cell value under `counts`, keyed by the
/// value's string form, and the value seen most often as `mostFrequent`.
pub fn frequency_summarizer(column: &Column, data: &[Arc<Row>], columns: &[Column]) -> Summary {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut most_frequent = Value::Null;
    let mut max_count = 0;

    for (i, row) in data.iter().enumerate() {
        let cell_data = get_cell_data(column, row, RowNumber::Data(i), data, columns);
        let count = counts.entry(cell_data.to_key()).or_default();
        *count += 1;
        if *count > max_count {
            max_count = *count;
            most_frequent = cell_data;
        }
    }

    let counts = counts
        .into_iter()
        .map(|(key, count)| (key, Value::from(count)))
        .collect::<BTreeMap<_, _>>();
    Summary::from([
        ("counts", Value::Map(counts)),
        ("mostFrequent", most_frequent),
    ])
}

/// Runs each summarizer in turn and merges their fields, later ones winning.
pub fn composite_summarizer(summarizers: Vec<Summarizer>) -> Summarizer {
    Arc::new(move |column: &Column, data: &[Arc<Row>], columns: &[Column]| {
        summarizers
            .iter()
            .fold(Summary::new(), |mut summary, summarizer| {
                summary.merge(summarizer(column, data, columns));
                summary
            })
    })
}
