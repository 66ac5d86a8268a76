//! Type-aware stable sorting of table rows.

use std::cmp::Ordering;
use std::sync::{Arc, LazyLock};
use std::time::Instant;

use icu_collator::options::{CollatorOptions, Strength};
use icu_collator::{Collator, CollatorBorrowed};
use tracing::{instrument, trace, warn};

use crate::column::{Column, column_by_id};
use crate::domain::{DataType, SortDirection};
use crate::resolve::{RowNumber, get_sort_value};
use crate::value::{Row, Value};

/// A row's position in the input and the value it is ordered by.
#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub index: usize,
    pub sort_value: Value,
}

/// Result of comparing two sort values before the direction is applied.
/// Placement of missing values is fixed per data type and never flipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyOrder {
    Missing(Ordering),
    Present(Ordering),
}

// Root locale collation at secondary strength: accents count, case does not.
static COLLATOR: LazyLock<Option<CollatorBorrowed<'static>>> = LazyLock::new(|| {
    let mut options = CollatorOptions::default();
    options.strength = Some(Strength::Secondary);
    Collator::try_new(Default::default(), options)
        .inspect_err(|e| warn!("No collator available, comparing code points: {e}"))
        .ok()
});

fn compare_text(a: &str, b: &str) -> Ordering {
    let (a, b) = (a.to_lowercase(), b.to_lowercase());
    match COLLATOR.as_ref() {
        Some(collator) => collator.compare(&a, &b),
        None => a.cmp(&b),
    }
}

fn compare_sort_values(data_type: DataType, a: &Value, b: &Value) -> KeyOrder {
    match data_type {
        DataType::Number | DataType::NumberOrdinal => {
            // values without a readable number are treated like nulls
            match (a.parse_float(), b.parse_float()) {
                (None, None) => KeyOrder::Missing(Ordering::Equal),
                (None, Some(_)) => KeyOrder::Missing(Ordering::Greater),
                (Some(_), None) => KeyOrder::Missing(Ordering::Less),
                (Some(a), Some(b)) => {
                    KeyOrder::Present(a.partial_cmp(&b).unwrap_or(Ordering::Equal))
                }
            }
        }
        DataType::String => match (a.is_null(), b.is_null()) {
            (true, true) => KeyOrder::Missing(Ordering::Equal),
            (true, false) => KeyOrder::Missing(Ordering::Less),
            (false, true) => KeyOrder::Missing(Ordering::Greater),
            (false, false) => KeyOrder::Present(compare_text(&a.to_key(), &b.to_key())),
        },
        _ => match (a.is_missing(), b.is_missing()) {
            (true, true) => KeyOrder::Missing(Ordering::Equal),
            (true, false) => KeyOrder::Missing(Ordering::Less),
            (false, true) => KeyOrder::Missing(Ordering::Greater),
            (false, false) => KeyOrder::Present(default_order(a, b)),
        },
    }
}

fn kind_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::Text(_) => 3,
        Value::Map(_) => 4,
    }
}

// Equal values tie, otherwise `<` decides. Values of different kinds have no
// `<` relation, so they are grouped by kind to keep the order total.
fn default_order(a: &Value, b: &Value) -> Ordering {
    if a == b {
        return Ordering::Equal;
    }
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.total_cmp(y),
        (Value::Text(x), Value::Text(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Map(_), Value::Map(_)) => Ordering::Equal,
        _ => kind_rank(a).cmp(&kind_rank(b)),
    }
}

/// Builds the comparator for a data type and direction. Ties, including two
/// missing values, are broken by the original index so the order is stable.
pub fn sort_comparator(
    data_type: DataType,
    direction: SortDirection,
) -> impl Fn(&SortKey, &SortKey) -> Ordering {
    move |a, b| {
        let order = match compare_sort_values(data_type, &a.sort_value, &b.sort_value) {
            KeyOrder::Missing(order) => order,
            KeyOrder::Present(order) if direction.is_ascending() => order,
            KeyOrder::Present(order) => order.reverse(),
        };
        order.then(a.index.cmp(&b.index))
    }
}

// True when every neighbour pair is strictly ordered the given way. Such a
// sequence has no ties and no missing values, so reversing it is the same as
// sorting it the other way.
fn is_strictly_ordered(keys: &[SortKey], data_type: DataType, direction: SortDirection) -> bool {
    let expected = if direction.is_ascending() {
        Ordering::Less
    } else {
        Ordering::Greater
    };
    keys.windows(2).all(|pair| {
        compare_sort_values(data_type, &pair[0].sort_value, &pair[1].sort_value)
            == KeyOrder::Present(expected)
    })
}

/// Sorts rows by a column. The input is never modified; an unknown column id
/// returns the rows in their current order.
#[instrument(level = "debug", skip(rows, columns), fields(rows = rows.len()))]
pub fn sort_data(
    rows: &[Arc<Row>],
    column_id: &str,
    direction: SortDirection,
    columns: &[Column],
) -> Vec<Arc<Row>> {
    let Some(column) = column_by_id(columns, column_id) else {
        if cfg!(debug_assertions) {
            warn!("No column found by ID {column_id}");
        }
        return rows.to_vec();
    };

    let start_time = Instant::now();
    let data_type = column.sort_data_type();
    let mut keys: Vec<SortKey> = rows
        .iter()
        .enumerate()
        .map(|(index, row)| SortKey {
            index,
            sort_value: get_sort_value(column, row, RowNumber::Data(index), rows, columns),
        })
        .collect();

    if keys.len() > 1 && is_strictly_ordered(&keys, data_type, direction.invert()) {
        trace!("Rows already sorted in the opposite direction, reversing");
        keys.reverse();
    } else {
        keys.sort_by(sort_comparator(data_type, direction));
    }

    trace!(
        "Sorted {} rows by {column_id} in {}us",
        keys.len(),
        start_time.elapsed().as_micros()
    );
    keys.into_iter()
        .map(|key| Arc::clone(&rows[key.index]))
        .collect()
}
