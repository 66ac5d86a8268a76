use std::fmt;
use std::io::Error;
use std::str::FromStr;

use polars::error::PolarsError;
use thiserror::Error;
use tracing_error::SpanTrace;

// Errors raised while loading data or driving the viewer. The pipeline itself never fails.
#[derive(Debug, Error)]
pub enum TableError {
    #[error("io error: {0}")]
    IoError(#[from] Error),
    #[error("polars error: {source}\n{span_trace}")]
    PolarsError {
        source: PolarsError,
        span_trace: SpanTrace,
    },
    #[error("file not found")]
    FileNotFound,
    #[error("permission denied")]
    PermissionDenied,
    #[error("not a file: {0}")]
    NotAFile(String),
    #[error("invalid path: {0}")]
    InvalidPath(String),
    #[error("unknown file type: {0}")]
    UnknownFileType(String),
    #[error("the table has no columns")]
    EmptyTable,
}

impl From<PolarsError> for TableError {
    fn from(source: PolarsError) -> Self {
        TableError::PolarsError {
            source,
            span_trace: SpanTrace::capture(),
        }
    }
}

/// Kind of data held by a column. Drives comparator selection and which
/// columns the heatmap plugin picks up by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DataType {
    /// Numeric values.
    Number,
    /// Numeric values that also work as categories (e.g. a year).
    NumberOrdinal,
    String,
    Boolean,
    Date,
    #[default]
    None,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Number => "Number",
            DataType::NumberOrdinal => "NumberOrdinal",
            DataType::String => "String",
            DataType::Boolean => "Boolean",
            DataType::Date => "Date",
            DataType::None => "None",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn is_ascending(self) -> bool {
        self == SortDirection::Ascending
    }

    pub fn invert(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

// true is ascending, false is descending
impl From<bool> for SortDirection {
    fn from(ascending: bool) -> Self {
        if ascending {
            SortDirection::Ascending
        } else {
            SortDirection::Descending
        }
    }
}

impl From<SortDirection> for bool {
    fn from(direction: SortDirection) -> Self {
        direction.is_ascending()
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Ascending),
            "desc" | "descending" => Ok(SortDirection::Descending),
            other => Err(format!("unknown sort direction '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub event_poll_time: u64,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            event_poll_time: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    MovePageUp,
    MovePageDown,
    Sort,
    Resize(usize, usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_direction_converts_from_bool() {
        assert_eq!(SortDirection::from(true), SortDirection::Ascending);
        assert_eq!(SortDirection::from(false), SortDirection::Descending);
        assert!(!bool::from(SortDirection::Descending));
        assert_eq!(SortDirection::Ascending.invert(), SortDirection::Descending);
    }

    #[test]
    fn sort_direction_parses() {
        assert_eq!("DESC".parse(), Ok(SortDirection::Descending));
        assert!("sideways".parse::<SortDirection>().is_err());
    }
}
