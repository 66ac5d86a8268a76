//! Loading tabular files into columns and rows.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use polars::prelude::*;
use rayon::prelude::*;
use tracing::{debug, info, instrument};

use crate::column::Column;
use crate::domain::{DataType, TableError};
use crate::value::{Row, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Csv,
    Parquet,
    Arrow,
}

#[derive(Debug)]
pub struct FileInfo {
    pub path: PathBuf,
    pub file_size: u64,
    pub file_type: FileType,
}

/// A loaded file: one column definition per file column and the rows.
#[derive(Debug)]
pub struct LoadedTable {
    pub name: String,
    pub columns: Vec<Column>,
    pub rows: Vec<Arc<Row>>,
}

struct LoadedColumn {
    name: String,
    data_type: DataType,
    values: Vec<Value>,
}

pub fn detect_file_type(path: &Path) -> Result<FileType, TableError> {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_uppercase())
        .as_deref()
    {
        Some("CSV") => Ok(FileType::Csv),
        Some("PARQUET") | Some("PQ") => Ok(FileType::Parquet),
        Some("ARROW") | Some("IPC") | Some("FEATHER") => Ok(FileType::Arrow),
        _ => Err(TableError::UnknownFileType(path.display().to_string())),
    }
}

pub fn get_file_info(path: PathBuf) -> Result<FileInfo, TableError> {
    let metadata = fs::metadata(&path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => TableError::FileNotFound,
        ErrorKind::PermissionDenied => TableError::PermissionDenied,
        _ => TableError::IoError(e),
    })?;
    if !metadata.is_file() {
        return Err(TableError::NotAFile(path.display().to_string()));
    }

    let file_type = detect_file_type(&path)?;
    Ok(FileInfo {
        path,
        file_size: metadata.len(),
        file_type,
    })
}

/// Column kind for a polars dtype.
pub fn infer_data_type(dtype: &polars::prelude::DataType) -> DataType {
    use polars::prelude::DataType as Dtype;

    match dtype {
        Dtype::Int8
        | Dtype::Int16
        | Dtype::Int32
        | Dtype::Int64
        | Dtype::UInt8
        | Dtype::UInt16
        | Dtype::UInt32
        | Dtype::UInt64
        | Dtype::Float32
        | Dtype::Float64 => DataType::Number,
        Dtype::Boolean => DataType::Boolean,
        Dtype::String => DataType::String,
        Dtype::Date | Dtype::Datetime(_, _) => DataType::Date,
        _ => DataType::None,
    }
}

fn load_csv(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyCsvReader::new(PlPath::Local(path.into()))
        .with_has_header(true)
        .finish()
}

fn load_parquet(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyFrame::scan_parquet(PlPath::Local(path.into()), ScanArgsParquet::default())
}

fn load_arrow(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyFrame::scan_ipc(
        PlPath::Local(path.into()),
        polars::io::ipc::IpcScanOptions,
        UnifiedScanArgs::default(),
    )
}

// Numbers and booleans keep their type; everything else is read as text.
fn load_column(df: &DataFrame, name: &str) -> Result<LoadedColumn, PolarsError> {
    let column = df.column(name)?;
    let data_type = infer_data_type(column.dtype());

    let values: Vec<Value> = match data_type {
        DataType::Number => column
            .cast(&polars::prelude::DataType::Float64)?
            .f64()?
            .into_iter()
            .map(Value::from)
            .collect(),
        DataType::Boolean => column.bool()?.into_iter().map(Value::from).collect(),
        _ => column
            .cast(&polars::prelude::DataType::String)?
            .str()?
            .into_iter()
            .map(|s| Value::from(s.map(str::to_string)))
            .collect(),
    };

    Ok(LoadedColumn {
        name: name.to_string(),
        data_type,
        values,
    })
}

/// Loads a CSV, Parquet or Arrow IPC file. Columns are converted in parallel.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_table_file(path: &Path) -> Result<LoadedTable, TableError> {
    let file_info = get_file_info(path.to_path_buf())?;
    debug!("Loading {:?} file of {} bytes", file_info.file_type, file_info.file_size);
    let frame = match file_info.file_type {
        FileType::Csv => load_csv(&file_info.path)?,
        FileType::Parquet => load_parquet(&file_info.path)?,
        FileType::Arrow => load_arrow(&file_info.path)?,
    };

    let start_time = Instant::now();
    let df = frame.collect()?;
    let names: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .collect();
    if names.is_empty() {
        return Err(TableError::EmptyTable);
    }

    let loaded: Result<Vec<LoadedColumn>, PolarsError> = names
        .par_iter()
        .map(|name| load_column(&df, name))
        .collect();
    let loaded = loaded?;

    let height = df.height();
    let rows: Vec<Arc<Row>> = (0..height)
        .into_par_iter()
        .map(|i| {
            Arc::new(
                loaded
                    .iter()
                    .map(|column| (column.name.clone(), column.values[i].clone()))
                    .collect(),
            )
        })
        .collect();

    let columns = loaded
        .iter()
        .map(|column| Column::new(column.name.clone()).data_type(column.data_type))
        .collect::<Vec<_>>();
    for column in &columns {
        debug!("Column: {} {}", column.id, column.data_type);
    }

    info!(
        "Loading data took {}ms, {} rows and {} columns",
        start_time.elapsed().as_millis(),
        rows.len(),
        columns.len()
    );

    let name = file_info
        .path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("???")
        .to_string();
    Ok(LoadedTable {
        name,
        columns,
        rows,
    })
}
