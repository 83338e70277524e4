use std::collections::HashMap;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};

use arrow::array::Array;
use arrow::error::ArrowError;
use arrow::util::display::array_value_to_string;
use chrono::{NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, Trim};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::errors::ParquetError;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{CellValue, Dataset, Record};
use super::schema::{Column, SemanticType};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Hard failures while loading a table. Unparseable cells are not errors;
/// they become missing values and are reported as [`CellIssue`]s.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("required column '{column}' is missing")]
    MissingColumn { column: &'static str },

    #[error("unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JSON: {0}")]
    InvalidJson(String),

    #[error("parquet: {0}")]
    Parquet(#[from] ParquetError),

    #[error("arrow: {0}")]
    Arrow(#[from] ArrowError),
}

/// A cell that could not be coerced to its column type and was loaded as
/// missing.
#[derive(Debug, Clone, PartialEq)]
pub struct CellIssue {
    /// Zero-based data row.
    pub row: usize,
    pub column: Column,
    pub raw: String,
}

impl fmt::Display for CellIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {}, {}: '{}'", self.row, self.column, self.raw)
    }
}

/// Spellings read as a missing value rather than as a parse failure.
const MISSING_TOKENS: &[&str] = &[
    "", "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "-nan", "null", "NULL", "None", "<NA>", "#N/A",
];

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a customer table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row plus one record per line
/// * `.json`    – `[{ "Customer_ID": 1, "Age": 34, ... }, ...]`
/// * `.parquet` – one column per attribute
pub fn load_file(path: &Path) -> Result<Dataset, LoadError> {
    let (dataset, issues) = load_file_detailed(path)?;
    log_issues(&issues);
    log::info!("Loaded {} rows from {}", dataset.len(), path.display());
    Ok(dataset)
}

/// Like [`load_file`] but also returns every cell that was coerced to
/// missing.
pub fn load_file_detailed(path: &Path) -> Result<(Dataset, Vec<CellIssue>), LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => {
            let reader = ReaderBuilder::new()
                .trim(Trim::All)
                .flexible(true)
                .from_path(path)?;
            read_csv(reader)?
        }
        "json" => read_json(path)?,
        "parquet" | "pq" => read_parquet(path)?,
        other => return Err(LoadError::UnsupportedExtension(other.to_string())),
    };
    build_dataset(table)
}

/// Load CSV text from any reader (uploads, in-memory buffers).
pub fn load_csv_reader<R: Read>(reader: R) -> Result<Dataset, LoadError> {
    let reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);
    let (dataset, issues) = build_dataset(read_csv(reader)?)?;
    log_issues(&issues);
    Ok(dataset)
}

fn log_issues(issues: &[CellIssue]) {
    if issues.is_empty() {
        return;
    }
    log::warn!("{} cells could not be parsed and were loaded as missing", issues.len());
    for issue in issues.iter().take(10) {
        log::warn!("  {issue}");
    }
}

// ---------------------------------------------------------------------------
// Raw table: header names + optional text cells, format independent
// ---------------------------------------------------------------------------

struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

fn build_dataset(table: RawTable) -> Result<(Dataset, Vec<CellIssue>), LoadError> {
    let mut index: HashMap<Column, usize> = HashMap::new();
    for (i, header) in table.headers.iter().enumerate() {
        match Column::from_name(header.trim()) {
            Some(col) => {
                index.entry(col).or_insert(i);
            }
            None => log::debug!("Ignoring unknown column '{header}'"),
        }
    }

    if let Some(missing) = Column::REQUIRED.into_iter().find(|c| !index.contains_key(c)) {
        return Err(LoadError::MissingColumn {
            column: missing.name(),
        });
    }

    let mut issues = Vec::new();
    let mut records = Vec::with_capacity(table.rows.len());

    for (row_no, row) in table.rows.into_iter().enumerate() {
        let mut record = Record::default();
        for (&col, &idx) in &index {
            let Some(raw) = row.get(idx).and_then(|c| c.as_deref()).map(str::trim) else {
                continue;
            };
            if MISSING_TOKENS.contains(&raw) {
                continue;
            }
            match coerce(col, raw) {
                Some(value) => record.set(col, value),
                None => issues.push(CellIssue {
                    row: row_no,
                    column: col,
                    raw: raw.to_string(),
                }),
            }
        }
        records.push(record);
    }

    issues.sort_by_key(|i| (i.row, i.column));
    Ok((Dataset::from_records(records), issues))
}

/// Coerce one non-missing cell to its column's declared type.
///
/// Quantity and price must be non-negative; anything below zero is treated
/// like an unparseable cell.
fn coerce(column: Column, raw: &str) -> Option<CellValue> {
    let value = match column.semantic_type() {
        SemanticType::Integer => parse_integer(raw).map(CellValue::Number),
        SemanticType::Numeric => raw
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .map(CellValue::Number),
        SemanticType::Categorical => Some(CellValue::Text(raw.to_string())),
        SemanticType::Date => parse_date(raw).map(CellValue::Date),
    };
    match (column, value) {
        (Column::Quantity | Column::Price, Some(CellValue::Number(v))) if v < 0.0 => None,
        (_, value) => value,
    }
}

/// Whole numbers, including integral floats such as `"34.0"`.
fn parse_integer(raw: &str) -> Option<f64> {
    if let Ok(i) = raw.parse::<i64>() {
        return Some(i as f64);
    }
    raw.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && v.fract() == 0.0)
}

/// `YYYY-MM-DD`, or a date-time whose date part is in that form.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(d);
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
}

// ---------------------------------------------------------------------------
// CSV reader
// ---------------------------------------------------------------------------

fn read_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<RawTable, LoadError> {
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        rows.push(record.iter().map(|v| Some(v.to_string())).collect());
    }

    Ok(RawTable { headers, rows })
}

// ---------------------------------------------------------------------------
// JSON reader
// ---------------------------------------------------------------------------

/// Expected JSON layout (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Customer_ID": 1, "Age": 34, "Gender": "Male", "Income": 52000, ... },
///   ...
/// ]
/// ```
fn read_json(path: &Path) -> Result<RawTable, LoadError> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let root: JsonValue = serde_json::from_str(&text)?;

    let records = root
        .as_array()
        .ok_or_else(|| LoadError::InvalidJson("expected top-level JSON array".into()))?;

    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| LoadError::InvalidJson(format!("row {i} is not a JSON object")))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(JsonValue::as_object)
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).and_then(json_to_text))
                .collect()
        })
        .collect();

    Ok(RawTable { headers, rows })
}

fn json_to_text(val: &JsonValue) -> Option<String> {
    match val {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet reader
// ---------------------------------------------------------------------------

/// Every column is rendered through Arrow's display formatting and then
/// coerced like a CSV cell, so Int64, Float64, Utf8, Date32 and Timestamp
/// columns are all accepted.
fn read_parquet(path: &Path) -> Result<RawTable, LoadError> {
    let file = std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;

    // From the file schema, so a table with no row groups still has headers.
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build()?;

    let mut rows: Vec<Vec<Option<String>>> = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        for row in 0..batch.num_rows() {
            let mut cells = Vec::with_capacity(batch.num_columns());
            for col in batch.columns() {
                if col.is_null(row) {
                    cells.push(None);
                } else {
                    cells.push(Some(array_value_to_string(col.as_ref(), row)?));
                }
            }
            rows.push(cells);
        }
    }

    Ok(RawTable { headers, rows })
}
