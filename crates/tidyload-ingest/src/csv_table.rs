use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

use csv::ReaderBuilder;
use tracing::{debug, info, warn};

use tidyload_model::{ColumnMeta, RecordBatch, SemanticType, Value};
use tidyload_transform::{parse_datetime, parse_f64, parse_i64};

use crate::error::{IngestError, Result};

/// Spellings that always read as a missing value.
pub const DEFAULT_NA_VALUES: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Extra spellings added when no list is configured.
pub const EXTRA_NA_VALUES: [&str; 6] = ["", "NULL", "null", "N/A", "n/a", "#N/A"];

#[derive(Debug, Clone)]
pub struct ExtractOptions {
    pub delimiter: u8,
    /// Columns parsed as timestamps when every non-null cell parses.
    pub parse_dates: Vec<String>,
    /// Additional NA spellings on top of [`DEFAULT_NA_VALUES`].
    pub na_values: Vec<String>,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            parse_dates: Vec::new(),
            na_values: EXTRA_NA_VALUES.iter().map(|v| (*v).to_string()).collect(),
        }
    }
}

impl ExtractOptions {
    pub fn with_parse_dates<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parse_dates = columns.into_iter().map(Into::into).collect();
        self
    }

    fn na_set(&self) -> BTreeSet<&str> {
        DEFAULT_NA_VALUES
            .iter()
            .copied()
            .chain(self.na_values.iter().map(String::as_str))
            .collect()
    }
}

/// A batch read from a delimited file, with the counts the transform stage
/// expects from extraction.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub batch: RecordBatch,
    pub null_counts: BTreeMap<String, usize>,
    pub row_count: usize,
    pub column_count: usize,
}

fn normalize_header(raw: &str) -> String {
    raw.trim_matches('\u{feff}').to_string()
}

/// Suffix repeated header names with `.1`, `.2`, ... so column names stay unique.
fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: BTreeSet<String> = BTreeSet::new();
    let mut out = Vec::with_capacity(headers.len());
    for header in headers {
        let mut name = header.clone();
        let mut suffix = 1;
        while seen.contains(&name) {
            name = format!("{header}.{suffix}");
            suffix += 1;
        }
        seen.insert(name.clone());
        out.push(name);
    }
    out
}

fn open_checked(path: &Path) -> Result<PathBuf> {
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    if !path.is_file() {
        return Err(IngestError::NotAFile {
            path: path.to_path_buf(),
        });
    }
    Ok(path.to_path_buf())
}

/// Read a delimited file into a typed record batch.
pub fn read_delimited(path: &Path, options: &ExtractOptions) -> Result<Extraction> {
    let path = open_checked(path)?;
    let started = Instant::now();
    info!(path = %path.display(), "starting extraction");

    let file = File::open(&path).map_err(|source| IngestError::FileRead {
        path: path.clone(),
        source,
    })?;
    let csv_error = |source: csv::Error| IngestError::CsvParse {
        path: path.clone(),
        source,
    };
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .delimiter(options.delimiter)
        .from_reader(file);

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(normalize_header)
        .collect();
    if headers.is_empty() {
        return Err(IngestError::EmptyCsv { path });
    }
    let headers = dedupe_headers(headers);
    let width = headers.len();

    let na = options.na_set();
    let mut cells: Vec<Vec<Option<String>>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        if record.len() > width {
            let line = record.position().map_or(0, csv::Position::line);
            return Err(IngestError::TooManyFields {
                path,
                line,
                expected: width,
                found: record.len(),
            });
        }
        let mut row: Vec<Option<String>> = record
            .iter()
            .map(|cell| (!na.contains(cell)).then(|| cell.to_string()))
            .collect();
        row.resize(width, None);
        cells.push(row);
    }

    for column in &options.parse_dates {
        if !headers.contains(column) {
            return Err(IngestError::MissingDateColumn {
                column: column.clone(),
                path,
            });
        }
    }

    let mut columns = Vec::with_capacity(width);
    let mut typed: Vec<Vec<Value>> = Vec::with_capacity(width);
    for (idx, name) in headers.iter().enumerate() {
        let raw: Vec<Option<&str>> = cells.iter().map(|row| row[idx].as_deref()).collect();
        let wants_dates = options.parse_dates.contains(name);
        let (semantic_type, values) = infer_column(&raw, wants_dates);
        if wants_dates && semantic_type != SemanticType::Datetime {
            warn!(column = %name, "date column left as text: not every value parses");
        }
        debug!(column = %name, semantic_type = semantic_type.name(), "inferred column type");
        columns.push(ColumnMeta::new(name.clone(), semantic_type));
        typed.push(values);
    }

    let height = cells.len();
    let mut rows: Vec<Vec<Value>> = (0..height).map(|_| Vec::with_capacity(width)).collect();
    for column in typed {
        for (row, value) in rows.iter_mut().zip(column) {
            row.push(value);
        }
    }
    let batch = RecordBatch::new(columns, rows)?;
    let null_counts = batch.null_counts();

    info!(
        path = %path.display(),
        rows = batch.height(),
        columns = batch.width(),
        duration_ms = started.elapsed().as_millis(),
        "extraction complete"
    );
    Ok(Extraction {
        row_count: batch.height(),
        column_count: batch.width(),
        null_counts,
        batch,
    })
}

/// Pick the narrowest type every non-null cell parses as and convert the column.
///
/// Order: timestamps (only when requested), integers, floats, booleans, text.
pub fn infer_column(raw: &[Option<&str>], parse_dates: bool) -> (SemanticType, Vec<Value>) {
    if raw.iter().all(Option::is_none) {
        return (SemanticType::String, vec![Value::Null; raw.len()]);
    }
    if parse_dates {
        if let Some(values) = convert_all(raw, |s| parse_datetime(s).map(Value::Timestamp)) {
            return (SemanticType::Datetime, values);
        }
    }
    if let Some(values) = convert_all(raw, |s| parse_i64(s).map(Value::Int)) {
        return (SemanticType::Integer, values);
    }
    if let Some(values) = convert_all(raw, |s| parse_f64(s).map(Value::Float)) {
        return (SemanticType::Float, values);
    }
    if let Some(values) = convert_all(raw, parse_bool) {
        return (SemanticType::Boolean, values);
    }
    let values = raw
        .iter()
        .map(|cell| cell.map_or(Value::Null, Value::str))
        .collect();
    (SemanticType::String, values)
}

/// Convert every present cell with `f`, or give up on the first miss.
fn convert_all(raw: &[Option<&str>], f: impl Fn(&str) -> Option<Value>) -> Option<Vec<Value>> {
    raw.iter()
        .map(|cell| match cell {
            Some(text) => f(text),
            None => Some(Value::Null),
        })
        .collect()
}

fn parse_bool(text: &str) -> Option<Value> {
    match text.to_ascii_lowercase().as_str() {
        "true" => Some(Value::Bool(true)),
        "false" => Some(Value::Bool(false)),
        _ => None,
    }
}
