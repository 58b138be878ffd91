//! Loading delimited text into the raw table model.
//!
//! The first record is the header; every later record becomes a row of loose
//! cells. Empty fields ingest as nulls, short records are padded, records
//! wider than the header fail the whole load, and records consisting only of
//! nulls are dropped before the engine ever counts missing values.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use serde_json::Value;
use thiserror::Error;

use crate::table::RawTable;

/// Problems reading the source file. Fatal at this layer.
#[derive(Debug, Error)]
pub enum FileLoadError {
    #[error("Cannot open '{path}': {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed input: {0}")]
    Malformed(String),
}

impl From<csv::Error> for FileLoadError {
    fn from(err: csv::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

/// Read a CSV file into a raw table.
pub fn read_csv_path(path: &Path) -> Result<RawTable, FileLoadError> {
    let file = File::open(path).map_err(|source| FileLoadError::Open {
        path: path.display().to_string(),
        source,
    })?;
    read_csv(file)
}

/// Read CSV from any reader. Fields are trimmed; records may run short but
/// never wide.
pub fn read_csv<R: Read>(reader: R) -> Result<RawTable, FileLoadError> {
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let columns: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
    let mut table = RawTable::new(columns);

    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        if record.len() > table.columns.len() {
            return Err(FileLoadError::Malformed(format!(
                "record {} has {} fields, expected {}",
                i + 1,
                record.len(),
                table.columns.len()
            )));
        }
        let row: Vec<Value> = record.iter().map(cell_value).collect();
        if row.iter().all(Value::is_null) {
            continue;
        }
        table.push_row(row);
    }

    Ok(table)
}

fn cell_value(field: &str) -> Value {
    if field.is_empty() {
        Value::Null
    } else {
        Value::String(field.to_string())
    }
}
