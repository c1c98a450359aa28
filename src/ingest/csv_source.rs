use std::path::{Path, PathBuf};
use std::time::Instant;

use encoding_rs::{Encoding, UTF_8};
use polars::prelude::{Column, DataFrame};
use tracing::{debug, info};

use super::{ColumnType, TableSchema, TableSource};
use crate::config::FileLocator;
use crate::error::{PipelineError, Result};
use crate::frame;
use crate::metrics::InputMetrics;

pub const DEFAULT_ENCODING: &str = "utf-8-sig";

#[derive(Debug, Clone)]
enum Origin {
    File(PathBuf),
    Memory { label: String, bytes: Vec<u8> },
}

/// Reads a comma separated file into a typed [`DataFrame`].
#[derive(Debug, Clone)]
pub struct CsvTableSource {
    origin: Origin,
    encoding: String,
    na_values: Vec<String>,
}

impl CsvTableSource {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            origin: Origin::File(path.into()),
            encoding: DEFAULT_ENCODING.to_string(),
            na_values: vec![String::new()],
        }
    }

    /// In-memory CSV content, mostly useful for tests and fixtures.
    pub fn from_bytes(label: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            origin: Origin::Memory {
                label: label.into(),
                bytes: bytes.into(),
            },
            encoding: DEFAULT_ENCODING.to_string(),
            na_values: vec![String::new()],
        }
    }

    pub fn from_locator(base_directory: &Path, locator: &FileLocator) -> Self {
        Self::from_path(base_directory.join(&locator.path))
            .with_encoding(&locator.encoding)
            .with_na_values(locator.na_values.clone())
    }

    pub fn with_encoding(mut self, encoding: &str) -> Self {
        self.encoding = encoding.to_string();
        self
    }

    pub fn with_na_values(mut self, na_values: Vec<String>) -> Self {
        self.na_values = na_values;
        self
    }

    fn load_bytes(&self) -> Result<Vec<u8>> {
        match &self.origin {
            Origin::File(path) => Ok(std::fs::read(path)?),
            Origin::Memory { bytes, .. } => Ok(bytes.clone()),
        }
    }
}

/// Decode raw bytes with a Python-style or WHATWG encoding label.
///
/// `utf-8-sig` is UTF-8 with an optional byte order mark; every other label is
/// resolved through `encoding_rs` (so `latin1` means windows-1252).
pub fn decode(bytes: &[u8], label: &str) -> Result<String> {
    let normalized = label.trim().to_ascii_lowercase();
    let encoding: &'static Encoding = match normalized.as_str() {
        "utf-8-sig" | "utf_8_sig" | "utf8" | "utf-8" => UTF_8,
        other => Encoding::for_label(other.as_bytes())
            .ok_or_else(|| PipelineError::Encoding(label.to_string()))?,
    };
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        return Err(PipelineError::Encoding(format!(
            "input is not valid {}",
            encoding.name()
        )));
    }
    Ok(text.into_owned())
}

enum Buffer {
    Category(Vec<Option<String>>),
    Int(Vec<Option<i64>>),
    Float(Vec<Option<f64>>),
}

impl Buffer {
    fn new(kind: ColumnType) -> Self {
        match kind {
            ColumnType::Category => Buffer::Category(Vec::new()),
            ColumnType::Int => Buffer::Int(Vec::new()),
            ColumnType::Float => Buffer::Float(Vec::new()),
        }
    }

    fn is_null(&self, row: usize) -> bool {
        match self {
            Buffer::Category(v) => v[row].is_none(),
            Buffer::Int(v) => v[row].is_none(),
            Buffer::Float(v) => v[row].is_none(),
        }
    }

    fn into_column(self, name: &str, keep: &[bool]) -> Column {
        fn kept<T>(values: Vec<T>, keep: &[bool]) -> Vec<T> {
            values
                .into_iter()
                .zip(keep)
                .filter_map(|(v, k)| k.then_some(v))
                .collect()
        }
        match self {
            Buffer::Category(v) => frame::string_column(name, kept(v, keep)),
            Buffer::Int(v) => frame::int_column(name, kept(v, keep)),
            Buffer::Float(v) => frame::float_column(name, kept(v, keep)),
        }
    }
}

impl CsvTableSource {
    fn parse(&self, text: &str, schema: &TableSchema) -> Result<DataFrame> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());
        let headers = reader.headers()?.clone();

        let mut positions = Vec::with_capacity(schema.columns.len());
        for (name, _) in schema.columns {
            let position = headers.iter().position(|h| h == *name).ok_or_else(|| {
                PipelineError::SchemaMismatch {
                    table: schema.name.to_string(),
                    column: name.to_string(),
                }
            })?;
            positions.push(position);
        }

        let mut buffers: Vec<Buffer> = schema.columns.iter().map(|(_, kind)| Buffer::new(*kind)).collect();
        let mut rows = 0usize;
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            for ((name, _), (position, buffer)) in schema.columns.iter().zip(positions.iter().zip(buffers.iter_mut())) {
                let raw = record.get(*position).unwrap_or("").trim();
                let value = if self.na_values.iter().any(|na| na == raw) {
                    None
                } else {
                    Some(raw)
                };
                match buffer {
                    Buffer::Category(v) => v.push(value.map(str::to_string)),
                    Buffer::Float(v) => {
                        v.push(value.and_then(|s| s.parse::<f64>().ok()).filter(|f| !f.is_nan()))
                    }
                    Buffer::Int(v) => {
                        let parsed = match value {
                            None => None,
                            Some(s) => Some(s.parse::<i64>().map_err(|_| PipelineError::TypeCoercion {
                                table: schema.name.to_string(),
                                column: name.to_string(),
                                row,
                                value: s.to_string(),
                            })?),
                        };
                        v.push(parsed);
                    }
                }
            }
            rows += 1;
        }

        let keep: Vec<bool> = (0..rows)
            .map(|row| buffers.iter().any(|b| !b.is_null(row)))
            .collect();
        let dropped = keep.iter().filter(|k| !**k).count();
        if dropped > 0 {
            debug!(table = schema.name, dropped, "dropped empty rows");
        }

        let columns = schema
            .columns
            .iter()
            .zip(buffers)
            .map(|((name, _), buffer)| buffer.into_column(name, &keep))
            .collect();
        Ok(DataFrame::new(columns)?)
    }
}

impl TableSource for CsvTableSource {
    fn describe(&self) -> String {
        match &self.origin {
            Origin::File(path) => path.display().to_string(),
            Origin::Memory { label, .. } => label.clone(),
        }
    }

    fn read(&self, schema: &TableSchema) -> Result<DataFrame> {
        let started = Instant::now();
        let bytes = self.load_bytes()?;
        let text = decode(&bytes, &self.encoding)?;
        let table = self.parse(&text, schema)?;
        InputMetrics::record_table_read(schema.name, table.height(), started.elapsed().as_secs_f64());
        info!(
            table = schema.name,
            source = %self.describe(),
            rows = table.height(),
            "read input table"
        );
        Ok(table)
    }
}
