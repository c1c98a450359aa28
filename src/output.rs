//! CSV sink for the fact table.
//!
//! The bytes are hashed as they are written so two runs over the same inputs
//! can be compared by digest alone.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use polars::prelude::*;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::error::{PipelineError, Result};
use crate::metrics::OutputMetrics;

/// Row count and content hash of a written fact table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FactDigest {
    pub rows: usize,
    pub bytes: usize,
    pub sha256: String,
}

struct HashingWriter<W> {
    inner: W,
    hasher: Sha256,
    bytes: usize,
}

impl<W: Write> Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.hasher.update(&buf[..written]);
        self.bytes += written;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

fn format_float(value: f64) -> String {
    if value == 0.0 {
        // avoid "-0"
        "0".to_string()
    } else {
        value.to_string()
    }
}

/// Text of every cell of `column`, in row order.
fn render(column: &Column) -> Result<Vec<String>> {
    let cells = match column.dtype() {
        DataType::String => column.str()?.into_iter().map(|v| v.unwrap_or_default().to_string()).collect(),
        DataType::Int64 => column.i64()?.into_iter().map(|v| v.map(|i| i.to_string()).unwrap_or_default()).collect(),
        DataType::Float64 => column.f64()?.into_iter().map(|v| v.map(format_float).unwrap_or_default()).collect(),
        DataType::Date => column
            .date()?
            .as_date_iter()
            .map(|v| v.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default())
            .collect(),
        DataType::Null => vec![String::new(); column.len()],
        other => {
            return Err(PipelineError::ColumnType {
                column: column.name().to_string(),
                expected: "str, i64, f64 or date",
                found: other.to_string(),
            })
        }
    };
    Ok(cells)
}

/// Write `table` as CSV with a header row. Nulls are empty fields.
pub fn write_csv<W: Write>(table: &DataFrame, writer: W) -> Result<FactDigest> {
    let hashing = HashingWriter {
        inner: writer,
        hasher: Sha256::new(),
        bytes: 0,
    };
    let mut csv = csv::Writer::from_writer(hashing);
    csv.write_record(table.get_column_names_str())?;

    let columns = table.get_columns().iter().map(render).collect::<Result<Vec<_>>>()?;
    let mut record = Vec::with_capacity(columns.len());
    for row in 0..table.height() {
        record.clear();
        record.extend(columns.iter().map(|cells| cells[row].as_str()));
        csv.write_record(&record)?;
    }
    csv.flush()?;

    let hashing = csv.into_inner().map_err(|e| e.into_error())?;
    let digest = FactDigest {
        rows: table.height(),
        bytes: hashing.bytes,
        sha256: hex::encode(hashing.hasher.finalize()),
    };
    OutputMetrics::record_write(digest.rows, digest.bytes);
    Ok(digest)
}

/// Write `table` to `path`, replacing any existing file.
pub fn write_file(table: &DataFrame, path: &Path) -> Result<FactDigest> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let digest = write_csv(table, &mut writer)?;
    writer.flush()?;
    info!(path = %path.display(), rows = digest.rows, sha256 = %digest.sha256, "fact table written");
    Ok(digest)
}
