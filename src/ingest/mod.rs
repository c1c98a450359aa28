//! Input side of the pipeline: declared table schemas and the reader port.

pub mod csv_source;
pub mod schemas;

use polars::prelude::DataFrame;
use tracing::{debug, info};

use crate::constants::columns;
use crate::error::{PipelineError, Result};
use crate::frame;

pub use csv_source::CsvTableSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Category,
    Int,
    Float,
}

/// Ordered column name -> type declaration of one input table.
#[derive(Debug, Clone, Copy)]
pub struct TableSchema {
    pub name: &'static str,
    pub columns: &'static [(&'static str, ColumnType)],
}

impl TableSchema {
    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|(name, _)| *name).collect()
    }
}

/// A tabular reader collaborator.
///
/// Implementations coerce every declared column to its type (floats that do
/// not parse become null, integers that do not parse are an error), trim
/// whitespace, map the configured sentinel strings to null and drop rows whose
/// declared columns are all null.
pub trait TableSource {
    fn describe(&self) -> String;
    fn read(&self, schema: &TableSchema) -> Result<DataFrame>;
}

/// Canonicalize a site extract's mechanism code: purely numeric codes lose
/// their leading zeros, anything else becomes null.
pub fn canonicalize_mech_code(df: DataFrame) -> Result<DataFrame> {
    let codes: Vec<Option<&str>> = frame::strings(&df, columns::MECH_CODE)?
        .into_iter()
        .map(|value| {
            let value = value?;
            if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let trimmed = value.trim_start_matches('0');
            Some(if trimmed.is_empty() { "0" } else { trimmed })
        })
        .collect();
    let codes = frame::string_column(columns::MECH_CODE, codes);
    frame::set_column(df, codes)
}

/// Read every site extract, canonicalize its mechanism codes and union them.
pub fn read_site_extracts(sources: &[Box<dyn TableSource>]) -> Result<DataFrame> {
    if sources.is_empty() {
        return Err(PipelineError::Config("no site extracts to read".to_string()));
    }
    let mut tables = Vec::with_capacity(sources.len());
    for source in sources {
        debug!(source = %source.describe(), "reading site extract");
        let table = canonicalize_mech_code(source.read(&schemas::SITE_EXTRACT)?)?;
        tables.push(table);
    }
    let union = frame::concat(tables)?;
    info!(files = sources.len(), rows = union.height(), "site extracts combined");
    Ok(union)
}
