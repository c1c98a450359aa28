//! Shared builders for the integration tests: CSV-backed inputs read through
//! the same reader a file-based run uses.

#![allow(dead_code)]

use msd_pipeline::ingest::{schemas, CsvTableSource, TableSchema, TableSource};
use msd_pipeline::pipeline::PipelineInputs;

/// One row of an extract as `(column, raw text)` pairs; absent columns are empty.
pub type Row<'a> = &'a [(&'a str, &'a str)];

pub fn csv_text(schema: &TableSchema, rows: &[Row<'_>]) -> String {
    let names = schema.column_names();
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&names).unwrap();
    for row in rows {
        let record: Vec<&str> = names
            .iter()
            .map(|name| row.iter().find(|(column, _)| column == name).map_or("", |(_, value)| *value))
            .collect();
        writer.write_record(&record).unwrap();
    }
    String::from_utf8(writer.into_inner().unwrap()).unwrap()
}

pub fn source(schema: &TableSchema, rows: &[Row<'_>]) -> Box<dyn TableSource> {
    Box::new(CsvTableSource::from_bytes(schema.name, csv_text(schema, rows).into_bytes()))
}

/// Inputs with the given site rows and empty reference and lookup tables.
pub fn inputs(site_rows: &[Row<'_>]) -> PipelineInputs {
    PipelineInputs {
        reference: source(&schemas::REFERENCE_TABLE, &[]),
        partner_type: source(&schemas::PARTNER_TYPE_TABLE, &[]),
        known_issues: source(&schemas::KNOWN_ISSUES_TABLE, &[]),
        site_extracts: vec![source(&schemas::SITE_EXTRACT, site_rows)],
        nat_subnat: source(&schemas::NAT_SUBNAT_EXTRACT, &[]),
    }
}
