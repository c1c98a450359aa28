use polars::prelude::DataFrame;

use crate::constants::OUTPUT_SCHEMA;
use crate::error::Result;
use crate::frame;

/// Reorder and rename the fact table to the downstream store's schema.
pub fn apply(table: &DataFrame) -> Result<DataFrame> {
    let order: Vec<&str> = OUTPUT_SCHEMA.iter().map(|(from, _)| *from).collect();
    frame::rename(frame::select(table, &order)?, OUTPUT_SCHEMA)
}
