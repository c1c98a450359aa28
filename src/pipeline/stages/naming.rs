use polars::prelude::DataFrame;

use crate::constants::columns::{CURRENT_QUARTER, REPORTING_FREQUENCY, SUMMED_VS_SNAPSHOT};
use crate::constants::NAMING_CONVENTION;
use crate::error::Result;
use crate::frame;

/// Drop the reference metadata, stamp the current period on every row and
/// switch the raw extract column names to the reporting convention.
pub fn apply(table: DataFrame, current_period: &str) -> Result<DataFrame> {
    let table = frame::drop_columns(&table, &[SUMMED_VS_SNAPSHOT, REPORTING_FREQUENCY])?;
    let stamp = frame::constant(CURRENT_QUARTER, Some(current_period), table.height());
    frame::rename(frame::set_column(table, stamp)?, NAMING_CONVENTION)
}
