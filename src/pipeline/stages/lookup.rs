//! Partner-type and known-issue enrichment.

use polars::prelude::DataFrame;
use tracing::debug;

use crate::constants::columns::{INDICATOR, MECHANISM_ID, MECH_CODE, OPERATINGUNIT, OPERATING_UNIT, PERIOD, QUARTER};
use crate::error::Result;
use crate::frame::{self, harmonize};

/// Attach `Partner Type` and `G2G` by mechanism.
pub fn partner_type(main: DataFrame, lookup: DataFrame) -> Result<DataFrame> {
    let mut main = main;
    let mut lookup = lookup;
    harmonize(&mut [(&mut main, MECH_CODE), (&mut lookup, MECHANISM_ID)])?;
    let joined = frame::left_join(&main, &lookup, &[(MECH_CODE, MECHANISM_ID)])?;
    debug!(rows = joined.height(), "partner type attached");
    Ok(joined)
}

/// Attach the known-issue exclusion flag. Flagged rows are kept.
pub fn known_issues(main: DataFrame, lookup: DataFrame) -> Result<DataFrame> {
    let mut main = main;
    let mut lookup = lookup;
    harmonize(&mut [(&mut main, INDICATOR), (&mut lookup, INDICATOR)])?;
    harmonize(&mut [(&mut main, MECH_CODE), (&mut lookup, MECH_CODE)])?;
    harmonize(&mut [(&mut main, OPERATING_UNIT), (&mut lookup, OPERATINGUNIT)])?;
    harmonize(&mut [(&mut main, QUARTER), (&mut lookup, PERIOD)])?;
    let joined = frame::left_join(
        &main,
        &lookup,
        &[
            (INDICATOR, INDICATOR),
            (MECH_CODE, MECH_CODE),
            (OPERATING_UNIT, OPERATINGUNIT),
            (QUARTER, PERIOD),
        ],
    )?;
    debug!(rows = joined.height(), "known issues attached");
    Ok(joined)
}

pub fn apply(main: DataFrame, partner_types: DataFrame, issues: DataFrame) -> Result<DataFrame> {
    known_issues(partner_type(main, partner_types)?, issues)
}
