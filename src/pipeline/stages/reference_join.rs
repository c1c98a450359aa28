//! Attach reporting-method metadata from the reference table.

use polars::prelude::DataFrame;
use tracing::debug;

use crate::constants::columns::{
    FISCAL_YEAR, INDICATOR, OTHERDISAGGREGATE, REF_FISCAL_YEAR, REF_INDICATOR,
    STANDARDIZEDDISAGGREGATE,
};
use crate::constants::REFERENCE_JOIN_ORDER;
use crate::error::Result;
use crate::frame::{self, harmonize};

/// Left join the site extracts to the reference table on indicator, fiscal
/// year and both disaggregates. Unmatched rows keep null reporting method and
/// frequency.
pub fn apply(site: DataFrame, reference: DataFrame) -> Result<DataFrame> {
    let mut site = site;
    let mut reference = reference;
    harmonize(&mut [(&mut site, INDICATOR), (&mut reference, REF_INDICATOR)])?;
    harmonize(&mut [
        (&mut site, STANDARDIZEDDISAGGREGATE),
        (&mut reference, STANDARDIZEDDISAGGREGATE),
    ])?;
    harmonize(&mut [(&mut site, OTHERDISAGGREGATE), (&mut reference, OTHERDISAGGREGATE)])?;

    let joined = frame::left_join(
        &site,
        &reference,
        &[
            (INDICATOR, REF_INDICATOR),
            (FISCAL_YEAR, REF_FISCAL_YEAR),
            (STANDARDIZEDDISAGGREGATE, STANDARDIZEDDISAGGREGATE),
            (OTHERDISAGGREGATE, OTHERDISAGGREGATE),
        ],
    )?;
    debug!(rows = joined.height(), "reference join complete");
    frame::select(&joined, REFERENCE_JOIN_ORDER)
}
