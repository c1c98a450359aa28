//! Quarterly targets and running cumulative results.

use polars::prelude::*;

use crate::constants::columns::{
    DISAGGREGATE, INDICATOR, QTR_RUNNING_CUMULATIVE, QTR_TARGETS, QUARTERS, REPORTING_FREQUENCY,
    SUMMED_VS_SNAPSHOT, TARGETS,
};
use crate::constants::indicators::{PMTCT_HEI_POS, PMTCT_HEI_POS_ART, TX_CURR, TX_MMD};
use crate::constants::{ARV_DISPENSE_DISAGGREGATE, HEI_ART_STATUS_DISAGGREGATE};
use crate::error::Result;
use crate::frame;
use crate::fiscal::Quarter;

/// How an indicator's quarterly results relate to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportingMethod {
    /// Each quarter is a point-in-time count.
    Snapshot,
    /// Quarters add up over the year.
    Summed,
    /// No reference entry; treated like `Summed`.
    Unknown,
}

impl ReportingMethod {
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some("Snapshot") => ReportingMethod::Snapshot,
            Some("Summed") => ReportingMethod::Summed,
            _ => ReportingMethod::Unknown,
        }
    }
}

/// Indicator under which a row is reported once its disaggregate is known.
fn remap_indicator<'a>(indicator: Option<&'a str>, disaggregate: Option<&str>) -> Option<&'a str> {
    match (indicator, disaggregate) {
        (Some(TX_CURR), Some(ARV_DISPENSE_DISAGGREGATE)) => Some(TX_MMD),
        (Some(PMTCT_HEI_POS), Some(HEI_ART_STATUS_DISAGGREGATE)) => Some(PMTCT_HEI_POS_ART),
        (other, _) => other,
    }
}

/// Running cumulative result at `quarter` given the four raw quarter values.
pub fn running_cumulative(
    quarter: Quarter,
    quarters: [Option<f64>; 4],
    method: ReportingMethod,
    semi_annual: bool,
) -> Option<f64> {
    let point_in_time = match (quarter, method) {
        (Quarter::Q1, _) => true,
        (_, ReportingMethod::Snapshot) => true,
        (Quarter::Q3, ReportingMethod::Summed) if semi_annual => true,
        _ => false,
    };
    let upto = quarter.number() as usize;
    if point_in_time {
        quarters[upto - 1]
    } else {
        Some(quarters[..upto].iter().map(|v| v.unwrap_or(0.0)).sum())
    }
}

pub fn apply(main: DataFrame) -> Result<DataFrame> {
    let remapped: Vec<Option<&str>> = frame::strings(&main, INDICATOR)?
        .into_iter()
        .zip(frame::strings(&main, DISAGGREGATE)?)
        .map(|(indicator, disaggregate)| remap_indicator(indicator, disaggregate))
        .collect();
    let remapped = frame::string_column(INDICATOR, remapped);

    let cumulatives = {
        let method = frame::strings(&main, SUMMED_VS_SNAPSHOT)?;
        let frequency = frame::strings(&main, REPORTING_FREQUENCY)?;
        let raw = QUARTERS
            .iter()
            .map(|name| frame::floats(&main, name))
            .collect::<Result<Vec<_>>>()?;
        let mut cumulatives: Vec<Vec<Option<f64>>> = vec![Vec::with_capacity(main.height()); 4];
        for row in 0..main.height() {
            let quarters = [raw[0].get(row), raw[1].get(row), raw[2].get(row), raw[3].get(row)];
            let method = ReportingMethod::parse(method.get(row));
            let semi_annual = frequency.get(row) == Some("Semi-Annual");
            for (slot, quarter) in cumulatives.iter_mut().zip(Quarter::ALL) {
                slot.push(running_cumulative(quarter, quarters, method, semi_annual));
            }
        }
        cumulatives
    };

    let mut main = frame::set_column(main, remapped)?;
    let targets = frame::column(&main, TARGETS)?.clone();
    for name in QTR_TARGETS {
        main.with_column(targets.clone().with_name(name.into()))?;
    }
    for (name, values) in QTR_RUNNING_CUMULATIVE.iter().zip(cumulatives) {
        main.with_column(frame::float_column(name, values))?;
    }
    Ok(main)
}
