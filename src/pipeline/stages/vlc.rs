//! Viral load coverage (TX_VL_COVERAGE).
//!
//! Coverage compares viral load tests in a quarter against the treatment
//! population of earlier quarters, so every contributing result row is copied
//! forward onto the calendar quarters it is a numerator or denominator for.
//! The copies swap numerator and denominator roles: a TX_PVLS denominator is
//! a coverage numerator, and TX_CURR and PMTCT_ART numerators are coverage
//! denominators.

use std::cmp::Ordering;

use chrono::{Months, NaiveDate};
use polars::prelude::*;
use tracing::debug;

use super::clean_fields::{relabel, MeasureKind};
use crate::constants::columns::{
    CUMULATIVE, DISAGGREGATE, FY, INDICATOR, NUMERATOR_DENOM, OTHER_DISAGGREGATE, QUARTER,
    QUARTER_CALENDAR_DATE, RESULTS, RESULTS_OR_TARGETS, SOURCE_NAME, STANDARDIZED_DISAGGREGATE, VALUES,
};
use crate::constants::indicators::{PMTCT_ART, TX_CURR, TX_PVLS, TX_VL_COVERAGE};
use crate::constants::{
    DERIVED_SOURCE, FINAL_COLUMN_ORDER, TOTAL_DENOMINATOR, TOTAL_NUMERATOR, VLC_EXCLUDED_OTHER_DISAGGREGATES,
};
use crate::error::Result;
use crate::fiscal::{self, FiscalPeriod, PeriodKind};
use crate::frame;
use crate::pipeline::context::RunContext;

const MARKER_LABEL: &str = "pivot";

/// A calendar quarter a source row contributes to, relative to its own quarter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VlcMarker {
    DenominatorLag1,
    DenominatorLag2,
    DenominatorLag3,
    Denominator,
    Numerator,
    TreatmentDenominatorLag2,
}

impl VlcMarker {
    /// Order in which marker columns are unpivoted into rows.
    pub const ALL: [VlcMarker; 6] = [
        VlcMarker::DenominatorLag1,
        VlcMarker::DenominatorLag2,
        VlcMarker::DenominatorLag3,
        VlcMarker::Denominator,
        VlcMarker::Numerator,
        VlcMarker::TreatmentDenominatorLag2,
    ];

    pub fn column(self) -> &'static str {
        match self {
            VlcMarker::DenominatorLag1 => "VLC_GP Denominator -1",
            VlcMarker::DenominatorLag2 => "VLC_GP Denominator -2",
            VlcMarker::DenominatorLag3 => "VLC_GP Denominator -3",
            VlcMarker::Denominator => "VLC_GP Denominator 0",
            VlcMarker::Numerator => "VLC_GP Numerator 0",
            VlcMarker::TreatmentDenominatorLag2 => "VLC_GP Denominator -2_",
        }
    }

    /// `(indicator, numerator_denom)` of the rows the marker applies to.
    fn source(self) -> (&'static str, &'static str) {
        match self {
            VlcMarker::DenominatorLag1
            | VlcMarker::DenominatorLag2
            | VlcMarker::DenominatorLag3
            | VlcMarker::Denominator => (PMTCT_ART, "N"),
            VlcMarker::Numerator => (TX_PVLS, "D"),
            VlcMarker::TreatmentDenominatorLag2 => (TX_CURR, "N"),
        }
    }

    fn offset_months(self) -> u32 {
        match self {
            VlcMarker::Denominator | VlcMarker::Numerator => 0,
            VlcMarker::DenominatorLag1 => 3,
            VlcMarker::DenominatorLag2 | VlcMarker::TreatmentDenominatorLag2 => 6,
            VlcMarker::DenominatorLag3 => 9,
        }
    }

    /// Calendar date the row lands on, if the marker applies to it.
    pub fn date(
        self,
        indicator: Option<&str>,
        numerator_denom: Option<&str>,
        quarter_start: Option<NaiveDate>,
    ) -> Option<NaiveDate> {
        let (source_indicator, source_role) = self.source();
        if indicator != Some(source_indicator) || numerator_denom != Some(source_role) {
            return None;
        }
        quarter_start?.checked_add_months(Months::new(self.offset_months()))
    }
}

/// Whether a result row feeds viral load coverage at all.
fn contributes(
    indicator: Option<&str>,
    numerator_denom: Option<&str>,
    standardized_disaggregate: Option<&str>,
    other_disaggregate: Option<&str>,
) -> bool {
    match (indicator, numerator_denom, standardized_disaggregate) {
        (Some(TX_PVLS), Some("N"), _) | (Some(PMTCT_ART), Some("D"), _) => false,
        (Some(PMTCT_ART), _, Some(TOTAL_NUMERATOR)) => false,
        (Some(PMTCT_ART | TX_CURR | TX_PVLS), _, _) => {
            !other_disaggregate.map_or(false, |o| VLC_EXCLUDED_OTHER_DISAGGREGATES.contains(&o))
        }
        _ => false,
    }
}

/// Add the start date of each row's quarter. Targets, cumulative and
/// malformed labels get no date.
pub fn add_calendar_date(table: DataFrame) -> Result<DataFrame> {
    let dates: Vec<Option<NaiveDate>> = frame::strings(&table, QUARTER)?
        .into_iter()
        .map(|label| label.and_then(|l| FiscalPeriod::parse(l).ok()).and_then(|p| p.start_date()))
        .collect();
    frame::set_column(table, frame::date_column(QUARTER_CALENDAR_DATE, dates))
}

/// Derive the coverage rows up to and including the current quarter.
pub fn derive(dated: &DataFrame, ctx: &RunContext) -> Result<DataFrame> {
    let mask: Vec<bool> = {
        let indicator = frame::strings(dated, INDICATOR)?;
        let role = frame::strings(dated, NUMERATOR_DENOM)?;
        let standardized = frame::strings(dated, STANDARDIZED_DISAGGREGATE)?;
        let other = frame::strings(dated, OTHER_DISAGGREGATE)?;
        let kind = frame::strings(dated, RESULTS_OR_TARGETS)?;
        kind.into_iter()
            .zip(indicator)
            .zip(role)
            .zip(standardized)
            .zip(other)
            .map(|((((kind, indicator), role), standardized), other)| {
                kind == Some(MeasureKind::Results.label()) && contributes(indicator, role, standardized, other)
            })
            .collect()
    };
    let sources = frame::filter_rows(dated, &mask)?;
    debug!(rows = sources.height(), "rows contributing to viral load coverage");

    let swap_totals = [(TOTAL_DENOMINATOR, TOTAL_NUMERATOR), (TOTAL_NUMERATOR, TOTAL_DENOMINATOR)];
    let columns: Vec<Column> = {
        let indicator = frame::strings(&sources, INDICATOR)?;
        let role = frame::strings(&sources, NUMERATOR_DENOM)?;
        let quarter_start: Vec<Option<NaiveDate>> =
            frame::dates(&sources, QUARTER_CALENDAR_DATE)?.as_date_iter().collect();
        let height = sources.height();
        let mut columns = vec![
            frame::string_column(
                STANDARDIZED_DISAGGREGATE,
                relabel(frame::strings(&sources, STANDARDIZED_DISAGGREGATE)?, &swap_totals),
            ),
            frame::string_column(DISAGGREGATE, relabel(frame::strings(&sources, DISAGGREGATE)?, &swap_totals)),
            frame::string_column(NUMERATOR_DENOM, relabel(role, &[("D", "N"), ("N", "D")])),
            frame::constant(INDICATOR, Some(TX_VL_COVERAGE), height),
            frame::constant(SOURCE_NAME, Some(DERIVED_SOURCE), height),
        ];
        for marker in VlcMarker::ALL {
            let dates = indicator
                .into_iter()
                .zip(role)
                .zip(&quarter_start)
                .map(|((indicator, role), start)| marker.date(indicator, role, *start))
                .collect();
            columns.push(frame::date_column(marker.column(), dates));
        }
        columns
    };

    let mut swapped = frame::drop_columns(&sources, &[QUARTER_CALENDAR_DATE, QUARTER, FY])?;
    for column in columns {
        swapped.with_column(column)?;
    }

    let marker_columns: Vec<&str> = VlcMarker::ALL.iter().map(|m| m.column()).collect();
    let long = frame::melt(&swapped, &marker_columns, MARKER_LABEL, QUARTER_CALENDAR_DATE)?
        .lazy()
        .drop([MARKER_LABEL])
        .filter(col(QUARTER_CALENDAR_DATE).lt_eq(lit(ctx.current_start_date)))
        .collect()?;

    let mut quarters = Vec::with_capacity(long.height());
    let mut years = Vec::with_capacity(long.height());
    for date in frame::dates(&long, QUARTER_CALENDAR_DATE)?.as_date_iter().flatten() {
        let (fiscal_year, quarter) = fiscal::date_to_period(date)?;
        quarters.push(Some(fiscal::label(fiscal_year, quarter)));
        years.push(Some(fiscal::fy_label(fiscal_year)));
    }
    let vlc = frame::set_column(long, frame::string_column(QUARTER, quarters))?;
    let vlc = frame::set_column(vlc, frame::string_column(FY, years))?;
    debug!(rows = vlc.height(), "viral load coverage rows");
    Ok(vlc)
}

/// Relabel coverage rows as their fiscal year's cumulative value.
fn as_cumulative(rows: DataFrame) -> Result<DataFrame> {
    let height = rows.height();
    let quarter = frame::string_column(
        QUARTER,
        frame::strings(&rows, FY)?
            .into_iter()
            .map(|fy| fy.map(|fy| format!("{} {}", fy, PeriodKind::Cumulative.as_str()))),
    );
    let cumulative = frame::column(&rows, VALUES)?.clone().with_name(CUMULATIVE.into());
    let mut rows = rows;
    rows.with_column(frame::constant(RESULTS_OR_TARGETS, Some(MeasureKind::Cumulative.label()), height))?;
    rows.with_column(quarter)?;
    rows.with_column(cumulative)?;
    rows.with_column(frame::float_column(RESULTS, vec![None; height]))?;
    rows.with_column(frame::constant(SOURCE_NAME, Some(DERIVED_SOURCE), height))?;
    Ok(rows)
}

/// Q4 coverage of earlier fiscal years becomes that year's cumulative.
pub fn previous_cumulative(vlc: &DataFrame, ctx: &RunContext) -> Result<DataFrame> {
    let q4 = vlc
        .clone()
        .lazy()
        .filter(
            col(RESULTS_OR_TARGETS)
                .eq(lit(MeasureKind::Results.label()))
                .and(col(FY).neq(lit(ctx.current_fy.as_str())))
                .and(col(QUARTER).str().ends_with(lit("Q4"))),
        )
        .collect()?;
    as_cumulative(q4)
}

/// Coverage of the current quarter is also the current year's cumulative.
pub fn current_cumulative(vlc: &DataFrame, ctx: &RunContext) -> Result<DataFrame> {
    let current = vlc
        .clone()
        .lazy()
        .filter(col(QUARTER_CALENDAR_DATE).eq(lit(ctx.current_start_date)))
        .collect()?;
    as_cumulative(current)
}

fn is_future(label: &str, current: &FiscalPeriod) -> bool {
    match FiscalPeriod::parse(label) {
        Ok(period) => {
            matches!(period.kind, PeriodKind::Quarter(_)) && fiscal::compare_periods(&period, current) == Ordering::Greater
        }
        Err(_) => false,
    }
}

/// Union the main table with the coverage tables, drop quarters after the
/// current one and lay the columns out in the fact table order.
pub fn remove_future(
    main: DataFrame,
    vlc: DataFrame,
    previous: DataFrame,
    current: DataFrame,
    ctx: &RunContext,
) -> Result<DataFrame> {
    let combined = frame::concat(vec![main, vlc, previous, current])?;
    let combined = frame::drop_columns(&combined, &[QUARTER_CALENDAR_DATE])?;
    let reporting = ctx.current();
    let keep: Vec<bool> = frame::strings(&combined, QUARTER)?
        .into_iter()
        .map(|label| label.map_or(true, |l| !is_future(l, &reporting)))
        .collect();
    let kept = frame::filter_rows(&combined, &keep)?;
    debug!(
        rows = kept.height(),
        dropped = combined.height() - kept.height(),
        "future quarters removed"
    );
    frame::select(&kept, FINAL_COLUMN_ORDER)
}

/// Run the whole coverage derivation against the dated main table.
pub fn apply(dated: DataFrame, ctx: &RunContext) -> Result<DataFrame> {
    let vlc = derive(&dated, ctx)?;
    let previous = previous_cumulative(&vlc, ctx)?;
    let current = current_cumulative(&vlc, ctx)?;
    remove_future(dated, vlc, previous, current, ctx)
}
