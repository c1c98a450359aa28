//! Net-new TX_CURR targets.
//!
//! The net-new target of year `Y + 1` is what has to be added on top of the
//! year `Y` result to reach the year `Y + 1` target:
//! `targets(Y + 1) - cumulative(Y)`, with a missing side counted as zero.

use polars::prelude::*;
use tracing::debug;

use crate::constants::columns::{
    CUMULATIVE, FISCAL_YEAR, INDICATOR, QTR_TARGETS, QUARTERS, STANDARDIZEDDISAGGREGATE, TARGETS,
};
use crate::constants::indicators::{TX_CURR, TX_NET_NEW};
use crate::constants::ARV_DISPENSE_DISAGGREGATE;
use crate::error::{PipelineError, Result};
use crate::frame;

/// Names of the per-year delta columns, ascending.
fn year_columns(start_fiscal_year: i32, target_fiscal_year: i32) -> Vec<String> {
    ((start_fiscal_year + 1)..=target_fiscal_year)
        .map(|year| year.to_string())
        .collect()
}

/// `measure` of rows reported in `year`, zero everywhere else.
fn in_year(measure: &str, year: i64) -> Expr {
    when(col(FISCAL_YEAR).eq(lit(year)))
        .then(col(measure).fill_null(lit(0.0)))
        .otherwise(lit(0.0))
}

/// One row per TX_CURR dimension tuple with one delta column per target year.
///
/// The dimension tuple is every column left once the fiscal year and the
/// measures are dropped; duplicate tuples are summed.
pub fn wide(main: &DataFrame, start_fiscal_year: i32, target_fiscal_year: i32) -> Result<DataFrame> {
    let names = year_columns(start_fiscal_year, target_fiscal_year);
    let deltas: Vec<Expr> = names
        .iter()
        .zip((start_fiscal_year + 1)..=target_fiscal_year)
        .map(|(name, year)| {
            let year = i64::from(year);
            (in_year(TARGETS, year) - in_year(CUMULATIVE, year - 1)).alias(name.as_str())
        })
        .collect();

    let mut measures = vec![FISCAL_YEAR, TARGETS, CUMULATIVE];
    measures.extend(QUARTERS);

    let net_new = main
        .clone()
        .lazy()
        .filter(
            col(FISCAL_YEAR)
                .gt_eq(lit(i64::from(start_fiscal_year)))
                .and(col(INDICATOR).eq(lit(TX_CURR)))
                .and(col(STANDARDIZEDDISAGGREGATE).neq_missing(lit(ARV_DISPENSE_DISAGGREGATE)))
                .and(col(TARGETS).is_not_null().or(col(CUMULATIVE).is_not_null())),
        )
        .with_column(lit(TX_NET_NEW).alias(INDICATOR))
        .with_columns(deltas)
        .drop(measures)
        .collect()?;
    debug!(rows = net_new.height(), "TX_CURR rows feeding net-new targets");

    let sums: Vec<&str> = names.iter().map(String::as_str).collect();
    frame::group_sum(&net_new, &sums)
}

/// Turn the per-year delta columns into one TX_NET_NEW target row per year.
///
/// Zero and missing deltas are dropped. Each surviving target is broadcast to
/// the four quarterly target columns.
pub fn fiscal_year_rows(wide: DataFrame, start_fiscal_year: i32, target_fiscal_year: i32) -> Result<DataFrame> {
    let names = year_columns(start_fiscal_year, target_fiscal_year);
    if names.is_empty() {
        let mut empty = wide.clear();
        empty.with_column(frame::int_column(FISCAL_YEAR, Vec::new()))?;
        for name in std::iter::once(TARGETS).chain(QTR_TARGETS) {
            empty.with_column(frame::float_column(name, Vec::new()))?;
        }
        return Ok(empty);
    }
    let value_vars: Vec<&str> = names.iter().map(String::as_str).collect();
    let long = frame::melt(&wide, &value_vars, FISCAL_YEAR, TARGETS)?;

    let years = frame::strings(&long, FISCAL_YEAR)?
        .into_iter()
        .enumerate()
        .map(|(row, label)| match label {
            Some(label) => label.parse::<i64>().map(Some).map_err(|_| PipelineError::TypeCoercion {
                table: "net new targets".to_string(),
                column: FISCAL_YEAR.to_string(),
                row,
                value: label.to_string(),
            }),
            None => Ok(None),
        })
        .collect::<Result<Vec<_>>>()?;
    let long = frame::set_column(long, frame::int_column(FISCAL_YEAR, years))?;

    let broadcast: Vec<Expr> = QTR_TARGETS.iter().map(|name| col(TARGETS).alias(*name)).collect();
    let rows = long
        .lazy()
        .filter(col(TARGETS).is_not_null().and(col(TARGETS).neq(lit(0.0))))
        .with_columns(broadcast)
        .collect()?;
    debug!(rows = rows.height(), "net-new target rows");
    Ok(rows)
}
