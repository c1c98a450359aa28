use chrono::NaiveDate;
use serde::Serialize;

use crate::config::RunConfig;
use crate::error::Result;
use crate::fiscal::{self, FiscalPeriod, Quarter};

/// Reporting-period facts derived once from the run configuration and shared
/// by every stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunContext {
    pub start_fiscal_year: i32,
    pub current_fiscal_year: i32,
    pub current_quarter: Quarter,
    /// Last fiscal year that receives net-new targets. Targets for the next
    /// year are already published once Q4 is reported.
    pub target_fiscal_year: i32,
    /// `"FY21"`
    pub current_fy: String,
    /// `"FY21 Q4"`
    pub current_period: String,
    pub current_start_date: NaiveDate,
}

impl RunContext {
    pub fn new(run: &RunConfig) -> Result<Self> {
        let target_fiscal_year = match run.current_quarter {
            Quarter::Q4 => run.current_fiscal_year + 1,
            Quarter::Q1 | Quarter::Q2 | Quarter::Q3 => run.current_fiscal_year,
        };
        Ok(Self {
            start_fiscal_year: run.start_fiscal_year,
            current_fiscal_year: run.current_fiscal_year,
            current_quarter: run.current_quarter,
            target_fiscal_year,
            current_fy: fiscal::fy_label(run.current_fiscal_year),
            current_period: fiscal::label(run.current_fiscal_year, run.current_quarter),
            current_start_date: fiscal::period_to_date(run.current_fiscal_year, run.current_quarter)?,
        })
    }

    pub fn current(&self) -> FiscalPeriod {
        FiscalPeriod::quarter(self.current_fiscal_year, self.current_quarter)
    }
}
