//! Fiscal calendar arithmetic.
//!
//! A fiscal year starts on October 1 of the previous calendar year, so FY21 Q1
//! begins on 2020-10-01 and FY21 Q4 begins on 2021-07-01. Period labels have the
//! canonical shape `"FY21 Q3"`, `"FY21 Targets"` or `"FY21 Cumulative"`.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Quarter {
    Q1,
    Q2,
    Q3,
    Q4,
}

impl Quarter {
    pub const ALL: [Quarter; 4] = [Quarter::Q1, Quarter::Q2, Quarter::Q3, Quarter::Q4];

    pub fn number(self) -> u32 {
        match self {
            Quarter::Q1 => 1,
            Quarter::Q2 => 2,
            Quarter::Q3 => 3,
            Quarter::Q4 => 4,
        }
    }

    pub fn from_number(number: u32) -> Result<Self> {
        match number {
            1 => Ok(Quarter::Q1),
            2 => Ok(Quarter::Q2),
            3 => Ok(Quarter::Q3),
            4 => Ok(Quarter::Q4),
            other => Err(PipelineError::InvalidPeriod(format!("quarter number {}", other))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Quarter::Q1 => "Q1",
            Quarter::Q2 => "Q2",
            Quarter::Q3 => "Q3",
            Quarter::Q4 => "Q4",
        }
    }

    /// Calendar month in which the quarter starts.
    pub fn start_month(self) -> u32 {
        match self {
            Quarter::Q1 => 10,
            Quarter::Q2 => 1,
            Quarter::Q3 => 4,
            Quarter::Q4 => 7,
        }
    }

    fn from_start_month(month: u32) -> Result<Self> {
        match month {
            10 => Ok(Quarter::Q1),
            1 => Ok(Quarter::Q2),
            4 => Ok(Quarter::Q3),
            7 => Ok(Quarter::Q4),
            other => Err(PipelineError::InvalidPeriod(format!("invalid month [{}]", other))),
        }
    }
}

impl FromStr for Quarter {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Q1" => Ok(Quarter::Q1),
            "Q2" => Ok(Quarter::Q2),
            "Q3" => Ok(Quarter::Q3),
            "Q4" => Ok(Quarter::Q4),
            other => Err(PipelineError::InvalidPeriod(format!("invalid quarter [{}]", other))),
        }
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The part of a period label after the fiscal year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeriodKind {
    Quarter(Quarter),
    Targets,
    Cumulative,
}

impl PeriodKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PeriodKind::Quarter(q) => q.as_str(),
            PeriodKind::Targets => "Targets",
            PeriodKind::Cumulative => "Cumulative",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FiscalPeriod {
    pub fiscal_year: i32,
    pub kind: PeriodKind,
}

impl FiscalPeriod {
    pub fn quarter(fiscal_year: i32, quarter: Quarter) -> Self {
        Self {
            fiscal_year,
            kind: PeriodKind::Quarter(quarter),
        }
    }

    pub fn targets(fiscal_year: i32) -> Self {
        Self {
            fiscal_year,
            kind: PeriodKind::Targets,
        }
    }

    pub fn cumulative(fiscal_year: i32) -> Self {
        Self {
            fiscal_year,
            kind: PeriodKind::Cumulative,
        }
    }

    /// Parse a canonical `"FYxx <kind>"` label.
    pub fn parse(label: &str) -> Result<Self> {
        let unrecognized = || PipelineError::InvalidPeriod(format!("unrecognized period label [{}]", label));
        let (year, kind) = label
            .strip_prefix("FY")
            .and_then(|rest| rest.split_once(' '))
            .ok_or_else(unrecognized)?;
        if year.len() != 2 || !year.bytes().all(|b| b.is_ascii_digit()) {
            return Err(unrecognized());
        }
        let yy: i32 = year.parse().map_err(|_| unrecognized())?;
        let kind = match kind {
            "Targets" => PeriodKind::Targets,
            "Cumulative" => PeriodKind::Cumulative,
            quarter => PeriodKind::Quarter(quarter.parse()?),
        };
        Ok(Self {
            fiscal_year: 2000 + yy,
            kind,
        })
    }

    pub fn label(&self) -> String {
        format!("{} {}", fy_label(self.fiscal_year), self.kind.as_str())
    }

    /// Start date of a quarter period; `None` for Targets/Cumulative.
    pub fn start_date(&self) -> Option<NaiveDate> {
        match self.kind {
            PeriodKind::Quarter(q) => period_to_date(self.fiscal_year, q).ok(),
            PeriodKind::Targets | PeriodKind::Cumulative => None,
        }
    }
}

impl fmt::Display for FiscalPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// First calendar day of `quarter` in `fiscal_year`.
pub fn period_to_date(fiscal_year: i32, quarter: Quarter) -> Result<NaiveDate> {
    let year = match quarter {
        Quarter::Q1 => fiscal_year - 1,
        Quarter::Q2 | Quarter::Q3 | Quarter::Q4 => fiscal_year,
    };
    NaiveDate::from_ymd_opt(year, quarter.start_month(), 1).ok_or_else(|| {
        PipelineError::InvalidPeriod(format!("fiscal year {} is out of range", fiscal_year))
    })
}

/// Inverse of [`period_to_date`]. Only the month is inspected.
pub fn date_to_period(date: NaiveDate) -> Result<(i32, Quarter)> {
    let quarter = Quarter::from_start_month(date.month())?;
    let fiscal_year = match quarter {
        Quarter::Q1 => date.year() + 1,
        Quarter::Q2 | Quarter::Q3 | Quarter::Q4 => date.year(),
    };
    Ok((fiscal_year, quarter))
}

/// `"FY21"` for 2021.
pub fn fy_label(fiscal_year: i32) -> String {
    format!("FY{:02}", fiscal_year.rem_euclid(100))
}

/// `"FY21 Q3"` for (2021, Q3).
pub fn label(fiscal_year: i32, quarter: Quarter) -> String {
    FiscalPeriod::quarter(fiscal_year, quarter).label()
}

pub fn label_for_date(date: NaiveDate) -> Result<String> {
    let (fiscal_year, quarter) = date_to_period(date)?;
    Ok(label(fiscal_year, quarter))
}

/// Order two period labels by fiscal year, then by quarter.
///
/// Targets and Cumulative labels carry no position inside their year: they
/// compare equal to any label of the same fiscal year.
pub fn compare(a: &str, b: &str) -> Result<Ordering> {
    let a = FiscalPeriod::parse(a)?;
    let b = FiscalPeriod::parse(b)?;
    Ok(compare_periods(&a, &b))
}

pub fn compare_periods(a: &FiscalPeriod, b: &FiscalPeriod) -> Ordering {
    match a.fiscal_year.cmp(&b.fiscal_year) {
        Ordering::Equal => match (a.kind, b.kind) {
            (PeriodKind::Quarter(qa), PeriodKind::Quarter(qb)) => qa.cmp(&qb),
            _ => Ordering::Equal,
        },
        other => other,
    }
}
