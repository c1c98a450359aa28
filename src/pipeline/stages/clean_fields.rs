//! Field cleaning of the long table.
//!
//! Drops empty and meaningless zero rows, rebuilds the period label, re-widens
//! the measure kinds into named columns and derives the categorical groupings
//! used by the dashboards (index testing step, community vs facility, key
//! population, funding agency).

use polars::prelude::*;
use tracing::{debug, warn};

use crate::constants::columns::{
    COMMUNITY_FACILITY, COUNTRYNAME, CUMULATIVE, DISAGGREGATE, FISCAL_YEAR, FUNDINGAGENCY, FY, INDEX,
    KEY_POPS, MODALITY, OPERATINGUNIT, OTHERDISAGGREGATE, QTR_RUNNING_CUMULATIVE, QTR_TARGETS,
    QUARTER, RESULTS, RESULTS_OR_TARGETS, RUNNING_CUMULATIVE, STANDARDIZEDDISAGGREGATE, STATUSHIV,
    TARGETS, TARGETS_FOR_Q_ACH, VALUES,
};
use crate::constants::{ERROR_SENTINEL, GEOGRAPHY_ABBREVIATIONS, MODALITY_LABELS};
use crate::error::Result;
use crate::fiscal::{self, FiscalPeriod, Quarter};
use crate::frame;
use crate::metrics::StageMetrics;

/// The kind of measure a long row carries, i.e. the `Results or Targets` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureKind {
    Results,
    Targets,
    Cumulative,
    RunningCumulative,
    QuarterlyTargets,
}

impl MeasureKind {
    pub const ALL: [MeasureKind; 5] = [
        MeasureKind::Results,
        MeasureKind::Targets,
        MeasureKind::Cumulative,
        MeasureKind::RunningCumulative,
        MeasureKind::QuarterlyTargets,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MeasureKind::Results => "Results",
            MeasureKind::Targets => "Targets",
            MeasureKind::Cumulative => "Cumulative",
            MeasureKind::RunningCumulative => RUNNING_CUMULATIVE,
            MeasureKind::QuarterlyTargets => TARGETS_FOR_Q_ACH,
        }
    }

    /// Column the kind's values are re-widened into.
    pub fn column(self) -> &'static str {
        match self {
            MeasureKind::Results => RESULTS,
            MeasureKind::Targets => TARGETS,
            MeasureKind::Cumulative => CUMULATIVE,
            MeasureKind::RunningCumulative => RUNNING_CUMULATIVE,
            MeasureKind::QuarterlyTargets => TARGETS_FOR_Q_ACH,
        }
    }
}

/// `Results or Targets` text for a melted measure name: the part after `|`
/// when there is one, otherwise decided by the bare column name.
fn measure_kind_label(measure: &str) -> &str {
    match measure.split_once('|') {
        Some((_, suffix)) => suffix,
        None => match measure {
            "cumulative" => MeasureKind::Cumulative.label(),
            "targets" => MeasureKind::Targets.label(),
            _ => MeasureKind::Results.label(),
        },
    }
}

/// Period label for a melted measure name of a row in `fiscal_year`.
fn period_label(measure: &str, fiscal_year: Option<i64>) -> String {
    let prefix = measure.split_once('|').map_or(measure, |(prefix, _)| prefix);
    let Some(fiscal_year) = fiscal_year.and_then(|fy| i32::try_from(fy).ok()) else {
        return ERROR_SENTINEL.to_string();
    };
    let period = match prefix {
        "targets" => Some(FiscalPeriod::targets(fiscal_year)),
        "cumulative" => Some(FiscalPeriod::cumulative(fiscal_year)),
        other => other
            .strip_prefix("qtr")
            .and_then(|rest| rest.chars().next())
            .and_then(|digit| digit.to_digit(10))
            .and_then(|n| Quarter::from_number(n).ok())
            .map(|quarter| FiscalPeriod::quarter(fiscal_year, quarter)),
    };
    period.map_or_else(|| ERROR_SENTINEL.to_string(), |p| p.label())
}

/// Step of the index testing cascade a row reports on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexTestingStep {
    Contacts,
    Accepted,
    Offered,
    PositiveAtEntry,
    TestedPositive,
    TestedNegative,
}

impl IndexTestingStep {
    pub fn classify(
        standardized_disaggregate: Option<&str>,
        other_disaggregate: Option<&str>,
        status_hiv: Option<&str>,
    ) -> Option<Self> {
        match (standardized_disaggregate, other_disaggregate, status_hiv) {
            (Some("3:Age Aggregated/Sex/Contacts"), _, _) => Some(IndexTestingStep::Contacts),
            (Some("2:Age/Sex/IndexCasesAccepted"), _, _) => Some(IndexTestingStep::Accepted),
            (Some("1:Age/Sex/IndexCasesOffered"), _, _) => Some(IndexTestingStep::Offered),
            (Some("4:Age/Sex/Result"), Some("Known at Entry"), _) => Some(IndexTestingStep::PositiveAtEntry),
            (Some("4:Age/Sex/Result"), Some("Newly Identified"), Some("Positive")) => {
                Some(IndexTestingStep::TestedPositive)
            }
            (Some("4:Age/Sex/Result"), Some("Newly Identified"), Some("Negative")) => {
                Some(IndexTestingStep::TestedNegative)
            }
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            IndexTestingStep::Contacts => "Contacts",
            IndexTestingStep::Accepted => "Accepted",
            IndexTestingStep::Offered => "Offered",
            IndexTestingStep::PositiveAtEntry => "Not Tested - positive at entry",
            IndexTestingStep::TestedPositive => "Tested - positive",
            IndexTestingStep::TestedNegative => "Tested - negative",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceSetting {
    Community,
    Facility,
}

impl ServiceSetting {
    pub fn classify(disaggregate: Option<&str>) -> Option<Self> {
        match disaggregate {
            Some(d) if d.contains("IndexMod/") => Some(ServiceSetting::Community),
            Some(d) if d.contains("Index/") => Some(ServiceSetting::Facility),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ServiceSetting::Community => "Community",
            ServiceSetting::Facility => "Facility",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPopulation {
    Msm,
    Fsw,
    Pwid,
    PeopleInPrisons,
    Transgender,
    Other,
}

impl KeyPopulation {
    pub fn classify(other_disaggregate: Option<&str>) -> Option<Self> {
        let value = other_disaggregate?;
        match value {
            v if v.contains("MSM") => Some(KeyPopulation::Msm),
            v if v.contains("FSW") => Some(KeyPopulation::Fsw),
            v if v.contains("PWID") => Some(KeyPopulation::Pwid),
            v if v.contains("People in prisons") => Some(KeyPopulation::PeopleInPrisons),
            v if v.contains("TG") => Some(KeyPopulation::Transgender),
            "Other Key Populations" => Some(KeyPopulation::Other),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            KeyPopulation::Msm => "MSM",
            KeyPopulation::Fsw => "FSW",
            KeyPopulation::Pwid => "PWID",
            KeyPopulation::PeopleInPrisons => "People in prisons",
            KeyPopulation::Transgender => "TG",
            KeyPopulation::Other => "Other key populations",
        }
    }
}

fn normalize_funding_agency(agency: &str) -> &str {
    match agency {
        "PC" => "Peace Corps",
        a if a.contains("CDC") => "CDC",
        a if a.contains("HRSA") => "HRSA",
        a if a.contains("State") => "State Dept.",
        other => other,
    }
}

/// Measures whose zero values carry no information.
fn zero_droppable_measures() -> Vec<&'static str> {
    let mut measures = vec![TARGETS, CUMULATIVE];
    measures.extend(QTR_TARGETS);
    measures.extend(QTR_RUNNING_CUMULATIVE);
    measures
}

/// Replace values found in `labels`, keeping the rest.
pub(super) fn relabel<'a>(values: &'a StringChunked, labels: &[(&'static str, &'static str)]) -> Vec<Option<&'a str>> {
    values
        .into_iter()
        .map(|value| {
            value.map(|v| labels.iter().find(|(from, _)| *from == v).map_or(v, |(_, to)| *to))
        })
        .collect()
}

pub fn apply(long: DataFrame) -> Result<DataFrame> {
    let droppable = zero_droppable_measures();
    let keep: Vec<bool> = frame::floats(&long, VALUES)?
        .into_iter()
        .zip(frame::strings(&long, QUARTER)?)
        .map(|(value, measure)| match value {
            None => false,
            Some(v) => !(v == 0.0 && measure.map_or(false, |m| droppable.contains(&m))),
        })
        .collect();
    let mut table = frame::filter_rows(&long, &keep)?;
    debug!(rows = table.height(), "long rows after empty and zero filters");

    let (kinds, fy, periods) = {
        let measure = frame::strings(&table, QUARTER)?;
        let fiscal_year = frame::ints(&table, FISCAL_YEAR)?;
        let kinds = frame::string_column(
            RESULTS_OR_TARGETS,
            measure.into_iter().map(|m| Some(m.map_or("Results", measure_kind_label))),
        );
        let fy = frame::string_column(
            FY,
            fiscal_year
                .into_iter()
                .map(|fy| fy.and_then(|fy| i32::try_from(fy).ok()).map(fiscal::fy_label)),
        );
        let periods: Vec<String> = measure
            .into_iter()
            .zip(fiscal_year)
            .map(|(m, fy)| period_label(m.unwrap_or_default(), fy))
            .collect();
        (kinds, fy, periods)
    };
    let sentinel_rows = periods.iter().filter(|p| *p == ERROR_SENTINEL).count();
    if sentinel_rows > 0 {
        warn!(rows = sentinel_rows, "period labels could not be rebuilt, marked {}", ERROR_SENTINEL);
        StageMetrics::record_sentinel_rows(sentinel_rows);
    }
    table.with_column(kinds)?;
    table.with_column(fy)?;
    table.with_column(frame::string_column(QUARTER, periods.into_iter().map(Some)))?;

    // Re-widen: each kind gets a column holding the value on its own rows.
    let widened: Vec<Expr> = MeasureKind::ALL
        .iter()
        .map(|kind| {
            when(col(RESULTS_OR_TARGETS).eq(lit(kind.label())))
                .then(col(VALUES))
                .otherwise(lit(NULL).cast(DataType::Float64))
                .alias(kind.column())
        })
        .collect();
    let degenerate = col(RESULTS_OR_TARGETS)
        .eq(lit(RUNNING_CUMULATIVE))
        .and(col(VALUES).eq(lit(0.0)))
        .and(col(CUMULATIVE).is_null())
        .and(col(RESULTS).is_null());
    let table = table
        .lazy()
        .with_columns(widened)
        .filter(degenerate.not())
        .drop([FISCAL_YEAR])
        .collect()?;

    let derived = {
        let standardized = frame::strings(&table, STANDARDIZEDDISAGGREGATE)?;
        let other = frame::strings(&table, OTHERDISAGGREGATE)?;
        let status = frame::strings(&table, STATUSHIV)?;
        let disaggregate = frame::strings(&table, DISAGGREGATE)?;
        vec![
            frame::string_column(
                OPERATINGUNIT,
                relabel(frame::strings(&table, OPERATINGUNIT)?, GEOGRAPHY_ABBREVIATIONS),
            ),
            frame::string_column(
                COUNTRYNAME,
                relabel(frame::strings(&table, COUNTRYNAME)?, GEOGRAPHY_ABBREVIATIONS),
            ),
            frame::string_column(MODALITY, relabel(frame::strings(&table, MODALITY)?, MODALITY_LABELS)),
            frame::string_column(
                INDEX,
                standardized
                    .into_iter()
                    .zip(other)
                    .zip(status)
                    .map(|((s, o), h)| IndexTestingStep::classify(s, o, h).map(IndexTestingStep::label)),
            ),
            frame::string_column(
                COMMUNITY_FACILITY,
                disaggregate
                    .into_iter()
                    .map(|d| ServiceSetting::classify(d).map(ServiceSetting::label)),
            ),
            frame::string_column(
                KEY_POPS,
                other
                    .into_iter()
                    .map(|o| KeyPopulation::classify(o).map(KeyPopulation::label)),
            ),
            frame::string_column(
                FUNDINGAGENCY,
                frame::strings(&table, FUNDINGAGENCY)?
                    .into_iter()
                    .map(|a| a.map(normalize_funding_agency)),
            ),
        ]
    };

    let mut table = table;
    for column in derived {
        table.with_column(column)?;
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::test_support::*;

    fn long(measures: &[&str], values: &[Option<f64>]) -> DataFrame {
        let n = measures.len();
        let measures: Vec<Option<&str>> = measures.iter().copied().map(Some).collect();
        frame(vec![
            strs(OPERATINGUNIT, &vec![Some("Democratic Republic of the Congo"); n]),
            strs(COUNTRYNAME, &vec![Some("Kenya"); n]),
            strs(FUNDINGAGENCY, &vec![Some("HHS/CDC"); n]),
            strs(MODALITY, &vec![Some("IndexMod"); n]),
            strs(STANDARDIZEDDISAGGREGATE, &vec![Some("4:Age/Sex/Result"); n]),
            strs(DISAGGREGATE, &vec![Some("IndexMod/Age/Sex/Result"); n]),
            strs(OTHERDISAGGREGATE, &vec![Some("Newly Identified"); n]),
            strs(STATUSHIV, &vec![Some("Positive"); n]),
            i64s(FISCAL_YEAR, &vec![Some(2021); n]),
            strs(QUARTER, &measures),
            f64s(VALUES, values),
        ])
    }

    fn first(df: &DataFrame, name: &str) -> Option<String> {
        str_values(df, name).swap_remove(0)
    }

    fn texts(df: &DataFrame, name: &str) -> Vec<String> {
        str_values(df, name).into_iter().flatten().collect()
    }

    #[test]
    fn test_zero_targets_dropped_but_zero_results_kept() {
        let out = apply(long(&["targets", "qtr2"], &[Some(0.0), Some(0.0)])).unwrap();
        assert_eq!(out.height(), 1);
        assert_eq!(first(&out, QUARTER).as_deref(), Some("FY21 Q2"));
        assert_eq!(first(&out, RESULTS_OR_TARGETS).as_deref(), Some("Results"));
        assert_eq!(f64_values(&out, RESULTS), vec![Some(0.0)]);
    }

    #[test]
    fn test_null_values_are_dropped() {
        let out = apply(long(&["qtr1", "cumulative"], &[None, Some(4.0)])).unwrap();
        assert_eq!(out.height(), 1);
        assert_eq!(first(&out, QUARTER).as_deref(), Some("FY21 Cumulative"));
        assert_eq!(f64_values(&out, CUMULATIVE), vec![Some(4.0)]);
        assert_eq!(f64_values(&out, RESULTS), vec![None]);
    }

    #[test]
    fn test_measure_kinds_are_rewidened() {
        let out = apply(long(
            &["qtr3|Targets (for Q. Ach)", "qtr3|Running Cumulative", "targets"],
            &[Some(5.0), Some(7.0), Some(20.0)],
        ))
        .unwrap();
        assert_eq!(
            texts(&out, RESULTS_OR_TARGETS),
            vec!["Targets (for Q. Ach)", "Running Cumulative", "Targets"]
        );
        assert_eq!(texts(&out, QUARTER), vec!["FY21 Q3", "FY21 Q3", "FY21 Targets"]);
        assert_eq!(f64_values(&out, TARGETS_FOR_Q_ACH), vec![Some(5.0), None, None]);
        assert_eq!(f64_values(&out, RUNNING_CUMULATIVE), vec![None, Some(7.0), None]);
        assert_eq!(f64_values(&out, TARGETS), vec![None, None, Some(20.0)]);
        assert!(out.column(FISCAL_YEAR).is_err());
    }

    #[test]
    fn test_zero_running_cumulative_rows_are_dropped() {
        let out = apply(long(
            &["qtr2|Running Cumulative", "qtr2"],
            &[Some(0.0), Some(0.0)],
        ))
        .unwrap();
        assert_eq!(texts(&out, RESULTS_OR_TARGETS), vec!["Results"]);
    }

    #[test]
    fn test_derived_groupings() {
        let out = apply(long(&["qtr1"], &[Some(3.0)])).unwrap();
        assert_eq!(first(&out, OPERATINGUNIT).as_deref(), Some("DRC"));
        assert_eq!(first(&out, COUNTRYNAME).as_deref(), Some("Kenya"));
        assert_eq!(first(&out, MODALITY).as_deref(), Some("Index (Community)"));
        assert_eq!(first(&out, FUNDINGAGENCY).as_deref(), Some("CDC"));
        assert_eq!(first(&out, INDEX).as_deref(), Some("Tested - positive"));
        assert_eq!(first(&out, COMMUNITY_FACILITY).as_deref(), Some("Community"));
        assert_eq!(first(&out, KEY_POPS), None);
        assert_eq!(first(&out, FY).as_deref(), Some("FY21"));
    }

    #[test]
    fn test_first_matching_rule_wins() {
        assert_eq!(KeyPopulation::classify(Some("MSM, FSW")), Some(KeyPopulation::Msm));
        assert_eq!(KeyPopulation::classify(Some("Other Key Populations")), Some(KeyPopulation::Other));
        assert_eq!(KeyPopulation::classify(None), None);
        assert_eq!(ServiceSetting::classify(Some("IndexMod/Index/")), Some(ServiceSetting::Community));
        assert_eq!(normalize_funding_agency("PC"), "Peace Corps");
        assert_eq!(normalize_funding_agency("State/PRM"), "State Dept.");
        assert_eq!(normalize_funding_agency("USAID"), "USAID");
        assert_eq!(
            IndexTestingStep::classify(Some("4:Age/Sex/Result"), Some("Known at Entry"), Some("Positive")),
            Some(IndexTestingStep::PositiveAtEntry)
        );
    }

    #[test]
    fn test_missing_fiscal_year_yields_sentinel() {
        assert_eq!(period_label("qtr1", None), ERROR_SENTINEL);
        assert_eq!(period_label("qtr9", Some(2021)), ERROR_SENTINEL);
        assert_eq!(period_label("qtr4|Running Cumulative", Some(2020)), "FY20 Q4");
    }
}
