mod common;

use std::fs;
use std::path::Path;

use common::Row;
use msd_pipeline::config::{Config, RunConfig};
use msd_pipeline::fiscal::Quarter;
use msd_pipeline::frame;
use msd_pipeline::ingest::schemas;
use msd_pipeline::output;
use msd_pipeline::pipeline::{self, PipelineInputs};
use polars::prelude::DataFrame;
use tempfile::TempDir;

const SITE_ROWS: &[Row<'static>] = &[
    &[
        ("operatingunit", "Kenya"),
        ("mech_code", "81001"),
        ("indicator", "TX_CURR"),
        ("standardizeddisaggregate", "Age/Sex/HIVStatus"),
        ("fiscal_year", "2020"),
        ("targets", "50"),
        ("cumulative", "40"),
        ("qtr4", "40"),
    ],
    &[
        ("operatingunit", "Kenya"),
        ("mech_code", "81001"),
        ("indicator", "TX_CURR"),
        ("standardizeddisaggregate", "Age/Sex/HIVStatus"),
        ("fiscal_year", "2021"),
        ("targets", "70"),
    ],
];

fn run_config(renamed: bool) -> RunConfig {
    RunConfig {
        data_version: "integration".to_string(),
        start_fiscal_year: 2020,
        current_fiscal_year: 2021,
        current_quarter: Quarter::Q4,
        produce_renamed_output_schema: renamed,
    }
}

fn rows_where(table: &DataFrame, filters: &[(&str, &str)]) -> Vec<usize> {
    (0..table.height())
        .filter(|row| {
            filters
                .iter()
                .all(|(column, value)| text(table, column, *row).as_deref() == Some(*value))
        })
        .collect()
}

fn text(table: &DataFrame, column: &str, row: usize) -> Option<String> {
    frame::strings(table, column).unwrap().get(row).map(str::to_string)
}

fn number(table: &DataFrame, column: &str, row: usize) -> Option<f64> {
    frame::floats(table, column).unwrap().get(row)
}

#[test]
fn test_net_new_target_end_to_end() {
    let inputs = common::inputs(SITE_ROWS);
    let fact = pipeline::transform(&run_config(false), &inputs).unwrap();

    let hits = rows_where(
        &fact,
        &[
            ("indicator", "TX_NET_NEW"),
            ("quarter", "FY21 Targets"),
            ("Results or Targets", "Targets"),
        ],
    );
    assert_eq!(hits.len(), 1);
    assert_eq!(number(&fact, "values", hits[0]), Some(30.0));
    assert_eq!(text(&fact, "FY", hits[0]).as_deref(), Some("FY21"));

    // FY22 targets and FY21 cumulative are both absent, so no FY22 row.
    assert!(rows_where(&fact, &[("indicator", "TX_NET_NEW"), ("quarter", "FY22 Targets")]).is_empty());
}

#[test]
fn test_results_rows_keep_their_quarter_labels() {
    let inputs = common::inputs(SITE_ROWS);
    let fact = pipeline::transform(&run_config(false), &inputs).unwrap();

    let q4 = rows_where(
        &fact,
        &[
            ("indicator", "TX_CURR"),
            ("quarter", "FY20 Q4"),
            ("Results or Targets", "Results"),
        ],
    );
    assert_eq!(q4.len(), 1);
    assert_eq!(number(&fact, "results", q4[0]), Some(40.0));
    assert_eq!(text(&fact, "Current Quarter", q4[0]).as_deref(), Some("FY21 Q4"));
}

#[test]
fn test_renamed_schema_has_store_columns() {
    let inputs = common::inputs(SITE_ROWS);
    let fact = pipeline::transform(&run_config(true), &inputs).unwrap();
    let names = frame::column_names(&fact);
    assert_eq!(names[0], "fy");
    assert!(names.iter().any(|name| name == "exclude_due_to_known_issue"));
    assert!(!names.iter().any(|name| name == "Results or Targets"));
}

#[test]
fn test_empty_site_extract_list_is_rejected() {
    let mut inputs = common::inputs(SITE_ROWS);
    inputs.site_extracts.clear();
    assert!(pipeline::transform(&run_config(false), &inputs).is_err());
}

const COVERAGE_ROWS: &[Row<'static>] = &[
    &[
        ("operatingunit", "Kenya"),
        ("mech_code", "81001"),
        ("indicator", "PMTCT_ART"),
        ("numeratordenom", "N"),
        ("standardizeddisaggregate", "Age/NewExistingArt/Sex/HIVStatus"),
        ("disaggregate", "Age/NewExistingArt/Sex/HIVStatus"),
        ("fiscal_year", "2021"),
        ("qtr2", "10"),
    ],
    &[
        ("operatingunit", "Kenya"),
        ("mech_code", "81001"),
        ("indicator", "TX_PVLS"),
        ("numeratordenom", "D"),
        ("standardizeddisaggregate", "Total Denominator"),
        ("disaggregate", "Total Denominator"),
        ("fiscal_year", "2021"),
        ("qtr4", "5"),
    ],
    &[
        ("operatingunit", "Kenya"),
        ("mech_code", "81001"),
        ("indicator", "TX_PVLS"),
        ("numeratordenom", "D"),
        ("standardizeddisaggregate", "Total Denominator"),
        ("disaggregate", "Total Denominator"),
        ("fiscal_year", "2020"),
        ("qtr4", "7"),
    ],
];

fn coverage(fact: &DataFrame, filters: &[(&str, &str)]) -> Vec<(String, Option<f64>)> {
    let mut filters = filters.to_vec();
    filters.push(("indicator", "TX_VL_COVERAGE"));
    let mut rows: Vec<(String, Option<f64>)> = rows_where(fact, &filters)
        .into_iter()
        .map(|row| (text(fact, "quarter", row).unwrap_or_default(), number(fact, "values", row)))
        .collect();
    rows.sort_by(|a, b| a.0.cmp(&b.0));
    rows
}

#[test]
fn test_viral_load_coverage_end_to_end() {
    let inputs = common::inputs(COVERAGE_ROWS);
    let fact = pipeline::transform(&run_config(false), &inputs).unwrap();

    // PMTCT_ART numerators spread forward as denominators; the FY22 Q1 copy
    // lies after the reporting quarter and is dropped.
    assert_eq!(
        coverage(&fact, &[("numerator_denom", "D"), ("Results or Targets", "Results")]),
        vec![
            ("FY21 Q2".to_string(), Some(10.0)),
            ("FY21 Q3".to_string(), Some(10.0)),
            ("FY21 Q4".to_string(), Some(10.0)),
        ]
    );
    assert!(rows_where(&fact, &[("indicator", "TX_VL_COVERAGE"), ("quarter", "FY22 Q1")]).is_empty());

    // TX_PVLS denominators become coverage numerators.
    assert_eq!(
        coverage(
            &fact,
            &[
                ("numerator_denom", "N"),
                ("standardized_disaggregate", "Total Numerator"),
                ("Results or Targets", "Results"),
            ]
        ),
        vec![("FY20 Q4".to_string(), Some(7.0)), ("FY21 Q4".to_string(), Some(5.0))]
    );

    let cumulative: Vec<(String, String, Option<f64>)> =
        rows_where(&fact, &[("indicator", "TX_VL_COVERAGE"), ("Results or Targets", "Cumulative")])
            .into_iter()
            .map(|row| {
                (
                    text(&fact, "quarter", row).unwrap_or_default(),
                    text(&fact, "numerator_denom", row).unwrap_or_default(),
                    number(&fact, "cumulative", row),
                )
            })
            .collect();
    assert_eq!(cumulative.len(), 3);
    assert!(cumulative.contains(&("FY20 Cumulative".to_string(), "N".to_string(), Some(7.0))));
    assert!(cumulative.contains(&("FY21 Cumulative".to_string(), "D".to_string(), Some(10.0))));
    assert!(cumulative.contains(&("FY21 Cumulative".to_string(), "N".to_string(), Some(5.0))));

    assert_eq!(rows_where(&fact, &[("indicator", "TX_VL_COVERAGE")]).len(), 8);
    for row in rows_where(&fact, &[("indicator", "TX_VL_COVERAGE")]) {
        assert_eq!(text(&fact, "source_name", row).as_deref(), Some("Derived"));
    }
}

fn write_inputs(dir: &Path) {
    let write = |name: &str, text: String| fs::write(dir.join(name), text).unwrap();
    write("ref.csv", common::csv_text(&schemas::REFERENCE_TABLE, &[]));
    write(
        "partner_type.csv",
        common::csv_text(
            &schemas::PARTNER_TYPE_TABLE,
            &[&[("Mechanism ID", "81001"), ("Partner Type", "Local"), ("G2G", "No")]],
        ),
    );
    write("known_issues.csv", common::csv_text(&schemas::KNOWN_ISSUES_TABLE, &[]));
    write("site.csv", common::csv_text(&schemas::SITE_EXTRACT, SITE_ROWS));
    write("nat_subnat.csv", common::csv_text(&schemas::NAT_SUBNAT_EXTRACT, &[]));
}

fn write_config(dir: &Path) -> std::path::PathBuf {
    let config = format!(
        r#"
[run]
data_version = "file-run"
start_fiscal_year = 2020
current_fiscal_year = 2021
current_quarter = "Q4"

[files]
base_directory = "{}"
ref_table = {{ path = "ref.csv" }}
partner_type_table = {{ path = "partner_type.csv" }}
known_issues_table = {{ path = "known_issues.csv" }}
psnu_files = [ {{ path = "site.csv" }} ]
nat_subnat_file = {{ path = "nat_subnat.csv" }}
"#,
        dir.display()
    );
    let path = dir.join("msd.toml");
    fs::write(&path, config).unwrap();
    path
}

#[test]
fn test_file_based_run_is_deterministic() {
    let dir = TempDir::new().unwrap();
    write_inputs(dir.path());
    let config = Config::load(write_config(dir.path())).unwrap();

    let inputs = PipelineInputs::from_locators(&config.files);
    let first = pipeline::run(&config.run, &inputs).unwrap();
    let second = pipeline::run(&config.run, &inputs).unwrap();

    let first_digest = output::write_file(&first.table, &dir.path().join("fact_1.csv")).unwrap();
    let second_digest = output::write_file(&second.table, &dir.path().join("fact_2.csv")).unwrap();
    assert_eq!(first_digest, second_digest);
    assert!(first_digest.rows > 0);

    let partner = rows_where(&first.table, &[("Partner Type", "Local")]);
    assert_eq!(partner.len(), first.table.height());

    let written = fs::read_to_string(dir.path().join("fact_1.csv")).unwrap();
    assert!(written.starts_with("FY,quarter,"));
    assert!(written.contains("TX_NET_NEW"));
}

#[test]
fn test_missing_input_file_fails() {
    let dir = TempDir::new().unwrap();
    write_inputs(dir.path());
    fs::remove_file(dir.path().join("site.csv")).unwrap();
    let config = Config::load(write_config(dir.path())).unwrap();

    let inputs = PipelineInputs::from_locators(&config.files);
    assert!(pipeline::run(&config.run, &inputs).is_err());
}
