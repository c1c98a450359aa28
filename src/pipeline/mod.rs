//! The MSD transform: input tables in, one long-format fact table out.
//!
//! Stages run strictly one after another. Each stage is timed, counted and
//! logged through [`StageRecorder`] so a run leaves a per-stage trail both in
//! the logs and in the metrics exposition.

pub mod context;
pub mod stages;

use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::info;

use crate::config::{FileLocator, FileLocators, RunConfig};
use crate::error::Result;
use crate::ingest::{self, schemas, CsvTableSource, TableSource};
use crate::metrics::StageMetrics;

pub use context::RunContext;

/// The five reader collaborators a run draws from.
pub struct PipelineInputs {
    pub reference: Box<dyn TableSource>,
    pub partner_type: Box<dyn TableSource>,
    pub known_issues: Box<dyn TableSource>,
    pub site_extracts: Vec<Box<dyn TableSource>>,
    pub nat_subnat: Box<dyn TableSource>,
}

impl PipelineInputs {
    /// CSV readers for every configured file, resolved against the base directory.
    pub fn from_locators(files: &FileLocators) -> Self {
        let base = files.base_directory.as_path();
        let csv = |locator: &FileLocator| -> Box<dyn TableSource> {
            Box::new(CsvTableSource::from_locator(base, locator))
        };
        Self {
            reference: csv(&files.ref_table),
            partner_type: csv(&files.partner_type_table),
            known_issues: csv(&files.known_issues_table),
            site_extracts: files.psnu_files.iter().map(|locator| csv(locator)).collect(),
            nat_subnat: csv(&files.nat_subnat_file),
        }
    }
}

/// Shape of the table produced by one stage.
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub stage: &'static str,
    pub rows: usize,
    pub columns: usize,
    pub seconds: f64,
}

/// What a run produced, printed by the binary as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub data_version: String,
    pub context: RunContext,
    pub stages: Vec<StageReport>,
    pub output_rows: usize,
    pub output_columns: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

/// Result of [`run`]: the fact table plus the per-stage trail.
#[derive(Debug)]
pub struct TransformOutcome {
    pub table: DataFrame,
    pub context: RunContext,
    pub stages: Vec<StageReport>,
}

impl TransformOutcome {
    pub fn summary(&self, run_id: &str, data_version: &str) -> RunSummary {
        RunSummary {
            run_id: run_id.to_string(),
            data_version: data_version.to_string(),
            context: self.context.clone(),
            stages: self.stages.clone(),
            output_rows: self.table.height(),
            output_columns: self.table.width(),
            output_path: None,
            sha256: None,
        }
    }
}

#[derive(Default)]
struct StageRecorder {
    reports: Vec<StageReport>,
}

impl StageRecorder {
    fn run<F>(&mut self, stage: &'static str, body: F) -> Result<DataFrame>
    where
        F: FnOnce() -> Result<DataFrame>,
    {
        let timer = StageMetrics::start(stage);
        let table = body()?;
        let seconds = timer.elapsed_secs();
        timer.finish();

        StageMetrics::record_rows_out(stage, table.height());
        info!(
            stage,
            rows = table.height(),
            columns = table.width(),
            seconds,
            "stage complete"
        );
        self.reports.push(StageReport {
            stage,
            rows: table.height(),
            columns: table.width(),
            seconds,
        });
        Ok(table)
    }
}

/// Run the transform and return only the fact table.
pub fn transform(run_config: &RunConfig, inputs: &PipelineInputs) -> Result<DataFrame> {
    run(run_config, inputs).map(|outcome| outcome.table)
}

/// Run the transform, keeping the per-stage trail.
pub fn run(run_config: &RunConfig, inputs: &PipelineInputs) -> Result<TransformOutcome> {
    run_config.validate()?;
    let ctx = RunContext::new(run_config)?;
    info!(
        data_version = %run_config.data_version,
        current_period = %ctx.current_period,
        target_fiscal_year = ctx.target_fiscal_year,
        "starting transform"
    );

    let mut recorder = StageRecorder::default();

    let reference = inputs.reference.read(&schemas::REFERENCE_TABLE)?;
    let partner_type = inputs.partner_type.read(&schemas::PARTNER_TYPE_TABLE)?;
    let known_issues = inputs.known_issues.read(&schemas::KNOWN_ISSUES_TABLE)?;
    let site = recorder.run("read_site_extracts", || ingest::read_site_extracts(&inputs.site_extracts))?;

    let main = recorder.run("reference_join", || stages::reference_join::apply(site, reference))?;
    let net_new = recorder.run("net_new_targets", || {
        let wide = stages::net_new::wide(&main, ctx.start_fiscal_year, ctx.target_fiscal_year)?;
        stages::net_new::fiscal_year_rows(wide, ctx.start_fiscal_year, ctx.target_fiscal_year)
    })?;
    let main = recorder.run("quarterly_cumulative", || stages::quarterly::apply(main))?;

    let nat_subnat = inputs.nat_subnat.read(&schemas::NAT_SUBNAT_EXTRACT)?;
    let wide = recorder.run("reunite", || stages::reunite::apply(main, net_new, nat_subnat))?;
    let long = recorder.run("long_pivot", || stages::long_pivot::apply(&wide))?;
    drop(wide);

    let long = recorder.run("clean_fields", || stages::clean_fields::apply(long))?;
    let long = recorder.run("naming_convention", || stages::naming::apply(long, &ctx.current_period))?;
    let long = recorder.run("lookup_enrichment", || stages::lookup::apply(long, partner_type, known_issues))?;
    let dated = recorder.run("calendar_date", || stages::vlc::add_calendar_date(long))?;
    let mut fact = recorder.run("viral_load_coverage", || stages::vlc::apply(dated, &ctx))?;

    if run_config.produce_renamed_output_schema {
        fact = recorder.run("output_shaping", || stages::output_shaping::apply(&fact))?;
    }

    info!(rows = fact.height(), columns = fact.width(), "transform complete");
    Ok(TransformOutcome {
        table: fact,
        context: ctx,
        stages: recorder.reports,
    })
}
