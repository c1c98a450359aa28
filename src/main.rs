use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::{error, info, info_span, warn};
use uuid::Uuid;

use msd_pipeline::config::{Config, DEFAULT_CONFIG_PATH};
use msd_pipeline::fiscal::{self, Quarter};
use msd_pipeline::pipeline::{self, PipelineInputs, RunContext};
use msd_pipeline::{logging, output};

#[derive(Parser)]
#[command(name = "msd_pipeline")]
#[command(about = "Transform quarterly MSD extracts into a long-format fact table")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the transform for the configured reporting period
    Run {
        /// Run configuration (TOML)
        #[arg(long, env = "MSD_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
        /// Where to write the fact table as CSV
        #[arg(long)]
        output: Option<PathBuf>,
        /// Rename and reorder columns for the downstream store
        #[arg(long)]
        renamed_schema: bool,
        /// Write Prometheus text metrics here when the run ends
        #[arg(long)]
        metrics_file: Option<PathBuf>,
    },
    /// Parse the configuration and check that every input file exists
    ValidateConfig {
        #[arg(long, env = "MSD_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
        config: PathBuf,
    },
    /// Print the label and start date of a fiscal quarter
    Period {
        #[arg(long)]
        fiscal_year: i32,
        /// Q1, Q2, Q3 or Q4
        #[arg(long)]
        quarter: Quarter,
    },
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    logging::init_logging();

    match cli.command {
        Commands::Run {
            config,
            output,
            renamed_schema,
            metrics_file,
        } => run(&config, output.as_deref(), renamed_schema, metrics_file.as_deref()),
        Commands::ValidateConfig { config } => validate_config(&config),
        Commands::Period {
            fiscal_year,
            quarter,
        } => {
            let start = fiscal::period_to_date(fiscal_year, quarter)?;
            println!("{}\t{}", fiscal::label(fiscal_year, quarter), start);
            Ok(())
        }
    }
}

fn run(
    config_path: &Path,
    output_path: Option<&Path>,
    renamed_schema: bool,
    metrics_file: Option<&Path>,
) -> anyhow::Result<()> {
    let run_id = Uuid::new_v4().to_string();
    let mut config = Config::load(config_path)
        .with_context(|| format!("loading configuration from {}", config_path.display()))?;
    if renamed_schema {
        config.run.produce_renamed_output_schema = true;
    }

    let span = info_span!("run", run_id = %run_id, data_version = %config.run.data_version);
    let _enter = span.enter();

    if metrics_file.is_some() {
        msd_pipeline::metrics::init_metrics();
    }

    let inputs = PipelineInputs::from_locators(&config.files);
    let outcome = match pipeline::run(&config.run, &inputs) {
        Ok(outcome) => {
            msd_pipeline::metrics::record_run(true);
            outcome
        }
        Err(e) => {
            error!(error = %e, "transform failed");
            msd_pipeline::metrics::record_run(false);
            if let Some(path) = metrics_file {
                if let Err(write_err) = msd_pipeline::metrics::write_textfile(path) {
                    warn!("could not write metrics after failure: {}", write_err);
                }
            }
            return Err(e).context("transform failed");
        }
    };

    let mut summary = outcome.summary(&run_id, &config.run.data_version);
    match output_path {
        Some(path) => {
            let digest = output::write_file(&outcome.table, path)
                .with_context(|| format!("writing fact table to {}", path.display()))?;
            summary.output_path = Some(path.display().to_string());
            summary.sha256 = Some(digest.sha256);
        }
        None => warn!("no --output given, fact table not written"),
    }

    if let Some(path) = metrics_file {
        msd_pipeline::metrics::write_textfile(path)
            .with_context(|| format!("writing metrics to {}", path.display()))?;
    }

    info!(rows = summary.output_rows, "run finished");
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn validate_config(config_path: &Path) -> anyhow::Result<()> {
    let config = Config::load(config_path)
        .with_context(|| format!("loading configuration from {}", config_path.display()))?;
    let ctx = RunContext::new(&config.run)?;

    let files = &config.files;
    let mut locators = vec![
        ("ref_table", &files.ref_table),
        ("partner_type_table", &files.partner_type_table),
        ("known_issues_table", &files.known_issues_table),
        ("nat_subnat_file", &files.nat_subnat_file),
    ];
    locators.extend(files.psnu_files.iter().map(|locator| ("psnu_files", locator)));

    let mut missing = 0;
    for (key, locator) in &locators {
        let path = files.base_directory.join(&locator.path);
        if path.is_file() {
            info!(key, path = %path.display(), encoding = %locator.encoding, "input found");
        } else {
            warn!(key, path = %path.display(), "input file not found");
            missing += 1;
        }
    }

    println!("data_version:        {}", config.run.data_version);
    println!("current period:      {}", ctx.current_period);
    println!("period start date:   {}", ctx.current_start_date);
    println!("target fiscal year:  {}", ctx.target_fiscal_year);
    println!("site extracts:       {}", files.psnu_files.len());

    if missing > 0 {
        bail!("{} of {} input files are missing", missing, locators.len());
    }
    println!("configuration OK");
    Ok(())
}
