//! Centralized metrics infrastructure for the MSD pipeline
//!
//! Each part of a run (input reading, transform stages, output writing) defines
//! its own metrics in a dedicated submodule. The binary installs a Prometheus
//! recorder without a listener and can dump the text exposition to a file for
//! a node-exporter textfile collector, which suits a batch job better than a
//! scrape endpoint.

pub mod timing;
pub mod input;
pub mod output;
pub mod registry;
pub mod stages;

pub use timing::TimingGuard;
pub use input::InputMetrics;
pub use output::OutputMetrics;
pub use stages::StageMetrics;

use std::path::Path;
use std::sync::{Once, OnceLock};
use tracing::{info, warn};

static INIT: Once = Once::new();
static HANDLE: OnceLock<metrics_exporter_prometheus::PrometheusHandle> = OnceLock::new();

/// Initialize the global metrics recorder
///
/// Idempotent. Installs a Prometheus recorder, keeps its handle for in-process
/// rendering and registers every phase's metrics so they show up even when a
/// run never touches them.
pub fn init_metrics() {
    INIT.call_once(|| {
        let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
        match builder.install_recorder() {
            Ok(handle) => {
                if HANDLE.set(handle).is_err() {
                    warn!("METRICS: handle was already stored");
                }
                info!("Prometheus recorder installed (handle available for in-process render)");

                registry::register_all_metrics();
            }
            Err(e) => {
                warn!("Failed to install Prometheus recorder: {}", e);
            }
        }
    });
}

/// Render the current metric values in Prometheus text format.
///
/// Returns `None` when [`init_metrics`] has not installed a recorder.
pub fn render() -> Option<String> {
    HANDLE.get().map(|handle| handle.render())
}

/// Write the rendered metrics to `path`, replacing any previous content.
pub fn write_textfile(path: &Path) -> std::io::Result<bool> {
    match render() {
        Some(text) => {
            std::fs::write(path, text)?;
            info!("metrics written to {}", path.display());
            Ok(true)
        }
        None => {
            warn!("metrics recorder not installed, nothing written to {}", path.display());
            Ok(false)
        }
    }
}

/// Trait for phase-specific metrics collections
///
/// Each phase implements this trait to provide:
/// - Metric registration at startup
/// - Consistent naming conventions
/// - Documentation of what each metric measures
pub trait PhaseMetrics {
    /// Register all metrics for this phase
    fn register_metrics();

    /// Get the phase name for prefixing metrics
    fn phase_name() -> &'static str;

    /// Get documentation for all metrics in this phase
    fn metrics_documentation() -> Vec<MetricDoc>;
}

/// Documentation for a single metric
#[derive(Debug, Clone)]
pub struct MetricDoc {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub help: &'static str,
    #[allow(dead_code)]
    pub labels: Vec<&'static str>,
}

#[derive(Debug, Clone)]
pub enum MetricType {
    Counter,
    Histogram,
    Gauge,
}

/// Builds metric names following the convention
/// msd_{phase}_{metric_name}_{type}
macro_rules! phase_metric {
    (counter, $phase:literal, $name:literal) => {
        concat!("msd_", $phase, "_", $name, "_total")
    };
    (histogram, $phase:literal, $name:literal) => {
        concat!("msd_", $phase, "_", $name)
    };
    (gauge, $phase:literal, $name:literal) => {
        concat!("msd_", $phase, "_", $name)
    };
}

pub(crate) use phase_metric;

/// Count one pipeline run
pub fn record_run(success: bool) {
    let outcome = if success { "success" } else { "failure" };
    ::metrics::counter!("msd_runs_total", "outcome" => outcome).increment(1);
}
