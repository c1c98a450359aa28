//! Transform stage metrics
//!
//! Row counts and durations per pipeline stage, plus the number of rows that
//! carry the malformed-period sentinel.

use crate::metrics::timing::TimingGuard;
use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct StageMetrics;

impl StageMetrics {
    /// Start timing a stage; the duration is recorded when the guard drops.
    pub fn start(stage: &'static str) -> TimingGuard {
        TimingGuard::new(phase_metric!(histogram, "stage", "duration_seconds")).with_label("stage", stage)
    }

    pub fn record_rows_out(stage: &'static str, rows: usize) {
        ::metrics::counter!(phase_metric!(counter, "stage", "rows_out"), "stage" => stage)
            .increment(rows as u64);
    }

    pub fn record_sentinel_rows(rows: usize) {
        ::metrics::counter!(phase_metric!(counter, "stage", "sentinel_rows")).increment(rows as u64);
    }
}

impl PhaseMetrics for StageMetrics {
    fn register_metrics() {
        use metrics::{counter, histogram};

        let _ = counter!(phase_metric!(counter, "stage", "rows_out"));
        let _ = counter!(phase_metric!(counter, "stage", "sentinel_rows"));
        let _ = histogram!(phase_metric!(histogram, "stage", "duration_seconds"));
    }

    fn phase_name() -> &'static str {
        "stage"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "stage", "rows_out"),
                metric_type: MetricType::Counter,
                help: "Rows produced by each transform stage",
                labels: vec!["stage"],
            },
            MetricDoc {
                name: phase_metric!(counter, "stage", "sentinel_rows"),
                metric_type: MetricType::Counter,
                help: "Rows whose period label could not be rebuilt (ERROR sentinel)",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(histogram, "stage", "duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Duration of each transform stage in seconds",
                labels: vec!["stage"],
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_metrics_registration() {
        StageMetrics::register_metrics();
        StageMetrics::record_rows_out("reunite", 3);
    }

    #[test]
    fn test_metrics_documentation() {
        let docs = StageMetrics::metrics_documentation();
        assert_eq!(docs.len(), 3);
        for doc in docs {
            assert!(doc.name.starts_with("msd_stage_"));
        }
    }
}
