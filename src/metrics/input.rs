//! Input reading metrics

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct InputMetrics;

impl InputMetrics {
    /// Record rows kept from one input table and how long reading it took
    pub fn record_table_read(table: &'static str, rows: usize, duration_secs: f64) {
        ::metrics::counter!(phase_metric!(counter, "input", "rows"), "table" => table)
            .increment(rows as u64);
        ::metrics::histogram!(phase_metric!(histogram, "input", "read_duration_seconds"), "table" => table)
            .record(duration_secs);
    }
}

impl PhaseMetrics for InputMetrics {
    fn register_metrics() {
        use metrics::{counter, histogram};

        let _ = counter!(phase_metric!(counter, "input", "rows"));
        let _ = histogram!(phase_metric!(histogram, "input", "read_duration_seconds"));
    }

    fn phase_name() -> &'static str {
        "input"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "input", "rows"),
                metric_type: MetricType::Counter,
                help: "Rows read from each input table after empty rows are dropped",
                labels: vec!["table"],
            },
            MetricDoc {
                name: phase_metric!(histogram, "input", "read_duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Time spent decoding and parsing each input table",
                labels: vec!["table"],
            },
        ]
    }
}
