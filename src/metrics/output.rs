//! Output writing metrics

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct OutputMetrics;

impl OutputMetrics {
    pub fn record_write(rows: usize, bytes: usize) {
        ::metrics::counter!(phase_metric!(counter, "output", "rows")).increment(rows as u64);
        ::metrics::gauge!(phase_metric!(gauge, "output", "last_bytes")).set(bytes as f64);
    }
}

impl PhaseMetrics for OutputMetrics {
    fn register_metrics() {
        use metrics::{counter, gauge};

        let _ = counter!(phase_metric!(counter, "output", "rows"));
        let _ = gauge!(phase_metric!(gauge, "output", "last_bytes"));
    }

    fn phase_name() -> &'static str {
        "output"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "output", "rows"),
                metric_type: MetricType::Counter,
                help: "Fact table rows written",
                labels: vec![],
            },
            MetricDoc {
                name: phase_metric!(gauge, "output", "last_bytes"),
                metric_type: MetricType::Gauge,
                help: "Size in bytes of the last fact table written",
                labels: vec![],
            },
        ]
    }
}
