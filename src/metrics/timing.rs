//! Timing helpers for metrics
//!

use std::time::Instant;

/// A timing guard that records the elapsed time when dropped
///
/// The duration goes to the named histogram together with any labels attached
/// through [`TimingGuard::with_label`].
pub struct TimingGuard {
    start: Instant,
    histogram_name: &'static str,
    labels: Vec<(&'static str, String)>,
}

impl TimingGuard {
    pub fn new(histogram_name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            histogram_name,
            labels: Vec::new(),
        }
    }

    pub fn with_label(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.labels.push((key, value.into()));
        self
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    /// Finish the timing now; dropping the guard does the recording.
    pub fn finish(self) {}
}

impl Drop for TimingGuard {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        let labels: Vec<::metrics::Label> = self
            .labels
            .iter()
            .map(|(key, value)| ::metrics::Label::new(*key, value.clone()))
            .collect();
        ::metrics::histogram!(self.histogram_name, labels).record(duration);
    }
}
