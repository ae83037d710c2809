//! Per-run analysis configuration.

use serde::{Deserialize, Serialize};

use crate::aggregator::MetricKind;

/// Everything tunable about one analysis run.
///
/// Constructed once and handed to the report builder; there is no
/// process-wide settings state. Validation happens in
/// [`crate::report::ReportBuilder::new`] so a bad configuration fails
/// before any message is pulled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Bucket width in whole seconds, within `[1, 120]`.
    pub interval: u32,
    /// Metric driving highlight detection.
    pub highlight_metric: MetricKind,
    /// Percentile floor for highlight eligibility, `[0, 100]`.
    pub highlight_percentile: f64,
    /// Stddev multiplier a bucket must clear above the mean.
    pub spike_sensitivity: f64,
    /// Debug cap on consumed messages. The resulting report is partial
    /// and says so in its metadata.
    pub msg_break: Option<u64>,
    /// Log a progress line every this many consumed messages; 0 disables.
    pub print_interval: u64,
    /// Free-text annotation copied into the report.
    pub description: Option<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            interval: 5,
            highlight_metric: MetricKind::Messages,
            highlight_percentile: 93.0,
            spike_sensitivity: 2.0,
            msg_break: None,
            print_interval: 1000,
            description: None,
        }
    }
}
