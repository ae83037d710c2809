//! Analytics error types.

use thiserror::Error;

use crate::aggregator::MetricKind;
use crate::platform::Platform;
use crate::source::StreamStatus;

/// Crate-specific result type.
pub type Result<T> = std::result::Result<T, AnalyticsError>;

/// Errors that can occur while building a chat analytics report.
///
/// Every variant here is fatal to the run: no partial report is written.
/// Malformed individual chat records are not errors at this level; they
/// are skipped and counted by the report builder.
#[derive(Error, Debug)]
pub enum AnalyticsError {
    /// Sample interval outside the supported range.
    #[error("sample interval must be 1 <= interval <= 120 seconds, got {interval}")]
    InvalidInterval { interval: u32 },

    /// A message timestamp the sampler cannot place in any bucket.
    #[error("message timestamp must be a non-negative number of seconds, got {timestamp}")]
    InvalidTimestamp { timestamp: f64 },

    /// Metric name that no metric corresponds to.
    #[error("unknown metric name: {name}")]
    UnknownMetric { name: String },

    /// Metric that exists but is not offered by the active platform.
    #[error("metric `{metric}` is not available for {platform} chatlogs")]
    InvalidMetric {
        metric: MetricKind,
        platform: Platform,
    },

    /// Highlight percentile outside `[0, 100]`.
    #[error("highlight percentile must be within [0, 100], got {percentile}")]
    InvalidPercentile { percentile: f64 },

    /// Negative (or non-numeric) spike sensitivity.
    #[error("spike sensitivity must be a non-negative multiplier, got {sensitivity}")]
    InvalidSensitivity { sensitivity: f64 },

    /// Platform shorthand or URL that no profile matches.
    #[error("unsupported platform: {input}")]
    UnsupportedPlatform { input: String },

    /// The source reports a broadcast that has not finished.
    #[error("cannot analyze a `{status}` stream; wait until the broadcast is over")]
    StreamNotEnded { status: StreamStatus },

    /// Failure reported by the chat source itself.
    #[error("chat source error: {0}")]
    Source(String),

    /// IO errors (chatfile reading, report writing).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON errors (chatfile decoding, report encoding).
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AnalyticsError {
    /// Create a source error.
    pub fn source(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }
}
