//! Highlight detection over a finished bucket series.
//!
//! A bucket is flagged when it clears two bars at once: an absolute one
//! (the configured percentile of the metric across all buckets) and a
//! relative one (mean plus `sensitivity` standard deviations). The
//! percentile keeps quiet streams from flagging noise; the deviation
//! test keeps uniformly busy streams from flagging everything.

use serde::{Deserialize, Serialize};

use crate::aggregator::{Bucket, MetricKind};
use crate::error::{AnalyticsError, Result};
use crate::platform::PlatformProfile;

/// Tunable parameters for one detection run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HighlightSpec {
    /// Which bucket metric drives detection.
    pub metric: MetricKind,
    /// Percentile floor in `[0, 100]`.
    pub percentile: f64,
    /// Non-negative stddev multiplier. Zero degrades the rule to pure
    /// percentile thresholding.
    pub sensitivity: f64,
}

impl HighlightSpec {
    /// Validate the spec against the active platform profile.
    pub fn validate(&self, profile: &PlatformProfile) -> Result<()> {
        if !profile.offers(self.metric) {
            return Err(AnalyticsError::InvalidMetric {
                metric: self.metric,
                platform: profile.platform(),
            });
        }
        if !(0.0..=100.0).contains(&self.percentile) {
            return Err(AnalyticsError::InvalidPercentile {
                percentile: self.percentile,
            });
        }
        // `!(x >= 0)` instead of `x < 0` so NaN is rejected too.
        if !(self.sensitivity >= 0.0) {
            return Err(AnalyticsError::InvalidSensitivity {
                sensitivity: self.sensitivity,
            });
        }
        Ok(())
    }
}

/// One bucket flagged as unusually active.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    pub bucket_index: usize,
    /// The metric value that cleared both bars.
    pub metric_value: f64,
}

/// Flag unusually active buckets.
///
/// Deterministic: identical buckets and spec always produce identical
/// highlights, in bucket order. A flat series (population stddev of
/// zero) produces no highlights at any sensitivity — there is no
/// deviation to measure, so nothing qualifies as a spike.
pub fn detect(
    buckets: &[Bucket],
    spec: &HighlightSpec,
    profile: &PlatformProfile,
) -> Result<Vec<Highlight>> {
    spec.validate(profile)?;

    let values: Vec<f64> = buckets
        .iter()
        .map(|bucket| bucket.metric(spec.metric).unwrap_or_default())
        .collect();
    if values.is_empty() {
        return Ok(Vec::new());
    }

    let threshold = percentile(&values, spec.percentile);
    let mean = mean(&values);
    let stddev = population_stddev(&values, mean);

    let highlights = buckets
        .iter()
        .zip(&values)
        .filter(|&(_, &value)| {
            let spiking = if stddev == 0.0 {
                value > mean
            } else {
                value >= mean + spec.sensitivity * stddev
            };
            value >= threshold && spiking
        })
        .map(|(bucket, &value)| Highlight {
            bucket_index: bucket.index,
            metric_value: value,
        })
        .collect();
    Ok(highlights)
}

/// Linear-interpolation percentile over the full population.
///
/// `p = 0` is the minimum, `p = 100` the maximum; ranks in between
/// interpolate between the two nearest order statistics.
fn percentile(values: &[f64], p: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let weight = rank - lower as f64;
    sorted[lower] + weight * (sorted[upper] - sorted[lower])
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn population_stddev(values: &[f64], mean: f64) -> f64 {
    let variance = values
        .iter()
        .map(|value| {
            let diff = value - mean;
            diff * diff
        })
        .sum::<f64>()
        / values.len() as f64;
    variance.sqrt()
}
