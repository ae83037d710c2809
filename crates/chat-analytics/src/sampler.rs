//! Fixed-width interval sampling.
//!
//! Partitions a broadcast's duration into equal buckets and maps message
//! timestamps to bucket indices. The sampler is immutable after
//! construction; `index_for` is safe to call from anywhere.

use crate::error::{AnalyticsError, Result};

/// Shortest permitted bucket width, in seconds.
pub const MIN_INTERVAL: u32 = 1;
/// Longest permitted bucket width, in seconds.
pub const MAX_INTERVAL: u32 = 120;

/// Check a bucket width against the supported range.
pub fn validate_interval(interval: u32) -> Result<()> {
    if (MIN_INTERVAL..=MAX_INTERVAL).contains(&interval) {
        Ok(())
    } else {
        Err(AnalyticsError::InvalidInterval { interval })
    }
}

/// Maps timestamps onto fixed-width bucket indices.
#[derive(Debug, Clone, Copy)]
pub struct IntervalSampler {
    width: u32,
    bucket_count: usize,
}

impl IntervalSampler {
    /// Create a sampler for a broadcast of `duration` seconds with
    /// `width`-second buckets.
    ///
    /// Even a zero-length broadcast gets one bucket so an empty chatlog
    /// still produces a well-formed report.
    pub fn new(duration: f64, width: u32) -> Result<Self> {
        validate_interval(width)?;
        let duration = duration.max(0.0);
        let bucket_count = ((duration / f64::from(width)).ceil() as usize).max(1);
        Ok(Self {
            width,
            bucket_count,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn bucket_count(&self) -> usize {
        self.bucket_count
    }

    /// Bucket index for a message timestamp.
    ///
    /// Timestamps past the nominal duration clamp into the final bucket:
    /// exporter duration estimates and last-message timestamps routinely
    /// disagree, and no message may land outside the allocated range.
    pub fn index_for(&self, timestamp: f64) -> Result<usize> {
        if !timestamp.is_finite() || timestamp < 0.0 {
            return Err(AnalyticsError::InvalidTimestamp { timestamp });
        }
        let index = (timestamp / f64::from(self.width)).floor() as usize;
        Ok(index.min(self.bucket_count - 1))
    }

    /// Start/end bounds of a bucket, in seconds.
    pub fn bounds(&self, index: usize) -> (f64, f64) {
        let start = index as f64 * f64::from(self.width);
        (start, start + f64::from(self.width))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_bucket_count_examples() {
        assert_eq!(IntervalSampler::new(600.0, 60).unwrap().bucket_count(), 10);
        assert_eq!(IntervalSampler::new(601.0, 60).unwrap().bucket_count(), 11);
        assert_eq!(IntervalSampler::new(59.0, 60).unwrap().bucket_count(), 1);
        assert_eq!(IntervalSampler::new(0.0, 60).unwrap().bucket_count(), 1);
    }

    #[test]
    fn test_interval_range_is_enforced() {
        assert!(matches!(
            IntervalSampler::new(100.0, 0),
            Err(AnalyticsError::InvalidInterval { interval: 0 })
        ));
        assert!(matches!(
            IntervalSampler::new(100.0, 121),
            Err(AnalyticsError::InvalidInterval { interval: 121 })
        ));
        assert!(IntervalSampler::new(100.0, 1).is_ok());
        assert!(IntervalSampler::new(100.0, 120).is_ok());
    }

    #[test]
    fn test_negative_timestamp_is_rejected() {
        let sampler = IntervalSampler::new(600.0, 60).unwrap();
        assert!(matches!(
            sampler.index_for(-0.5),
            Err(AnalyticsError::InvalidTimestamp { .. })
        ));
        assert!(sampler.index_for(f64::NAN).is_err());
    }

    #[test]
    fn test_timestamp_at_or_past_duration_clamps_to_last_bucket() {
        let sampler = IntervalSampler::new(600.0, 60).unwrap();
        assert_eq!(sampler.index_for(600.0).unwrap(), 9);
        assert_eq!(sampler.index_for(683.2).unwrap(), 9);
    }

    #[test]
    fn test_bucket_bounds() {
        let sampler = IntervalSampler::new(600.0, 60).unwrap();
        assert_eq!(sampler.bounds(0), (0.0, 60.0));
        assert_eq!(sampler.bounds(9), (540.0, 600.0));
    }

    proptest! {
        #[test]
        fn prop_bucket_count_formula(duration in 0.0f64..1_000_000.0, width in MIN_INTERVAL..=MAX_INTERVAL) {
            let sampler = IntervalSampler::new(duration, width).unwrap();
            let expected = ((duration / f64::from(width)).ceil() as usize).max(1);
            prop_assert_eq!(sampler.bucket_count(), expected);
        }

        #[test]
        fn prop_index_always_in_range(
            duration in 0.0f64..100_000.0,
            width in MIN_INTERVAL..=MAX_INTERVAL,
            timestamp in 0.0f64..200_000.0,
        ) {
            let sampler = IntervalSampler::new(duration, width).unwrap();
            prop_assert!(sampler.index_for(timestamp).unwrap() < sampler.bucket_count());
        }
    }
}
