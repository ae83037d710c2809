//! Per-bucket metric aggregation.
//!
//! The aggregator owns one accumulator per bucket for the lifetime of a
//! pass. [`MetricAggregator::record`] folds each message into its
//! bucket's running counters; [`MetricAggregator::finish`] consumes the
//! aggregator and produces the finished [`Bucket`] series with derived
//! metrics (rate, unique authors) filled in. Derived metrics simply do
//! not exist before `finish`, so they cannot be read half-baked.

use std::fmt;
use std::str::FromStr;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;
use crate::message::{ChatMessage, MessageKind};
use crate::sampler::IntervalSampler;

/// Names every per-bucket metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Total messages in the bucket.
    Messages,
    /// Ordinary text messages.
    TextMessages,
    /// Paid messages (count, not amount).
    PaidMessages,
    /// Moderation/system events.
    SystemMessages,
    /// Unclassified events.
    OtherMessages,
    /// Distinct author identifiers seen in the bucket.
    UniqueAuthors,
    /// Sum of paid-message amounts. Platform-dependent.
    PaidTotal,
    /// Messages per second.
    Rate,
}

impl MetricKind {
    /// Every metric, in report order.
    pub const ALL: &'static [MetricKind] = &[
        Self::Messages,
        Self::TextMessages,
        Self::PaidMessages,
        Self::SystemMessages,
        Self::OtherMessages,
        Self::UniqueAuthors,
        Self::PaidTotal,
        Self::Rate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Messages => "messages",
            Self::TextMessages => "text_messages",
            Self::PaidMessages => "paid_messages",
            Self::SystemMessages => "system_messages",
            Self::OtherMessages => "other_messages",
            Self::UniqueAuthors => "unique_authors",
            Self::PaidTotal => "paid_total",
            Self::Rate => "rate",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| AnalyticsError::UnknownMetric { name: s.to_string() })
    }
}

/// Aggregated metrics of one finished bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BucketMetrics {
    pub messages: u64,
    pub text_messages: u64,
    pub paid_messages: u64,
    pub system_messages: u64,
    pub other_messages: u64,
    pub unique_authors: u64,
    /// Absent on platforms without monetary chat events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_total: Option<f64>,
    /// Messages per second over the bucket's width.
    pub rate: f64,
}

/// One fixed-width time slice of the broadcast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub index: usize,
    /// Inclusive start, in seconds from broadcast start.
    pub start: f64,
    /// Exclusive end. The final bucket's nominal end may exceed the
    /// reported duration, since widths are fixed.
    pub end: f64,
    pub metrics: BucketMetrics,
}

impl Bucket {
    /// Value of a named metric, or `None` when the metric was not
    /// computed for this run's platform.
    pub fn metric(&self, kind: MetricKind) -> Option<f64> {
        match kind {
            MetricKind::Messages => Some(self.metrics.messages as f64),
            MetricKind::TextMessages => Some(self.metrics.text_messages as f64),
            MetricKind::PaidMessages => Some(self.metrics.paid_messages as f64),
            MetricKind::SystemMessages => Some(self.metrics.system_messages as f64),
            MetricKind::OtherMessages => Some(self.metrics.other_messages as f64),
            MetricKind::UniqueAuthors => Some(self.metrics.unique_authors as f64),
            MetricKind::PaidTotal => self.metrics.paid_total,
            MetricKind::Rate => Some(self.metrics.rate),
        }
    }
}

#[derive(Debug, Default)]
struct BucketAccum {
    metrics: BucketMetrics,
    authors: FxHashSet<String>,
}

/// Accumulates per-bucket statistics during the single analysis pass.
#[derive(Debug)]
pub struct MetricAggregator {
    sampler: IntervalSampler,
    track_paid_total: bool,
    buckets: Vec<BucketAccum>,
}

impl MetricAggregator {
    /// Allocate empty accumulators for every bucket the sampler defines.
    pub fn new(sampler: IntervalSampler, track_paid_total: bool) -> Self {
        let buckets = (0..sampler.bucket_count())
            .map(|_| BucketAccum {
                metrics: BucketMetrics {
                    paid_total: track_paid_total.then_some(0.0),
                    ..BucketMetrics::default()
                },
                authors: FxHashSet::default(),
            })
            .collect();
        Self {
            sampler,
            track_paid_total,
            buckets,
        }
    }

    /// Fold one message into its bucket's running metrics.
    ///
    /// `index` must come from the sampler this aggregator was built
    /// with; it is a logic error otherwise.
    pub fn record(&mut self, index: usize, message: &ChatMessage) {
        let slot = &mut self.buckets[index];
        slot.metrics.messages += 1;
        match message.kind {
            MessageKind::Text => slot.metrics.text_messages += 1,
            MessageKind::Paid => {
                slot.metrics.paid_messages += 1;
                if self.track_paid_total {
                    if let (Some(total), Some(amount)) =
                        (slot.metrics.paid_total.as_mut(), message.amount)
                    {
                        *total += amount;
                    }
                }
            }
            MessageKind::System => slot.metrics.system_messages += 1,
            MessageKind::Other => slot.metrics.other_messages += 1,
        }
        if let Some(author) = &message.author {
            if !slot.authors.contains(author.as_str()) {
                slot.authors.insert(author.clone());
            }
        }
    }

    /// Finalize every bucket and hand back the finished series.
    ///
    /// Consuming `self` is what enforces finalize-before-read: rates and
    /// unique-author counts only exist on the returned buckets.
    pub fn finish(self) -> Vec<Bucket> {
        let sampler = self.sampler;
        let width = f64::from(sampler.width());
        self.buckets
            .into_iter()
            .enumerate()
            .map(|(index, slot)| {
                let (start, end) = sampler.bounds(index);
                let mut metrics = slot.metrics;
                metrics.unique_authors = slot.authors.len() as u64;
                metrics.rate = metrics.messages as f64 / width;
                Bucket {
                    index,
                    start,
                    end,
                    metrics,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn text(timestamp: f64, author: &str) -> ChatMessage {
        ChatMessage {
            timestamp,
            kind: MessageKind::Text,
            author: Some(author.to_string()),
            amount: None,
        }
    }

    fn paid(timestamp: f64, author: &str, amount: f64) -> ChatMessage {
        ChatMessage {
            timestamp,
            kind: MessageKind::Paid,
            author: Some(author.to_string()),
            amount: Some(amount),
        }
    }

    fn record_all(agg: &mut MetricAggregator, sampler: &IntervalSampler, msgs: &[ChatMessage]) {
        for msg in msgs {
            let index = sampler.index_for(msg.timestamp).unwrap();
            agg.record(index, msg);
        }
    }

    #[test]
    fn test_counts_and_rates_per_bucket() {
        let sampler = IntervalSampler::new(600.0, 60).unwrap();
        let mut agg = MetricAggregator::new(sampler, true);
        let msgs = [
            text(10.0, "a"),
            text(10.0, "b"),
            text(70.0, "a"),
            text(70.0, "a"),
            text(70.0, "c"),
        ];
        record_all(&mut agg, &sampler, &msgs);

        let buckets = agg.finish();
        assert_eq!(buckets.len(), 10);
        assert_eq!(buckets[0].metrics.messages, 2);
        assert_eq!(buckets[1].metrics.messages, 3);
        assert_eq!(buckets[0].metrics.rate, 2.0 / 60.0);
        assert_eq!(buckets[1].metrics.rate, 3.0 / 60.0);
        assert_eq!(buckets[2].metrics.messages, 0);
    }

    #[test]
    fn test_unique_authors_deduplicated_per_bucket() {
        let sampler = IntervalSampler::new(120.0, 60).unwrap();
        let mut agg = MetricAggregator::new(sampler, true);
        let msgs = [
            text(1.0, "a"),
            text(2.0, "a"),
            text(3.0, "b"),
            // Same author again in the next bucket counts there too.
            text(61.0, "a"),
        ];
        record_all(&mut agg, &sampler, &msgs);

        let buckets = agg.finish();
        assert_eq!(buckets[0].metrics.unique_authors, 2);
        assert_eq!(buckets[1].metrics.unique_authors, 1);
    }

    #[test]
    fn test_paid_totals_accumulate() {
        let sampler = IntervalSampler::new(60.0, 60).unwrap();
        let mut agg = MetricAggregator::new(sampler, true);
        let msgs = [paid(1.0, "a", 5.0), paid(2.0, "b", 2.5), text(3.0, "c")];
        record_all(&mut agg, &sampler, &msgs);

        let buckets = agg.finish();
        assert_eq!(buckets[0].metrics.paid_messages, 2);
        assert_eq!(buckets[0].metrics.paid_total, Some(7.5));
        assert_eq!(buckets[0].metrics.text_messages, 1);
    }

    #[test]
    fn test_untracked_paid_total_stays_absent() {
        let sampler = IntervalSampler::new(60.0, 60).unwrap();
        let mut agg = MetricAggregator::new(sampler, false);
        agg.record(0, &paid(1.0, "a", 5.0));

        let buckets = agg.finish();
        assert_eq!(buckets[0].metrics.paid_messages, 1);
        assert_eq!(buckets[0].metrics.paid_total, None);
        assert_eq!(buckets[0].metric(MetricKind::PaidTotal), None);
    }

    #[test]
    fn test_metric_name_round_trip() {
        for kind in MetricKind::ALL {
            assert_eq!(kind.as_str().parse::<MetricKind>().unwrap(), *kind);
        }
        assert!("messages_per_minute".parse::<MetricKind>().is_err());
    }

    proptest! {
        #[test]
        fn prop_message_count_is_conserved(
            timestamps in proptest::collection::vec(0.0f64..700.0, 0..200),
        ) {
            let sampler = IntervalSampler::new(600.0, 60).unwrap();
            let mut agg = MetricAggregator::new(sampler, true);
            for &ts in &timestamps {
                let index = sampler.index_for(ts).unwrap();
                agg.record(index, &text(ts, "someone"));
            }
            let total: u64 = agg.finish().iter().map(|b| b.metrics.messages).sum();
            prop_assert_eq!(total, timestamps.len() as u64);
        }
    }
}
