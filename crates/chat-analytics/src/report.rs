//! Report assembly.
//!
//! [`ReportBuilder`] drives the whole analysis: validate the
//! configuration up front, pull every message from the source in one
//! pass, finalize the bucket series, run highlight detection, and
//! assemble the immutable [`ChatAnalyticsReport`].
//!
//! ## Report JSON layout
//!
//! The report serializes with stable field names: scalar metadata at
//! the top level (`platform`, `duration`, `interval`, `description`,
//! `program_version`, `generated_at`, `messages_analyzed`,
//! `messages_skipped`, `truncated_after`), then `buckets` — an array of
//! `{index, start, end, metrics{...}}` in index order — and
//! `highlights` — an array of `{bucket_index, metric_value}` in bucket
//! order. The document is written whole once the pass completes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::aggregator::{Bucket, MetricAggregator, MetricKind};
use crate::config::AnalysisConfig;
use crate::error::{AnalyticsError, Result};
use crate::highlight::{Highlight, HighlightSpec, detect};
use crate::message::ChatMessage;
use crate::platform::{Platform, PlatformProfile};
use crate::sampler::{IntervalSampler, validate_interval};
use crate::source::{ChatSource, StreamStatus};

/// The finished analytics report. Built once, read-only thereafter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatAnalyticsReport {
    pub platform: Platform,
    /// Broadcast length in seconds, as reported by the source.
    pub duration: f64,
    /// Bucket width in seconds.
    pub interval: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub program_version: String,
    pub generated_at: DateTime<Utc>,
    /// Messages folded into buckets.
    pub messages_analyzed: u64,
    /// Malformed records dropped during the pass.
    pub messages_skipped: u64,
    /// Set when a `msg_break` cap stopped the pass early: the report
    /// covers only the first this-many records of the source.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncated_after: Option<u64>,
    pub buckets: Vec<Bucket>,
    pub highlights: Vec<Highlight>,
}

/// Orchestrates the single analysis pass.
pub struct ReportBuilder {
    profile: PlatformProfile,
    config: AnalysisConfig,
    spec: HighlightSpec,
}

impl ReportBuilder {
    /// Validate the configuration against the platform's capabilities.
    ///
    /// Fails fast — interval range, metric availability, percentile
    /// range, sensitivity sign — so no source is ever touched with a
    /// bad configuration.
    pub fn new(platform: Platform, config: AnalysisConfig) -> Result<Self> {
        validate_interval(config.interval)?;
        let profile = platform.profile();
        let spec = HighlightSpec {
            metric: config.highlight_metric,
            percentile: config.highlight_percentile,
            sensitivity: config.spike_sensitivity,
        };
        spec.validate(&profile)?;
        Ok(Self {
            profile,
            config,
            spec,
        })
    }

    /// Consume the source and build the report.
    ///
    /// Refuses sources whose broadcast has not finished. Malformed
    /// records are logged and skipped; every well-formed message lands
    /// in exactly one bucket.
    pub async fn build<S: ChatSource + ?Sized>(
        &self,
        source: &mut S,
    ) -> Result<ChatAnalyticsReport> {
        let info = source.info().clone();
        if info.status != StreamStatus::Past {
            return Err(AnalyticsError::StreamNotEnded {
                status: info.status,
            });
        }

        let sampler = IntervalSampler::new(info.duration, self.config.interval)?;
        let mut aggregator =
            MetricAggregator::new(sampler, self.profile.offers(MetricKind::PaidTotal));
        info!(
            "analyzing {:.0}s of chat in {} buckets of {}s",
            info.duration,
            sampler.bucket_count(),
            sampler.width()
        );

        let mut analyzed: u64 = 0;
        let mut skipped: u64 = 0;
        let mut truncated_after = None;
        loop {
            let consumed = analyzed + skipped;
            if let Some(cap) = self.config.msg_break {
                if consumed >= cap {
                    info!("message break reached after {consumed} records; report will be partial");
                    truncated_after = Some(consumed);
                    break;
                }
            }
            let Some(record) = source.next().await? else {
                break;
            };

            match ChatMessage::from_value(&record) {
                Ok(message) => match sampler.index_for(message.timestamp) {
                    Ok(index) => {
                        aggregator.record(index, &message);
                        analyzed += 1;
                    }
                    // Pre-broadcast chatter gets stamped with negative
                    // offsets; it belongs to no bucket.
                    Err(err) => {
                        warn!("skipping message outside the broadcast window: {err}");
                        skipped += 1;
                    }
                },
                Err(err) => {
                    warn!("skipping malformed chat record: {err}");
                    skipped += 1;
                }
            }

            let consumed = analyzed + skipped;
            if self.config.print_interval > 0 && consumed % self.config.print_interval == 0 {
                info!("consumed {consumed} chat records");
            }
        }

        let buckets = aggregator.finish();
        let highlights = detect(&buckets, &self.spec, &self.profile)?;
        info!(
            "analyzed {analyzed} messages ({skipped} skipped), {} highlights",
            highlights.len()
        );

        Ok(ChatAnalyticsReport {
            platform: self.profile.platform(),
            duration: info.duration,
            interval: self.config.interval,
            description: self.config.description.clone(),
            program_version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at: Utc::now(),
            messages_analyzed: analyzed,
            messages_skipped: skipped,
            truncated_after,
            buckets,
            highlights,
        })
    }
}
