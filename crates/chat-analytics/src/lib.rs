//! Chat analytics: time-bucketed statistics and highlight detection for
//! livestream VOD chatlogs.
//!
//! Takes a finished broadcast's chat — duration plus a time-ordered,
//! one-shot sequence of messages — and produces per-interval aggregate
//! metrics and a set of flagged "highlight" buckets where chat activity
//! spiked.
//!
//! ## Core Types
//!
//! - [`ChatMessage`] / [`MessageKind`] - one normalized chat event
//! - [`IntervalSampler`] - fixed-width bucket partition of the duration
//! - [`MetricAggregator`] / [`Bucket`] - per-bucket running statistics
//! - [`HighlightSpec`] / [`Highlight`] - spike detection over the series
//! - [`ReportBuilder`] / [`ChatAnalyticsReport`] - the single-pass driver
//!   and its immutable result
//!
//! ## Sources
//!
//! - [`ChatSource`] - trait for finite, one-shot message suppliers
//! - [`ChatFileSource`] - reads a saved chat-downloader JSON export
//!
//! ## Platforms
//!
//! - [`Platform`] / [`PlatformProfile`] - which metrics a platform's
//!   chat carries (YouTube superchats have amounts, Twitch chat does
//!   not); bucketing and detection are identical everywhere

pub mod aggregator;
pub mod chatfile;
pub mod config;
pub mod error;
pub mod highlight;
pub mod message;
pub mod platform;
pub mod report;
pub mod sampler;
pub mod source;

pub use aggregator::{Bucket, BucketMetrics, MetricAggregator, MetricKind};
pub use chatfile::ChatFileSource;
pub use config::AnalysisConfig;
pub use error::{AnalyticsError, Result};
pub use highlight::{Highlight, HighlightSpec, detect};
pub use message::{ChatMessage, MessageKind, MessageParseError};
pub use platform::{Platform, PlatformProfile};
pub use report::{ChatAnalyticsReport, ReportBuilder};
pub use sampler::{IntervalSampler, MAX_INTERVAL, MIN_INTERVAL};
pub use source::{ChatSource, SourceInfo, StreamStatus};
