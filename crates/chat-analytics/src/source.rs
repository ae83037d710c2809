//! Chat source boundary.
//!
//! A source supplies the broadcast's metadata up front and then yields
//! raw chat records one at a time, in timestamp order, exactly once.
//! Sources are finite and non-restartable: re-analyzing the same data
//! means materializing it (e.g. to a chatfile) and opening a fresh
//! source from the copy.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Lifecycle state of the broadcast behind a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamStatus {
    /// The broadcast is over; its chatlog is complete.
    Past,
    Live,
    Upcoming,
    Unknown,
}

impl fmt::Display for StreamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Past => "past",
            Self::Live => "live",
            Self::Upcoming => "upcoming",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

/// Metadata a source knows before any message is pulled.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceInfo {
    pub title: String,
    /// Broadcast length in seconds. May be an estimate; messages
    /// stamped past it are clamped into the final bucket.
    pub duration: f64,
    pub status: StreamStatus,
}

/// A finite, one-shot supplier of raw chat records.
///
/// The pull is async because a source may be backed by something that
/// blocks (a network reader draining a saved response, a slow disk).
/// Once `next` returns `None` the source is exhausted for good.
#[async_trait]
pub trait ChatSource: Send {
    fn info(&self) -> &SourceInfo;

    /// Pull the next raw chat record, or `None` when exhausted.
    async fn next(&mut self) -> Result<Option<Value>>;
}
