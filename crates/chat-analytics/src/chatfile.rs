//! Chatfile-backed chat source.
//!
//! A chatfile is the JSON export a chat downloader writes: one array of
//! duck-typed message records, in timestamp order. Opening one gives a
//! replay of a finished broadcast, so the status is always `Past`.

use std::ffi::OsStr;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::Result;
use crate::source::{ChatSource, SourceInfo, StreamStatus};

/// One-shot source over a saved chatfile.
pub struct ChatFileSource {
    info: SourceInfo,
    records: std::vec::IntoIter<Value>,
}

impl ChatFileSource {
    /// Open a chatfile.
    ///
    /// The file carries no broadcast metadata, so the title falls back
    /// to the file name and the duration to `duration_override` or, in
    /// its absence, the last record's timestamp — the closest available
    /// estimate of the broadcast's length.
    pub fn open(path: &Path, duration_override: Option<f64>) -> Result<Self> {
        let file = File::open(path)?;
        let records: Vec<Value> = serde_json::from_reader(BufReader::new(file))?;
        debug!("read {} chat records from {}", records.len(), path.display());

        let title = path
            .file_stem()
            .and_then(OsStr::to_str)
            .unwrap_or("chatlog")
            .to_string();
        let duration = duration_override
            .or_else(|| last_timestamp(&records))
            .unwrap_or(0.0)
            .max(0.0);

        Ok(Self {
            info: SourceInfo {
                title,
                duration,
                status: StreamStatus::Past,
            },
            records: records.into_iter(),
        })
    }
}

fn last_timestamp(records: &[Value]) -> Option<f64> {
    records
        .last()
        .and_then(|record| record.get("time_in_seconds"))
        .and_then(Value::as_f64)
}

#[async_trait]
impl ChatSource for ChatFileSource {
    fn info(&self) -> &SourceInfo {
        &self.info
    }

    async fn next(&mut self) -> Result<Option<Value>> {
        Ok(self.records.next())
    }
}
