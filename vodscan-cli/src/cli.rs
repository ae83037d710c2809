use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "vodscan",
    version,
    about = "Find chat activity highlights in livestream VODs",
    long_about = "Analyzes a saved chatlog in fixed-width time buckets and flags the \
                  intervals where chat activity spiked, so exciting moments can be \
                  found without rewatching the whole stream."
)]
pub struct Args {
    /// Path to a saved chatfile (JSON array of chat records, as written
    /// by a chat downloader)
    pub chatfile: PathBuf,

    /// Platform the chat was captured from: a shorthand (youtube,
    /// twitch) or the original stream URL
    #[arg(short, long)]
    pub platform: String,

    /// Bucket width in seconds (1-120)
    #[arg(short, long, default_value_t = 5)]
    pub interval: u32,

    /// Metric that drives highlight detection (e.g. messages,
    /// unique_authors, rate, paid_total)
    #[arg(long, default_value = "messages")]
    pub highlight_metric: String,

    /// Percentile floor a bucket must clear to be highlight-eligible
    #[arg(long, default_value_t = 93.0)]
    pub highlight_percentile: f64,

    /// How many standard deviations above the mean a bucket must spike
    #[arg(long, default_value_t = 2.0)]
    pub spike_sensitivity: f64,

    /// Override the broadcast duration in seconds (defaults to the last
    /// chat message's timestamp)
    #[arg(long)]
    pub duration: Option<f64>,

    /// Free-text note copied into the report
    #[arg(short, long)]
    pub description: Option<String>,

    /// Stop after this many chat records (debugging; the report is
    /// marked as partial)
    #[arg(long, value_name = "N")]
    pub msg_break: Option<u64>,

    /// Log a progress line every N consumed records (0 disables)
    #[arg(long, default_value_t = 1000)]
    pub print_interval: u64,

    /// Where to write the report (defaults to <chatfile name>.json)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the report to stdout instead of writing a file
    #[arg(long, conflicts_with = "output")]
    pub stdout: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}
