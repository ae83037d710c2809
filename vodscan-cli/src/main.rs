mod cli;
mod output;

use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use chat_analytics::{
    AnalysisConfig, ChatFileSource, ChatSource, MetricKind, Platform, ReportBuilder,
};
use clap::Parser;
use tracing::{Level, error, info};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use crate::cli::Args;
use crate::output::{seconds_to_time, write_report};

#[tokio::main]
async fn main() {
    let args = Args::parse();
    if let Err(e) = run(args).await {
        error!("Application error: {e:#}");
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    init_logging(args.verbose, args.quiet)?;

    let platform = Platform::resolve(&args.platform)?;
    let metric: MetricKind = args.highlight_metric.parse()?;
    let config = AnalysisConfig {
        interval: args.interval,
        highlight_metric: metric,
        highlight_percentile: args.highlight_percentile,
        spike_sensitivity: args.spike_sensitivity,
        msg_break: args.msg_break,
        print_interval: args.print_interval,
        description: args.description.clone(),
    };
    let builder = ReportBuilder::new(platform, config)?;

    let mut source = ChatFileSource::open(&args.chatfile, args.duration)
        .with_context(|| format!("opening chatfile {}", args.chatfile.display()))?;
    info!(
        "analyzing \"{}\" ({} of {} chat)",
        source.info().title,
        seconds_to_time(source.info().duration),
        platform
    );

    let report = builder.build(&mut source).await?;
    for highlight in &report.highlights {
        let bucket = &report.buckets[highlight.bucket_index];
        info!(
            "highlight at {} - {} ({} = {})",
            seconds_to_time(bucket.start),
            seconds_to_time(bucket.end),
            metric,
            highlight.metric_value
        );
    }

    let document = serde_json::to_string_pretty(&report)?;
    if args.stdout {
        println!("{document}");
    } else {
        let path = args
            .output
            .unwrap_or_else(|| PathBuf::from(format!("{}.json", source.info().title)));
        write_report(&document, &path)?;
        info!("wrote chat analytics to {}", path.display());
    }

    Ok(())
}

fn init_logging(verbose: bool, quiet: bool) -> Result<()> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_level(verbose))
        .init();
    Ok(())
}
