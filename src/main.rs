mod classify;
mod config;
mod decode;
mod lookup;
mod report;
mod types;

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use tracing::info;

use types::UrlRecord;

#[derive(Parser)]
#[command(
    name = "blob_trace",
    about = "Foreign-URL and language-mix analysis over sampled source blobs"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Full pipeline: decode, classify, temporal join, reports
    Run {
        /// Blob content dump (identifier;base64-or-raw per line)
        #[arg(long)]
        content: PathBuf,
        /// Blob path metadata (identifier;path per line)
        #[arg(long)]
        paths: PathBuf,
        /// Output directory for reports
        #[arg(long, default_value = "out")]
        outdir: PathBuf,
        /// External timestamp lookup command
        #[arg(long, default_value = "getValues")]
        lookup_bin: PathBuf,
        /// Lookup map holding first-seen timestamps
        #[arg(long, default_value = "b2tac")]
        map: String,
        /// Identifiers per lookup batch
        #[arg(long, default_value_t = config::LOOKUP_BATCH)]
        batch_size: usize,
        /// Per-batch lookup timeout in seconds
        #[arg(long, default_value_t = config::LOOKUP_TIMEOUT_SECS)]
        timeout: u64,
        /// Skip the temporal join (no year series in the reports)
        #[arg(long)]
        no_join: bool,
        /// Max text-like blobs to analyze (default: all)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Decode pass only: print the text-like census and exit
    DecodeStats {
        /// Blob content dump (identifier;base64-or-raw per line)
        #[arg(long)]
        content: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            content,
            paths,
            outdir,
            lookup_bin,
            map,
            batch_size,
            timeout,
            no_join,
            limit,
        } => {
            info!("reading blob content from {}", content.display());
            let (mut blobs, stats) = decode::parse_content_file(&content)?;
            if stats.lines == 0 {
                println!("Nothing to process: {} is empty.", content.display());
                return Ok(());
            }
            if let Some(n) = limit {
                blobs.truncate(n);
            }
            println!(
                "Decoded {} lines: {} text-like, {} binary, {} oversized, {} below printable ratio, {} unavailable.",
                stats.lines, stats.text_like, stats.binary, stats.oversized,
                stats.not_printable, stats.unavailable
            );

            println!("Classifying {} text-like blobs...", blobs.len());
            let analyses = classify::analyze_all(&blobs);

            let mut records: Vec<UrlRecord> = Vec::new();
            let mut script_sets = Vec::with_capacity(analyses.len());
            for analysis in analyses {
                script_sets.push(analysis.scripts);
                records.extend(analysis.urls);
            }

            info!("reading path metadata from {}", paths.display());
            let lang_sets = classify::lang::parse_path_metadata(&paths)?;

            let years = if no_join {
                HashMap::new()
            } else {
                let ids = blobs_with_urls(&records);
                println!("Querying first-seen timestamps for {} blobs...", ids.len());
                lookup::LookupClient::new(lookup_bin, map)
                    .batch_size(batch_size)
                    .timeout(Duration::from_secs(timeout))
                    .resolve_years(&ids)
                    .await
            };
            for r in &mut records {
                r.year = years.get(&r.blob).copied();
            }

            let summary = report::aggregate(&stats, &records, &script_sets, &lang_sets);
            report::write_reports(&outdir, &summary, &records)?;
            report::print_summary(&summary);
            Ok(())
        }
        Commands::DecodeStats { content } => {
            let (_, stats) = decode::parse_content_file(&content)?;
            if stats.lines == 0 {
                println!("Nothing to process: {} is empty.", content.display());
                return Ok(());
            }
            println!("Lines:           {}", stats.lines);
            println!("Text-like:       {}", stats.text_like);
            println!("Binary:          {}", stats.binary);
            println!("Oversized:       {}", stats.oversized);
            println!("Below printable: {}", stats.not_printable);
            println!("Unavailable:     {}", stats.unavailable);
            Ok(())
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

/// Distinct blob ids among the URL records, input order preserved.
/// Records arrive grouped by blob, so consecutive dedup is enough.
fn blobs_with_urls(records: &[UrlRecord]) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for r in records {
        if ids.last().map(String::as_str) != Some(r.blob.as_str()) {
            ids.push(r.blob.clone());
        }
    }
    ids
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
