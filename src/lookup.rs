//! Batched first-seen timestamp lookups via an external key-value
//! command (`getValues`-style: identifiers on stdin, one
//! `identifier;...;unix_ts;...` line per resolvable identifier on
//! stdout).
//!
//! Batches run sequentially. A failed, empty, or timed-out batch
//! contributes zero resolved entries; corrupt lines inside a batch are
//! skipped individually. Nothing here aborts the run.

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Datelike, TimeZone, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::warn;

use crate::config::{LOOKUP_BATCH, LOOKUP_TIMEOUT_SECS};

pub struct LookupClient {
    bin: PathBuf,
    map: String,
    batch_size: usize,
    timeout: Duration,
}

impl LookupClient {
    pub fn new(bin: PathBuf, map: String) -> Self {
        LookupClient {
            bin,
            map,
            batch_size: LOOKUP_BATCH,
            timeout: Duration::from_secs(LOOKUP_TIMEOUT_SECS),
        }
    }

    pub fn batch_size(mut self, n: usize) -> Self {
        self.batch_size = n.max(1);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolve each identifier to its first-seen calendar year.
    /// Identifiers the service cannot resolve are simply absent from
    /// the result.
    pub async fn resolve_years(&self, ids: &[String]) -> HashMap<String, i32> {
        let mut years = HashMap::new();
        if ids.is_empty() {
            return years;
        }

        let pb = ProgressBar::new(ids.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40} {pos}/{len} ids")
                .unwrap()
                .progress_chars("=> "),
        );

        for chunk in ids.chunks(self.batch_size) {
            match tokio::time::timeout(self.timeout, self.run_batch(chunk)).await {
                Ok(Ok(lines)) => {
                    parse_year_lines(&lines, &mut years);
                }
                Ok(Err(e)) => {
                    warn!("lookup batch of {} ids failed: {e:#}", chunk.len());
                }
                Err(_) => {
                    warn!(
                        "lookup batch of {} ids timed out after {:?}; treating as empty",
                        chunk.len(),
                        self.timeout
                    );
                }
            }
            pb.inc(chunk.len() as u64);
        }
        pb.finish_and_clear();
        years
    }

    /// One request/response round trip: spawn the lookup command, feed
    /// the batch on stdin, collect non-blank stdout lines.
    async fn run_batch(&self, ids: &[String]) -> Result<Vec<String>> {
        let mut child = Command::new(&self.bin)
            .arg(&self.map)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("spawning lookup command {}", self.bin.display()))?;

        let mut stdin = child.stdin.take().context("lookup child has no stdin")?;
        let payload = format!("{}\n", ids.join("\n"));
        // Write concurrently with the read so a chatty child can't
        // deadlock on full pipes.
        let writer = tokio::spawn(async move {
            let _ = stdin.write_all(payload.as_bytes()).await;
        });

        let output = child
            .wait_with_output()
            .await
            .context("waiting for lookup command")?;
        let _ = writer.await;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if !stderr.trim().is_empty() {
                warn!("lookup exited with {}: {}", output.status, stderr.trim());
            }
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(stdout
            .lines()
            .filter(|l| !l.trim().is_empty())
            .map(str::to_string)
            .collect())
    }
}

/// Parse `identifier;...;unix_ts;...` lines into `years`. The
/// timestamp is the first integer-parseable field after the
/// identifier; lines with none are skipped.
pub fn parse_year_lines(lines: &[String], years: &mut HashMap<String, i32>) {
    for line in lines {
        let mut parts = line.split(';');
        let Some(blob) = parts.next() else {
            continue;
        };
        if blob.is_empty() {
            continue;
        }
        let Some(ts) = parts.find_map(|p| p.trim().parse::<i64>().ok()) else {
            continue;
        };
        let Some(year) = year_of_timestamp(ts) else {
            continue;
        };
        years.insert(blob.to_string(), year);
    }
}

fn year_of_timestamp(ts: i64) -> Option<i32> {
    Utc.timestamp_opt(ts, 0).single().map(|dt| dt.year())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn first_integer_field_wins() {
        let mut years = HashMap::new();
        parse_year_lines(
            &lines(&["b1;author@host;1420070400;tree", "b2;1514764800"]),
            &mut years,
        );
        assert_eq!(years["b1"], 2015);
        assert_eq!(years["b2"], 2018);
    }

    #[test]
    fn corrupt_lines_are_skipped_individually() {
        let mut years = HashMap::new();
        parse_year_lines(
            &lines(&["b1;1420070400", "garbage-without-delimiter", "b2;none;of;these;parse"]),
            &mut years,
        );
        assert_eq!(years.len(), 1);
        assert_eq!(years["b1"], 2015);
    }

    #[test]
    fn out_of_range_timestamp_is_skipped() {
        let mut years = HashMap::new();
        parse_year_lines(&[format!("b1;{}", i64::MAX)], &mut years);
        assert!(years.is_empty());
    }

    #[test]
    fn batching_is_semantically_transparent() {
        let all = lines(&[
            "b1;1420070400",
            "b2;1514764800",
            "b3;1262304000",
            "b4;1609459200",
            "b5;946684800",
        ]);

        let mut unbatched = HashMap::new();
        parse_year_lines(&all, &mut unbatched);

        let mut batched = HashMap::new();
        for chunk in all.chunks(2) {
            parse_year_lines(chunk, &mut batched);
        }

        assert_eq!(unbatched, batched);
        assert_eq!(unbatched.len(), 5);
    }
}
