//! Content-dump ingestion and best-effort text decoding.
//!
//! Input format is one blob per line: `identifier;base64-or-raw-content`.
//! Payloads that are not valid base64 are taken as raw bytes. A blob is
//! text-like only if it has no null byte, fits the size cap, and at
//! least 95% of its decoded characters are printable or common
//! whitespace.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine as _;

use crate::config::{MAX_BLOB_BYTES, MIN_PRINTABLE_RATIO};
use crate::types::TextBlob;

/// Why a payload was excluded from the text-like set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reject {
    /// Raw bytes contain a null byte.
    Binary,
    /// Raw size exceeds the per-blob cap.
    Oversized,
    /// Empty after decoding, or below the printable-character ratio.
    NotPrintable,
}

/// Tallies from one pass over a content dump.
#[derive(Debug, Default, Clone)]
pub struct DecodeStats {
    /// Raw content lines seen (the "total sampled" denominator).
    pub lines: usize,
    /// Lines with no payload field, an empty payload, or the
    /// lookup service's "no blob" sentinel.
    pub unavailable: usize,
    pub binary: usize,
    pub oversized: usize,
    pub not_printable: usize,
    pub text_like: usize,
}

/// Decode raw payload bytes into text, or reject the blob as non-text.
pub fn decode_payload(raw: &[u8]) -> std::result::Result<String, Reject> {
    if raw.contains(&0) {
        return Err(Reject::Binary);
    }
    if raw.len() > MAX_BLOB_BYTES {
        return Err(Reject::Oversized);
    }
    // Lossy decode, then drop replacement chars to approximate
    // "ignore undecodable bytes".
    let text: String = String::from_utf8_lossy(raw)
        .chars()
        .filter(|&ch| ch != '\u{FFFD}')
        .collect();
    if text.is_empty() {
        return Err(Reject::NotPrintable);
    }
    let total = text.chars().count();
    let printable = text
        .chars()
        .filter(|&ch| ch >= ' ' || matches!(ch, '\n' | '\r' | '\t'))
        .count();
    if (printable as f64) / (total.max(1) as f64) < MIN_PRINTABLE_RATIO {
        return Err(Reject::NotPrintable);
    }
    Ok(text)
}

/// Read a content dump and return the text-like blobs plus tallies.
///
/// Lines are split on the first `;`. The payload is tried as base64
/// first and falls back to raw bytes, per the lookup-service contract.
pub fn parse_content_file(path: &Path) -> Result<(Vec<TextBlob>, DecodeStats)> {
    let file = File::open(path)
        .with_context(|| format!("opening content file {}", path.display()))?;
    let mut reader = BufReader::new(file);

    let mut blobs = Vec::new();
    let mut stats = DecodeStats::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let n = reader
            .read_until(b'\n', &mut buf)
            .with_context(|| format!("reading {}", path.display()))?;
        if n == 0 {
            break;
        }
        if buf.last() == Some(&b'\n') {
            buf.pop();
        }
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
        stats.lines += 1;

        let Some(sep) = buf.iter().position(|&b| b == b';') else {
            stats.unavailable += 1;
            continue;
        };
        let (id_bytes, rest) = buf.split_at(sep);
        let payload = &rest[1..];
        if id_bytes.is_empty() || payload.is_empty() || payload == b"no blob" {
            stats.unavailable += 1;
            continue;
        }
        let id = String::from_utf8_lossy(id_bytes).into_owned();

        let raw = match std::str::from_utf8(payload).ok().and_then(|s| B64.decode(s).ok()) {
            Some(decoded) => decoded,
            None => payload.to_vec(),
        };

        match decode_payload(&raw) {
            Ok(text) => {
                stats.text_like += 1;
                blobs.push(TextBlob { id, text });
            }
            Err(Reject::Binary) => stats.binary += 1,
            Err(Reject::Oversized) => stats.oversized += 1,
            Err(Reject::NotPrintable) => stats.not_printable += 1,
        }
    }

    Ok((blobs, stats))
}
