pub mod lang;
pub mod script;
pub mod urls;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use crate::types::{BlobAnalysis, TextBlob};

/// Local classification of one blob: URL extraction plus script mix.
/// Pure per-blob, no cross-blob state.
pub fn analyze_blob(blob: &TextBlob) -> BlobAnalysis {
    BlobAnalysis {
        urls: urls::extract(&blob.id, &blob.text),
        scripts: script::script_mix(&blob.text),
    }
}

/// Classify all blobs, chunked through rayon with a progress bar.
/// Output order matches input order.
pub fn analyze_all(blobs: &[TextBlob]) -> Vec<BlobAnalysis> {
    let pb = ProgressBar::new(blobs.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})")
            .unwrap()
            .progress_chars("#>-"),
    );

    let mut analyses = Vec::with_capacity(blobs.len());
    for chunk in blobs.chunks(500) {
        let results: Vec<_> = chunk.par_iter().map(analyze_blob).collect();
        analyses.extend(results);
        pb.inc(chunk.len() as u64);
    }
    pb.finish_and_clear();
    analyses
}
