//! Aggregation and report output.
//!
//! All counts are exact over the processed sample. Outputs are
//! sink-only flat files: key-value summaries, delimited tables, and a
//! machine-readable JSON rollup.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::classify::lang::{self, LanguageSets};
use crate::config::TOP_K_DOMAINS;
use crate::decode::DecodeStats;
use crate::types::{Script, UrlClass, UrlRecord};

#[derive(Debug, Clone, Serialize)]
pub struct DomainCount {
    pub domain: String,
    pub count: u64,
}

/// Blobs-per-label entry for the language and script breakdowns.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LabelCount {
    pub label: String,
    pub blobs: u64,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct YearRow {
    pub year: i32,
    pub internal: u64,
    pub foreign: u64,
}

/// Everything the reporter derives from one run.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub total_sampled: usize,
    pub unavailable: usize,
    pub rejected_binary: usize,
    pub rejected_oversized: usize,
    pub rejected_not_printable: usize,
    pub text_like: usize,
    pub blobs_with_urls: usize,
    pub total_urls: usize,
    pub foreign_urls: usize,
    pub foreign_fraction: f64,
    pub urls_with_year: usize,
    pub multi_language_blobs: usize,
    pub multi_script_blobs: usize,
    pub domains: Vec<DomainCount>,
    pub languages: Vec<LabelCount>,
    pub scripts: Vec<LabelCount>,
    pub year_series: Vec<YearRow>,
}

/// Combine decode tallies, year-joined URL records, and the
/// independent language/script classifications into one summary.
pub fn aggregate(
    stats: &DecodeStats,
    records: &[UrlRecord],
    script_sets: &[BTreeSet<Script>],
    lang_sets: &LanguageSets,
) -> RunSummary {
    let total_urls = records.len();
    let foreign_urls = records
        .iter()
        .filter(|r| r.class == UrlClass::Foreign)
        .count();
    let blobs_with_urls = count_distinct_blobs(records);
    let urls_with_year = records.iter().filter(|r| r.year.is_some()).count();

    RunSummary {
        total_sampled: stats.lines,
        unavailable: stats.unavailable,
        rejected_binary: stats.binary,
        rejected_oversized: stats.oversized,
        rejected_not_printable: stats.not_printable,
        text_like: stats.text_like,
        blobs_with_urls,
        total_urls,
        foreign_urls,
        foreign_fraction: foreign_fraction(foreign_urls, total_urls),
        urls_with_year,
        multi_language_blobs: lang::multi_language_count(lang_sets),
        multi_script_blobs: script_sets.iter().filter(|s| s.len() > 1).count(),
        domains: domain_table(records),
        languages: language_table(lang_sets),
        scripts: script_table(script_sets),
        year_series: year_series(records),
    }
}

/// Blobs per language label, descending with alphabetical tie-breaks.
pub fn language_table(lang_sets: &LanguageSets) -> Vec<LabelCount> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for langs in lang_sets.values() {
        for &lang in langs {
            *counts.entry(lang).or_default() += 1;
        }
    }
    sorted_labels(counts)
}

/// Blobs per writing-system label, descending with alphabetical
/// tie-breaks.
pub fn script_table(script_sets: &[BTreeSet<Script>]) -> Vec<LabelCount> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for scripts in script_sets {
        for script in scripts {
            *counts.entry(script.label()).or_default() += 1;
        }
    }
    sorted_labels(counts)
}

fn sorted_labels(counts: HashMap<&str, u64>) -> Vec<LabelCount> {
    let mut table: Vec<LabelCount> = counts
        .into_iter()
        .map(|(label, blobs)| LabelCount {
            label: label.to_string(),
            blobs,
        })
        .collect();
    table.sort_by(|a, b| b.blobs.cmp(&a.blobs).then_with(|| a.label.cmp(&b.label)));
    table
}

/// foreign / total, with the zero-total case pinned to 0.0 rather
/// than left as an undefined ratio.
pub fn foreign_fraction(foreign: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        foreign as f64 / total as f64
    }
}

/// Domain frequency table, descending by count with alphabetical
/// tie-breaks so output is deterministic.
pub fn domain_table(records: &[UrlRecord]) -> Vec<DomainCount> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for r in records {
        *counts.entry(r.domain.as_str()).or_default() += 1;
    }
    let mut table: Vec<DomainCount> = counts
        .into_iter()
        .map(|(domain, count)| DomainCount {
            domain: domain.to_string(),
            count,
        })
        .collect();
    table.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.domain.cmp(&b.domain)));
    table
}

/// Per-year internal/foreign counts over the records that resolved a
/// year, ascending. Only observed years are emitted.
pub fn year_series(records: &[UrlRecord]) -> Vec<YearRow> {
    let mut by_year: BTreeMap<i32, (u64, u64)> = BTreeMap::new();
    for r in records {
        let Some(year) = r.year else {
            continue;
        };
        let entry = by_year.entry(year).or_default();
        match r.class {
            UrlClass::Internal => entry.0 += 1,
            UrlClass::Foreign => entry.1 += 1,
        }
    }
    by_year
        .into_iter()
        .map(|(year, (internal, foreign))| YearRow {
            year,
            internal,
            foreign,
        })
        .collect()
}

fn count_distinct_blobs(records: &[UrlRecord]) -> usize {
    // Records arrive grouped by blob, so consecutive dedup suffices.
    let mut count = 0;
    let mut last: Option<&str> = None;
    for r in records {
        if last != Some(r.blob.as_str()) {
            count += 1;
            last = Some(r.blob.as_str());
        }
    }
    count
}

/// Write every output file under `outdir`.
pub fn write_reports(outdir: &Path, summary: &RunSummary, records: &[UrlRecord]) -> Result<()> {
    fs::create_dir_all(outdir)
        .with_context(|| format!("creating output directory {}", outdir.display()))?;

    write_text(outdir, "foreign_url_totals.txt", |w| {
        writeln!(w, "Total URLs: {}", summary.total_urls)?;
        writeln!(w, "Foreign URLs: {}", summary.foreign_urls)?;
        writeln!(w, "Percent foreign: {:.2}%", summary.foreign_fraction * 100.0)?;
        Ok(())
    })?;

    write_text(outdir, "url_domains.tsv", |w| {
        for d in &summary.domains {
            writeln!(w, "{}\t{}", d.domain, d.count)?;
        }
        Ok(())
    })?;

    write_text(outdir, "urls_over_time.tsv", |w| {
        writeln!(w, "blob\tdomain\tclass\tyear")?;
        for r in records {
            let Some(year) = r.year else {
                continue;
            };
            writeln!(w, "{}\t{}\t{}\t{}", r.blob, r.domain, r.class.label(), year)?;
        }
        Ok(())
    })?;

    write_text(outdir, "year_series.tsv", |w| {
        writeln!(w, "year\tinternal\tforeign")?;
        for row in &summary.year_series {
            writeln!(w, "{}\t{}\t{}", row.year, row.internal, row.foreign)?;
        }
        Ok(())
    })?;

    write_text(outdir, "multilang_summary.txt", |w| {
        writeln!(
            w,
            "Programming multi-language blobs: {}",
            summary.multi_language_blobs
        )?;
        writeln!(
            w,
            "Natural-language multi-script blobs: {}",
            summary.multi_script_blobs
        )?;
        Ok(())
    })?;

    write_text(outdir, "text_blob_count.txt", |w| {
        writeln!(
            w,
            "Text-like blobs in sample: {} of {}",
            summary.text_like, summary.total_sampled
        )?;
        Ok(())
    })?;

    let json_path = outdir.join("summary.json");
    let file = File::create(&json_path)
        .with_context(|| format!("creating {}", json_path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), summary)
        .with_context(|| format!("writing {}", json_path.display()))?;

    info!("reports written to {}", outdir.display());
    Ok(())
}

fn write_text<F>(outdir: &Path, name: &str, body: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let path = outdir.join(name);
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    let mut w = BufWriter::new(file);
    body(&mut w).with_context(|| format!("writing {}", path.display()))?;
    w.flush().with_context(|| format!("flushing {}", path.display()))?;
    Ok(())
}

/// Console summary in the style of the run's closing stats block.
pub fn print_summary(summary: &RunSummary) {
    println!("\n=== Summary ===");
    println!("Total blobs sampled:  {}", summary.total_sampled);
    println!("Text-like blobs:      {}", summary.text_like);
    println!("Blobs with URLs:      {}", summary.blobs_with_urls);
    println!("Total URLs (raw):     {}", summary.total_urls);
    println!(
        "Foreign URLs (raw):   {} ({:.2}%)",
        summary.foreign_urls,
        summary.foreign_fraction * 100.0
    );
    println!("URLs with year:       {}", summary.urls_with_year);
    println!("Top {} URL domains:", TOP_K_DOMAINS.min(summary.domains.len()));
    for d in summary.domains.iter().take(TOP_K_DOMAINS) {
        println!("  {}: {}", d.domain, d.count);
    }
    if !summary.languages.is_empty() {
        println!("Top languages (blobs):");
        for l in summary.languages.iter().take(TOP_K_DOMAINS) {
            println!("  {}: {}", l.label, l.blobs);
        }
    }
    if !summary.scripts.is_empty() {
        println!("Scripts (blobs):");
        for s in &summary.scripts {
            println!("  {}: {}", s.label, s.blobs);
        }
    }
    println!(
        "Programming multi-language blobs:    {}",
        summary.multi_language_blobs
    );
    println!(
        "Natural-language multi-script blobs: {}",
        summary.multi_script_blobs
    );
    println!("================");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(blob: &str, domain: &str, class: UrlClass, year: Option<i32>) -> UrlRecord {
        UrlRecord {
            blob: blob.into(),
            url: format!("https://{domain}/x"),
            domain: domain.into(),
            class,
            year,
        }
    }

    #[test]
    fn foreign_fraction_guards_empty_input() {
        assert_eq!(foreign_fraction(0, 0), 0.0);
        assert_eq!(foreign_fraction(1, 2), 0.5);
    }

    #[test]
    fn domain_table_sorts_desc_with_stable_ties() {
        let records = vec![
            record("b1", "b.test", UrlClass::Foreign, None),
            record("b1", "a.test", UrlClass::Foreign, None),
            record("b2", "b.test", UrlClass::Foreign, None),
            record("b3", "c.test", UrlClass::Foreign, None),
        ];
        let table = domain_table(&records);
        assert_eq!(table[0].domain, "b.test");
        assert_eq!(table[0].count, 2);
        assert_eq!(table[1].domain, "a.test");
        assert_eq!(table[2].domain, "c.test");
    }

    #[test]
    fn year_series_is_ascending_and_split_by_class() {
        let records = vec![
            record("b1", "x.test", UrlClass::Foreign, Some(2015)),
            record("b2", "github.com", UrlClass::Internal, Some(2018)),
            record("b3", "y.test", UrlClass::Foreign, Some(2015)),
            record("b4", "z.test", UrlClass::Foreign, None),
        ];
        let series = year_series(&records);
        assert_eq!(
            series,
            vec![
                YearRow { year: 2015, internal: 0, foreign: 2 },
                YearRow { year: 2018, internal: 1, foreign: 0 },
            ]
        );
    }

    #[test]
    fn aggregate_counts_blobs_and_urls() {
        let stats = DecodeStats {
            lines: 5,
            text_like: 3,
            ..Default::default()
        };
        let records = vec![
            record("b1", "x.test", UrlClass::Foreign, Some(2015)),
            record("b1", "x.test", UrlClass::Foreign, Some(2015)),
            record("b2", "github.com", UrlClass::Internal, Some(2018)),
        ];
        let mut lang_sets = LanguageSets::new();
        lang_sets.insert("b1".into(), BTreeSet::from(["Python", "JavaScript"]));
        lang_sets.insert("b2".into(), BTreeSet::from(["Rust"]));
        let script_sets = vec![
            BTreeSet::from([Script::Latin, Script::Cyr]),
            BTreeSet::from([Script::Latin]),
            BTreeSet::new(),
        ];

        let summary = aggregate(&stats, &records, &script_sets, &lang_sets);
        assert_eq!(summary.total_urls, 3);
        assert_eq!(summary.foreign_urls, 2);
        assert_eq!(summary.blobs_with_urls, 2);
        assert_eq!(summary.urls_with_year, 3);
        assert_eq!(summary.multi_language_blobs, 1);
        assert_eq!(summary.multi_script_blobs, 1);
        assert!((summary.foreign_fraction - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(
            summary.scripts,
            vec![
                LabelCount { label: "latin".into(), blobs: 2 },
                LabelCount { label: "cyr".into(), blobs: 1 },
            ]
        );
        assert_eq!(summary.languages[0].blobs, 1);
    }
}
