//! Extension-implied language sets from blob path metadata.
//!
//! The metadata file holds `identifier;path` (or tab-delimited) pairs,
//! one per line; a blob can appear under many paths across projects.
//! Paths with unrecognized extensions contribute no label, so blobs
//! without any mapped path correctly end up with an empty set.

use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};

use crate::config;

pub type LanguageSets = HashMap<String, BTreeSet<&'static str>>;

/// Build per-blob language-label sets from a path-metadata file.
pub fn parse_path_metadata(path: &Path) -> Result<LanguageSets> {
    let file = File::open(path)
        .with_context(|| format!("opening path metadata {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut sets: LanguageSets = HashMap::new();
    for line in reader.split(b'\n') {
        let line = line.with_context(|| format!("reading {}", path.display()))?;
        let line = String::from_utf8_lossy(&line);
        let line = line.trim_end_matches('\r');
        let Some((blob, file_path)) = split_pair(line) else {
            continue;
        };
        if let Some(lang) = language_of_path(file_path) {
            sets.entry(blob.to_string()).or_default().insert(lang);
        }
    }
    Ok(sets)
}

/// Language label implied by a path's extension, if the table knows it.
pub fn language_of_path(file_path: &str) -> Option<&'static str> {
    let ext = Path::new(file_path).extension()?.to_str()?;
    config::language_for_ext(ext)
}

fn split_pair(line: &str) -> Option<(&str, &str)> {
    let (blob, rest) = line
        .split_once(';')
        .or_else(|| line.split_once('\t'))?;
    if blob.is_empty() || rest.is_empty() {
        return None;
    }
    Some((blob, rest))
}

/// Blobs whose label set spans more than one language.
pub fn multi_language_count(sets: &LanguageSets) -> usize {
    sets.values().filter(|langs| langs.len() > 1).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn single_extension_is_not_multi_language() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "b1;src/tool.py").unwrap();
        writeln!(f, "b1;scripts/tool.py").unwrap();
        f.flush().unwrap();

        let sets = parse_path_metadata(f.path()).unwrap();
        let langs = &sets["b1"];
        assert_eq!(langs.iter().copied().collect::<Vec<_>>(), vec!["Python"]);
        assert_eq!(multi_language_count(&sets), 0);
    }

    #[test]
    fn two_extensions_make_a_multi_language_blob() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "b1;src/tool.py").unwrap();
        writeln!(f, "b1;web/tool.js").unwrap();
        writeln!(f, "b2;README.md").unwrap();
        f.flush().unwrap();

        let sets = parse_path_metadata(f.path()).unwrap();
        assert_eq!(sets["b1"].len(), 2);
        assert_eq!(multi_language_count(&sets), 1);
    }

    #[test]
    fn unknown_extensions_and_bare_names_yield_nothing() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "b1;Makefile").unwrap();
        writeln!(f, "b1;data/blob.unknownext").unwrap();
        writeln!(f, "not-a-pair-line").unwrap();
        f.flush().unwrap();

        let sets = parse_path_metadata(f.path()).unwrap();
        assert!(sets.is_empty());
    }

    #[test]
    fn tab_delimited_pairs_are_accepted() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "b1\tsrc/main.rs").unwrap();
        f.flush().unwrap();

        let sets = parse_path_metadata(f.path()).unwrap();
        assert!(sets["b1"].contains("Rust"));
    }
}
