//! URL extraction and internal/foreign domain classification.

use std::sync::OnceLock;

use regex::Regex;

use crate::config;
use crate::types::{UrlClass, UrlRecord};

fn url_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"https?://[^\s)"'>]+"#).unwrap())
}

/// Extract every URL-shaped substring from a blob's text, in order.
/// Occurrences are not deduplicated; the raw match is the URL's
/// identity. Matches whose domain segment is missing are dropped.
pub fn extract(blob: &str, text: &str) -> Vec<UrlRecord> {
    let mut records = Vec::new();
    for m in url_pattern().find_iter(text) {
        let url = m.as_str();
        let Some(domain) = domain_of(url) else {
            continue;
        };
        let class = if config::is_internal_domain(&domain) {
            UrlClass::Internal
        } else {
            UrlClass::Foreign
        };
        records.push(UrlRecord {
            blob: blob.to_string(),
            url: url.to_string(),
            domain,
            class,
            year: None,
        });
    }
    records
}

/// The third `/`-delimited segment of a URL, lower-cased.
/// `None` for malformed URLs with no such segment.
pub fn domain_of(url: &str) -> Option<String> {
    let host = url.split('/').nth(2)?;
    if host.is_empty() {
        return None;
    }
    Some(host.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_every_occurrence() {
        let text = "see https://a.example.com/x and https://a.example.com/x \
                    plus http://b.example.org/y";
        let records = extract("blob", text);
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].url, "https://a.example.com/x");
        assert_eq!(records[2].url, "http://b.example.org/y");
    }

    #[test]
    fn match_stops_at_quotes_and_brackets() {
        let records = extract("blob", r#"<a href="https://x.test/page">link</a>"#);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].url, "https://x.test/page");
    }

    #[test]
    fn domain_is_lowercased() {
        assert_eq!(domain_of("https://GitHub.com/o/r"), Some("github.com".into()));
    }

    #[test]
    fn malformed_url_has_no_domain() {
        assert_eq!(domain_of("https:"), None);
        assert_eq!(domain_of("http:///path"), None);
    }

    #[test]
    fn internal_vs_foreign() {
        let records = extract(
            "blob",
            "https://github.com/o/r and https://evil.example.com/p and https://GitHub.com/x",
        );
        let classes: Vec<_> = records.iter().map(|r| r.class).collect();
        assert_eq!(
            classes,
            vec![UrlClass::Internal, UrlClass::Foreign, UrlClass::Internal]
        );
    }
}
