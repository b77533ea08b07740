use std::collections::BTreeSet;

use serde::Serialize;

/// A blob that survived the decode pass, with its best-effort text.
pub struct TextBlob {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UrlClass {
    Internal,
    Foreign,
}

impl UrlClass {
    pub fn label(self) -> &'static str {
        match self {
            UrlClass::Internal => "internal",
            UrlClass::Foreign => "foreign",
        }
    }
}

/// One extracted URL occurrence. The raw matched substring is the
/// identity of the URL; no normalization happens anywhere.
#[derive(Debug, Clone)]
pub struct UrlRecord {
    pub blob: String,
    pub url: String,
    pub domain: String,
    pub class: UrlClass,
    /// First-seen year of the containing blob. Absent until the
    /// temporal join runs, or when the lookup resolves nothing.
    pub year: Option<i32>,
}

/// Writing systems tracked by the script classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Script {
    Latin,
    Cyr,
    Cjk,
}

impl Script {
    pub fn label(self) -> &'static str {
        match self {
            Script::Latin => "latin",
            Script::Cyr => "cyr",
            Script::Cjk => "cjk",
        }
    }
}

/// Per-blob local classification results (everything computable
/// without an external lookup).
pub struct BlobAnalysis {
    pub urls: Vec<UrlRecord>,
    pub scripts: BTreeSet<Script>,
}
