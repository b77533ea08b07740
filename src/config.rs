//! Read-only configuration tables and tuning constants.

use std::collections::HashMap;
use std::sync::OnceLock;

/// Blobs larger than this are excluded to bound per-blob processing cost.
pub const MAX_BLOB_BYTES: usize = 1_000_000;

/// Minimum fraction of printable characters for a blob to count as text.
pub const MIN_PRINTABLE_RATIO: f64 = 0.95;

/// Minimum codepoint count before a writing system counts as present.
pub const SCRIPT_MIN_CHARS: usize = 20;

/// Identifiers per batched timestamp-lookup request.
pub const LOOKUP_BATCH: usize = 5_000;

/// Per-batch timeout for the external lookup command, in seconds.
pub const LOOKUP_TIMEOUT_SECS: u64 = 120;

/// Domains shown in the console summary.
pub const TOP_K_DOMAINS: usize = 10;

/// Hosting-platform domains considered part of the dataset's own
/// ecosystem. Everything else is a foreign reference.
const INTERNAL_DOMAINS: &[&str] = &[
    "github.com",
    "gist.github.com",
    "raw.githubusercontent.com",
    "api.github.com",
    "gitlab.com",
    "bitbucket.org",
];

/// Exact-match membership test against the internal-domain set.
/// Callers are expected to pass an already lower-cased domain.
pub fn is_internal_domain(domain: &str) -> bool {
    INTERNAL_DOMAINS.contains(&domain)
}

const EXT_TO_LANG: &[(&str, &str)] = &[
    ("py", "Python"),
    ("ipynb", "Jupyter"),
    ("js", "JavaScript"),
    ("ts", "TypeScript"),
    ("tsx", "TypeScript"),
    ("jsx", "JavaScript"),
    ("java", "Java"),
    ("c", "C"),
    ("h", "C"),
    ("cpp", "C++"),
    ("cc", "C++"),
    ("cxx", "C++"),
    ("hpp", "C++"),
    ("hh", "C++"),
    ("rb", "Ruby"),
    ("go", "Go"),
    ("php", "PHP"),
    ("rs", "Rust"),
    ("kt", "Kotlin"),
    ("swift", "Swift"),
    ("m", "Objective-C"),
    ("scala", "Scala"),
    ("cs", "C#"),
    ("sh", "Shell"),
    ("bash", "Shell"),
    ("zsh", "Shell"),
    ("ps1", "PowerShell"),
    ("json", "JSON"),
    ("yml", "YAML"),
    ("yaml", "YAML"),
    ("xml", "XML"),
    ("toml", "TOML"),
    ("ini", "INI"),
    ("cfg", "CFG"),
    ("md", "Markdown"),
    ("rst", "reStructuredText"),
    ("txt", "Text"),
    ("html", "HTML"),
    ("css", "CSS"),
    ("sql", "SQL"),
    ("pl", "Perl"),
    ("lua", "Lua"),
    ("r", "R"),
    ("dart", "Dart"),
];

/// Map a file extension (without the leading dot) to a language label.
/// Unrecognized extensions yield `None` and contribute nothing.
pub fn language_for_ext(ext: &str) -> Option<&'static str> {
    static TABLE: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    TABLE
        .get_or_init(|| EXT_TO_LANG.iter().copied().collect())
        .get(ext)
        .copied()
}
