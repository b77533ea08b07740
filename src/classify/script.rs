//! Writing-system mixture detection over decoded blob text.

use std::collections::BTreeSet;

use crate::config::SCRIPT_MIN_CHARS;
use crate::types::Script;

/// Classify which scripts appear in `text` with non-trivial frequency.
///
/// Every codepoint is bucketed into one of three coarse ranges (CJK
/// covers ideographs, kana and hangul together); a script makes the
/// set only once its count reaches the threshold, so a stray emoji or
/// loanword never flags a blob as multi-script.
pub fn script_mix(text: &str) -> BTreeSet<Script> {
    let mut latin = 0usize;
    let mut cyr = 0usize;
    let mut cjk = 0usize;

    for ch in text.chars() {
        match ch as u32 {
            0x0041..=0x024F | 0x1E00..=0x1EFF => latin += 1,
            0x0400..=0x052F => cyr += 1,
            0x4E00..=0x9FFF | 0x3040..=0x30FF | 0xAC00..=0xD7AF => cjk += 1,
            _ => {}
        }
    }

    let mut scripts = BTreeSet::new();
    if latin >= SCRIPT_MIN_CHARS {
        scripts.insert(Script::Latin);
    }
    if cyr >= SCRIPT_MIN_CHARS {
        scripts.insert(Script::Cyr);
    }
    if cjk >= SCRIPT_MIN_CHARS {
        scripts.insert(Script::Cjk);
    }
    scripts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balanced_latin_cyrillic_is_multi_script() {
        let text = format!("{}{}", "a".repeat(25), "б".repeat(25));
        let scripts = script_mix(&text);
        assert_eq!(
            scripts.into_iter().collect::<Vec<_>>(),
            vec![Script::Latin, Script::Cyr]
        );
    }

    #[test]
    fn incidental_cyrillic_stays_below_threshold() {
        let text = format!("{}{}", "mostly latin text here plus ", "бвгде");
        let scripts = script_mix(&text);
        assert_eq!(scripts.into_iter().collect::<Vec<_>>(), vec![Script::Latin]);
    }

    #[test]
    fn cjk_ranges_share_one_bucket() {
        // 10 ideographs + 10 katakana together clear the threshold.
        let text = format!("{}{}", "漢".repeat(10), "カ".repeat(10));
        let scripts = script_mix(&text);
        assert_eq!(scripts.into_iter().collect::<Vec<_>>(), vec![Script::Cjk]);
    }

    #[test]
    fn digits_and_punctuation_count_nowhere() {
        assert!(script_mix("1234567890 ,.;:!? 1234567890 ,.;:!?").is_empty());
    }
}
