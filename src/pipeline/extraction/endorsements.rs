//! Endorsement flags: additional insured, waiver of subrogation, primary
//! and non-contributory.
//!
//! A flag is true when at least one occurrence of its phrase is not negated
//! within the lookback window, false when every occurrence is negated, and
//! absent when the phrase never appears.

use std::sync::LazyLock;

use regex::Regex;

use super::window::behind;

static NEGATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:NO|NOT|EXCLUDED|WITHOUT|EXCEPT|EXCLUDING)\b").unwrap()
});

/// The standard ACORD footer explains additional-insured and waiver wording
/// on every certificate; it says nothing about this policy.
static ACORD_DISCLAIMER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)IMPORTANT:\s*If\s+the\s+certificate\s+holder\s+is\s+an\s+ADDITIONAL\s+INSURED(?:.{0,600}?endorsement\(s\)\.|[^\n]*)",
    )
    .unwrap()
});

/// One endorsement flag and the phrases that assert it.
pub struct Endorsement {
    pub field: &'static str,
    phrase: Regex,
}

pub static ENDORSEMENTS: LazyLock<Vec<Endorsement>> = LazyLock::new(|| {
    vec![
        Endorsement {
            field: "additional_insured",
            phrase: Regex::new(r"(?i)\bADDITIONAL\s+INSURED\b").unwrap(),
        },
        Endorsement {
            field: "waiver_of_subrogation",
            phrase: Regex::new(r"(?i)\bWAIVER\s+OF\s+SUBROGATION\b|\bSUBROGATION\s+(?:IS\s+)?WAIVED\b")
                .unwrap(),
        },
        Endorsement {
            field: "primary_non_contributory",
            phrase: Regex::new(r"(?i)\bPRIMARY\s+(?:AND|&)\s+NON[-\s]?CONTRIBUTORY\b").unwrap(),
        },
    ]
});

/// Remove the ACORD additional-insured disclaimer paragraph.
pub fn strip_disclaimer(text: &str) -> std::borrow::Cow<'_, str> {
    ACORD_DISCLAIMER.replace_all(text, "")
}

/// Non-negation scan for one phrase.
pub fn scan_flag(text: &str, phrase: &Regex, lookback: usize) -> Option<bool> {
    let mut seen = false;
    for m in phrase.find_iter(text) {
        seen = true;
        if !NEGATION.is_match(behind(text, m.start(), lookback)) {
            return Some(true);
        }
    }
    seen.then_some(false)
}

/// Scan every endorsement flag. Only phrases that occur are reported.
pub fn extract_endorsements(text: &str, lookback: usize) -> Vec<(&'static str, bool)> {
    let body = strip_disclaimer(text);
    ENDORSEMENTS
        .iter()
        .filter_map(|e| scan_flag(&body, &e.phrase, lookback).map(|v| (e.field, v)))
        .collect()
}

/// Single-flag lookup by field name.
pub fn extract_endorsement(text: &str, field: &str, lookback: usize) -> Option<bool> {
    let endorsement = ENDORSEMENTS.iter().find(|e| e.field == field)?;
    scan_flag(&strip_disclaimer(text), &endorsement.phrase, lookback)
}
