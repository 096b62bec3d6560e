//! Insurer letter map and per-coverage carrier resolution.
//!
//! Two phases: the "INSURER X:" lines are parsed into an explicit
//! `InsurerMap` first, then each coverage row resolves its letter against
//! that map. Nothing is shared between calls.

use std::sync::LazyLock;

use regex::Regex;

use super::sections::CoverageSection;
use crate::models::InsurerMap;

static INSURER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[ \t]*INSURER[ \t]+([A-F])[ \t]*:[ \t]*(.+?)[ \t]*$").unwrap()
});

static TRAILING_NAIC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:\s+NAIC\s*#?\s*:?)?\s+\d{5}\s*$").unwrap());

static INSR_LTR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bINSR\.?\s*LTR\.?\s*[:#]?\s*([A-F])\b").unwrap());

/// Parse every "INSURER <letter>: <carrier>" line. A trailing NAIC number
/// is dropped; a later line for the same letter wins.
pub fn parse_insurers(text: &str) -> InsurerMap {
    let mut map = InsurerMap::default();
    for caps in INSURER_LINE.captures_iter(text) {
        let (Some(letter), Some(name)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        let name = TRAILING_NAIC.replace(name.as_str(), "");
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        if let Some(letter) = letter.as_str().chars().next() {
            map.insert(letter, name);
        }
    }
    map
}

/// Insurer letter for one coverage row.
///
/// An explicit "INSR LTR" in the block or row wins; otherwise the first
/// single-letter A–F token in the row, but only if that letter is a known
/// insurer.
pub fn resolve_letter(section: &CoverageSection<'_>, insurers: &InsurerMap) -> Option<char> {
    let explicit = INSR_LTR
        .captures(section.block)
        .or_else(|| INSR_LTR.captures(section.row))
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().chars().next())
        .map(|c| c.to_ascii_uppercase());
    if explicit.is_some() {
        return explicit;
    }

    section
        .row
        .split_whitespace()
        .filter_map(|token| {
            let mut chars = token.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if ('A'..='F').contains(&c) => Some(c),
                _ => None,
            }
        })
        .find(|c| insurers.contains(*c))
}
