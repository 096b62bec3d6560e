//! Coverage-table blocks.
//!
//! Each coverage row is anchored on its printed label. The block runs from
//! the label to the next coverage label or `window` bytes, whichever comes
//! first, so fields from one row never bleed into the next. A label only
//! counts where it opens a row: at the start of a line, or after an INSR LTR
//! letter or a checkbox mark. Carrier names such as "State Workers
//! Compensation Fund" on an `INSURER X:` line are not rows.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use super::window::{floor_boundary, line_bounds};
use crate::models::CoverageKind;

static LABELS: LazyLock<Vec<(CoverageKind, Regex)>> = LazyLock::new(|| {
    vec![
        (
            CoverageKind::General,
            Regex::new(r"(?i)COMMERCIAL\s+GENERAL\s+LIABILITY").unwrap(),
        ),
        (
            CoverageKind::Auto,
            Regex::new(r"(?i)AUTOMOBILE\s+LIABILITY").unwrap(),
        ),
        (
            CoverageKind::WorkersComp,
            Regex::new(r"(?i)WORKERS\s*'?\s*COMPENSATION").unwrap(),
        ),
        (
            CoverageKind::Umbrella,
            Regex::new(r"(?i)UMBRELLA\s+LIAB").unwrap(),
        ),
    ]
});

/// True when everything before `start` on its line is a row marker: an
/// insurer letter A-F, an `X` or `[X]` checkbox, at most two of them.
fn opens_row(text: &str, start: usize) -> bool {
    let (line_start, _) = line_bounds(text, start);
    let mut markers = 0;
    for token in text[line_start..start].split_whitespace() {
        let is_marker = matches!(token, "X" | "[X]")
            || (token.len() == 1 && matches!(token.as_bytes()[0], b'A'..=b'F'));
        if !is_marker {
            return false;
        }
        markers += 1;
    }
    markers <= 2
}

/// Row-opening matches of one label.
fn row_matches<'t>(re: &'t Regex, text: &'t str) -> impl Iterator<Item = regex::Match<'t>> + 't {
    re.find_iter(text).filter(move |m| opens_row(text, m.start()))
}

/// One located coverage block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverageSection<'a> {
    pub kind: CoverageKind,
    /// Byte offset of the label in the source text.
    pub start: usize,
    /// Byte offset one past the block end.
    pub end: usize,
    /// Label through the end of the window.
    pub block: &'a str,
    /// Whole line carrying the label.
    pub row: &'a str,
}

impl<'a> CoverageSection<'a> {
    /// True when a byte offset of the source text falls inside this block.
    pub fn contains(&self, offset: usize) -> bool {
        (self.start..self.end).contains(&offset)
    }
}

/// Located coverage blocks, keyed by coverage.
#[derive(Debug, Clone, Default)]
pub struct Sections<'a> {
    sections: BTreeMap<CoverageKind, CoverageSection<'a>>,
}

impl<'a> Sections<'a> {
    /// Anchor every coverage label present in `text`.
    pub fn locate(text: &'a str, window: usize) -> Self {
        let all_starts: Vec<usize> = LABELS
            .iter()
            .flat_map(|(_, re)| row_matches(re, text).map(|m| m.start()))
            .collect();

        let mut sections = BTreeMap::new();
        for (kind, re) in LABELS.iter() {
            let Some(m) = row_matches(re, text).next() else {
                continue;
            };
            let start = m.start();
            let next_label = all_starts
                .iter()
                .copied()
                .filter(|s| *s >= m.end())
                .min()
                .unwrap_or(text.len());
            let end = floor_boundary(text, next_label.min(start.saturating_add(window)));
            let (row_start, row_end) = line_bounds(text, start);

            sections.insert(
                *kind,
                CoverageSection {
                    kind: *kind,
                    start,
                    end,
                    block: &text[start..end],
                    row: &text[row_start..row_end],
                },
            );
        }
        Self { sections }
    }

    pub fn get(&self, kind: CoverageKind) -> Option<&CoverageSection<'a>> {
        self.sections.get(&kind)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CoverageSection<'a>> {
        self.sections.values()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// Start offsets of every row-opening coverage label in `text`, for other
/// passes that need to stop at the coverage table.
pub fn label_starts(text: &str) -> impl Iterator<Item = usize> + '_ {
    LABELS
        .iter()
        .flat_map(move |(_, re)| row_matches(re, text).map(|m| m.start()))
}
