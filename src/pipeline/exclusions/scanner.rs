use tracing::{debug, info};

use super::patterns::{without_negations, EXCLUSION_PATTERNS};
use crate::config::EngineConfig;
use crate::models::{ExclusionRecord, ExclusionType};

/// Scan certificate or policy text for exclusionary clauses.
///
/// One record per matching line. A line that matches several families is
/// classified by the most specific one.
pub fn scan_exclusions(text: &str) -> Vec<ExclusionRecord> {
    scan_exclusions_with(text, &EngineConfig::default())
}

pub fn scan_exclusions_with(text: &str, config: &EngineConfig) -> Vec<ExclusionRecord> {
    let lines: Vec<&str> = text.lines().collect();
    let mut records = Vec::new();

    for (idx, line) in lines.iter().enumerate() {
        let Some(exclusion_type) = classify_line(line) else {
            continue;
        };
        debug!(line_number = idx + 1, exclusion = %exclusion_type, "Exclusion line");
        records.push(ExclusionRecord {
            exclusion_type,
            matched_line: line.trim().to_string(),
            context: context_around(&lines, idx, config),
            line_number: idx + 1,
        });
    }

    info!(lines = lines.len(), exclusions = records.len(), "Exclusion scan complete");
    records
}

/// Most specific family matching the line's affirmative statements.
/// Catalog order breaks ties.
fn classify_line(line: &str) -> Option<ExclusionType> {
    let affirmative = without_negations(line);
    let mut best: Option<ExclusionType> = None;
    for pattern in EXCLUSION_PATTERNS.iter() {
        if !pattern.regex.is_match(&affirmative) {
            continue;
        }
        let ty = pattern.exclusion_type;
        if best.map_or(true, |b| ty.specificity() > b.specificity()) {
            best = Some(ty);
        }
    }
    best
}

fn context_around(lines: &[&str], idx: usize, config: &EngineConfig) -> String {
    let start = idx.saturating_sub(config.context_lines_before);
    let end = (idx + config.context_lines_after + 1).min(lines.len());
    lines[start..end].join("\n")
}
