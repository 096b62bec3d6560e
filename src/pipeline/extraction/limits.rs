//! Dollar limits from the LIMITS column.
//!
//! A limit is only read when its ACORD label is immediately followed by an
//! amount. Auto, workers comp and umbrella limits are read inside their own
//! coverage block; GL limits anywhere outside the umbrella block.

use std::sync::LazyLock;

use regex::Regex;

use super::sections::Sections;
use super::window::behind;
use crate::models::{limit_field, CoverageKind, LimitField, LIMIT_FIELDS};

/// Optional parenthetical qualifier, then the amount.
const AMOUNT: &str = r"(?:\s*\([^)\n]{0,40}\))?\s*:?\s*\$?\s*([0-9][0-9,]*(?:\.\d{1,2})?)";

struct LimitPattern {
    field: &'static str,
    regex: Regex,
}

fn label_pattern(field: &str) -> &'static str {
    match field {
        "gl_each_occurrence" | "umbrella_each_occurrence" => r"EACH\s+OCCURRENCE",
        "gl_damage_to_rented_premises" => r"DAMAGE\s+TO\s+RENTED\s+PREMISES",
        "gl_med_exp" => r"MED\.?\s+EXP(?:ENSE)?",
        "gl_personal_adv_injury" => r"PERSONAL\s*&\s*ADV(?:ERTISING)?\.?\s+INJURY",
        "gl_general_aggregate" => r"GENERAL\s+AGGREGATE",
        "gl_products_completed_ops" => {
            r"PRODUCTS\s*-?\s*COMP(?:LETED)?\s*/\s*OP(?:ERATIONS)?S?\s+AGG(?:REGATE)?"
        }
        "auto_combined_single_limit" => r"COMBINED\s+SINGLE\s+LIMIT",
        "auto_bodily_injury_per_person" => r"BODILY\s+INJURY\s*\(\s*Per\s+person\s*\)",
        "auto_bodily_injury_per_accident" => r"BODILY\s+INJURY\s*\(\s*Per\s+accident\s*\)",
        "auto_property_damage" => r"PROPERTY\s+DAMAGE",
        "wc_el_each_accident" => r"E\.?\s*L\.?\s+EACH\s+ACCIDENT",
        "wc_el_disease_each_employee" => r"E\.?\s*L\.?\s+DISEASE\s*-?\s*EA(?:CH)?\.?\s+EMPLOYEE",
        "wc_el_disease_policy_limit" => r"E\.?\s*L\.?\s+DISEASE\s*-?\s*POLICY\s+LIMIT",
        "umbrella_aggregate" => r"\bAGGREGATE",
        _ => r"$^",
    }
}

static PATTERNS: LazyLock<Vec<LimitPattern>> = LazyLock::new(|| {
    LIMIT_FIELDS
        .iter()
        .map(|l| LimitPattern {
            field: l.field,
            regex: Regex::new(&format!("(?i){}{}", label_pattern(l.field), AMOUNT)).unwrap(),
        })
        .collect()
});

/// Strip `$` and thousands separators, then parse.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != ',' && *c != '$').collect();
    cleaned.trim().parse::<f64>().ok()
}

/// Read one limit. GL limits ignore matches inside the umbrella block;
/// every other coverage only looks inside its own block.
pub fn extract_limit(text: &str, limit: &LimitField, sections: &Sections<'_>) -> Option<f64> {
    let pattern = PATTERNS.iter().find(|p| p.field == limit.field)?;
    let umbrella = sections.get(CoverageKind::Umbrella);

    match limit.kind {
        CoverageKind::Umbrella => {
            let section = umbrella?;
            pattern
                .regex
                .captures_iter(section.block)
                .filter(|caps| {
                    limit.field != "umbrella_aggregate"
                        || caps.get(0).is_some_and(|m| !preceded_by_general(section.block, m.start()))
                })
                .find_map(|caps| caps.get(1).and_then(|m| parse_amount(m.as_str())))
        }
        CoverageKind::General => pattern
            .regex
            .captures_iter(text)
            .filter(|caps| {
                caps.get(0)
                    .is_some_and(|m| !umbrella.is_some_and(|u| u.contains(m.start())))
            })
            .find_map(|caps| caps.get(1).and_then(|m| parse_amount(m.as_str()))),
        CoverageKind::Auto | CoverageKind::WorkersComp => pattern
            .regex
            .captures_iter(sections.get(limit.kind)?.block)
            .find_map(|caps| caps.get(1).and_then(|m| parse_amount(m.as_str()))),
    }
}

/// Every limit found in the text, keyed by field name.
pub fn extract_limits(text: &str, sections: &Sections<'_>) -> Vec<(&'static str, f64)> {
    LIMIT_FIELDS
        .iter()
        .filter_map(|l| extract_limit(text, l, sections).map(|amount| (l.field, amount)))
        .collect()
}

/// Single-field lookup by name, for schema-driven callers.
pub fn extract_limit_named(text: &str, field: &str, sections: &Sections<'_>) -> Option<f64> {
    limit_field(field).and_then(|l| extract_limit(text, l, sections))
}

fn preceded_by_general(block: &str, idx: usize) -> bool {
    behind(block, idx, 12).trim_end().to_uppercase().ends_with("GENERAL")
}
