//! Requirement records from the text of an insurance program document.
//!
//! Recognized layouts:
//! - tier/trade table rows: "Tier 1 General Contractor $2,000,000"
//! - prime subcontractor line: "Prime Subcontractor: $5,000,000"
//! - tier-wide line: "All Tier 2 trades: $1,000,000"
//! - per-type lines for workers compensation, auto and umbrella/excess
//!
//! Tier and prime lines set the GL each-occurrence minimum. Per-type lines
//! apply program-wide, so each one is repeated under every GL row's tier
//! and trade scope.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info};

use crate::models::{InsuranceType, RequirementRecord};
use crate::pipeline::extraction::limits::parse_amount;

static TIER_TRADE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)Tier[ \t]+(\d+)[ \t]+([^$\n]+?)[ \t]*\$[ \t]*([0-9][0-9,]*)").unwrap());

static PRIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)Prime\s+Subcontractor[:\s]+\$\s*([0-9][0-9,]*)").unwrap());

static TIER_WIDE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:All\s+)?Tier\s+(\d+)(?:\s+trades?)?[:\s]+\$\s*([0-9][0-9,]*)").unwrap()
});

static WORKERS_COMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)Workers?\s*['"]?\s*Comp(?:ensation)?[:\s]+\$\s*([0-9][0-9,]*)"#).unwrap()
});

static AUTO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Auto(?:mobile)?(?:\s+Liability)?[:\s]+\$\s*([0-9][0-9,]*)").unwrap()
});

static UMBRELLA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:Umbrella|Excess)(?:\s+Liability)?[:\s]+\$\s*([0-9][0-9,]*)").unwrap()
});

fn gl_record(program_id: &str, tier: &str, trade: String, amount: f64) -> RequirementRecord {
    RequirementRecord::new(program_id, InsuranceType::GeneralLiability)
        .with_tier(format!("Tier {tier}"))
        .with_trades([trade])
        .with_minimum("gl_each_occurrence", amount)
}

fn capture_amount(caps: &regex::Captures<'_>, group: usize) -> Option<f64> {
    caps.get(group).and_then(|m| parse_amount(m.as_str()))
}

pub fn parse_program_text(program_id: &str, text: &str) -> Vec<RequirementRecord> {
    let mut records = Vec::new();

    for caps in TIER_TRADE.captures_iter(text) {
        let (Some(tier), Some(trade), Some(amount)) =
            (caps.get(1), caps.get(2), capture_amount(&caps, 3))
        else {
            continue;
        };
        let trade = trade.as_str().trim().trim_end_matches(':').trim();
        // "Tier 1 trades: $X" is the tier-wide layout, handled below.
        if trade.is_empty() || trade.eq_ignore_ascii_case("trade") || trade.eq_ignore_ascii_case("trades") {
            continue;
        }
        debug!(tier = tier.as_str(), trade, amount, "Tier/trade row");
        records.push(gl_record(program_id, tier.as_str(), trade.to_string(), amount));
    }

    for caps in PRIME.captures_iter(text) {
        if let Some(amount) = capture_amount(&caps, 1) {
            records.push(gl_record(program_id, "1", "Prime Subcontractor".to_string(), amount));
        }
    }

    for caps in TIER_WIDE.captures_iter(text) {
        let (Some(tier), Some(amount)) = (caps.get(1), capture_amount(&caps, 2)) else {
            continue;
        };
        let tier = tier.as_str();
        let mut record = gl_record(program_id, tier, format!("Tier {tier} (All Trades)"), amount);
        record.all_other_trades = true;
        records.push(record);
    }

    let scopes: Vec<(Option<String>, Vec<String>, bool)> = records
        .iter()
        .map(|r| (r.tier.clone(), r.trades.clone(), r.all_other_trades))
        .collect();
    let per_type = [
        (&*WORKERS_COMP, InsuranceType::WorkersCompensation, "wc_el_each_accident"),
        (&*AUTO, InsuranceType::AutoLiability, "auto_combined_single_limit"),
        (&*UMBRELLA, InsuranceType::UmbrellaPolicy, "umbrella_each_occurrence"),
    ];
    for (re, insurance_type, field) in per_type {
        for caps in re.captures_iter(text) {
            let Some(amount) = capture_amount(&caps, 1) else {
                continue;
            };
            let base = RequirementRecord::new(program_id, insurance_type).with_minimum(field, amount);
            if scopes.is_empty() {
                records.push(base);
                continue;
            }
            for (tier, trades, all_other) in &scopes {
                let mut scoped = base.clone().with_trades(trades.iter().cloned());
                scoped.tier = tier.clone();
                scoped.all_other_trades = *all_other;
                records.push(scoped);
            }
        }
    }

    info!(program_id, requirements = records.len(), "Parsed insurance program text");
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::requirements::resolve_requirements;

    const PROGRAM: &str = "\
INSURANCE REQUIREMENTS
Tier 1 General Contractor $2,000,000
Tier 2 Plumbing $1,000,000
All Tier 3 trades: $500,000
Workers Compensation: $1,000,000";

    #[test]
    fn recognizes_tier_rows_and_tier_wide_lines() {
        let records = parse_program_text("p1", PROGRAM);
        let gl: Vec<_> = records
            .iter()
            .filter(|r| r.insurance_type == "general_liability")
            .collect();
        assert_eq!(gl.len(), 3);
        assert_eq!(gl[0].trades, vec!["General Contractor".to_string()]);
        assert_eq!(gl[0].minimums["gl_each_occurrence"], 2_000_000.0);
        assert_eq!(gl[1].tier.as_deref(), Some("Tier 2"));
        assert!(gl[2].all_other_trades);
        assert_eq!(gl[2].minimums["gl_each_occurrence"], 500_000.0);
    }

    #[test]
    fn per_type_lines_follow_each_gl_scope() {
        let records = parse_program_text("p1", PROGRAM);
        let wc: Vec<_> = records
            .iter()
            .filter(|r| r.insurance_type == "workers_compensation")
            .collect();
        assert_eq!(wc.len(), 3);
        assert!(wc.iter().all(|r| r.minimums["wc_el_each_accident"] == 1_000_000.0));
        assert_eq!(wc[1].trades, vec!["Plumbing".to_string()]);
        assert!(wc[2].all_other_trades);
    }

    #[test]
    fn prime_subcontractor_is_tier_one() {
        let records = parse_program_text("p1", "Prime Subcontractor: $5,000,000");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].tier.as_deref(), Some("Tier 1"));
        assert_eq!(records[0].trades, vec!["Prime Subcontractor".to_string()]);
    }

    #[test]
    fn untiered_program_types() {
        let records = parse_program_text("p1", "Auto Liability: $1,000,000\nExcess: $5,000,000");
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.tier.is_none()));
        assert_eq!(records[1].minimums["umbrella_each_occurrence"], 5_000_000.0);
    }

    #[test]
    fn parsed_program_resolves_for_a_trade() {
        let records = parse_program_text("p1", PROGRAM);
        let resolved = resolve_requirements(&["Plumbing".to_string()], &records);
        // Plumbing row is tier 2 (b); the tier-3 catch-all (c) ranks lower.
        assert_eq!(resolved.tier.as_deref(), Some("b"));
        assert!(resolved.requirements.iter().any(|r| r.insurance_type == "workers_compensation"));
    }

    #[test]
    fn no_matches_no_records() {
        assert!(parse_program_text("p1", "Nothing to see here").is_empty());
    }
}
