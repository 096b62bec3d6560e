//! Narrow a program's requirement catalog to the records one
//! subcontractor must satisfy, at exactly one tier.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::debug;

use crate::models::{is_catch_all_trade, RequirementRecord};

/// Tier assigned to records that carry none.
pub const STANDARD_TIER: &str = "standard";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedRequirements {
    /// Normalized tier label, `None` for an untiered catalog.
    pub tier: Option<String>,
    pub requirements: Vec<RequirementRecord>,
}

/// "Tier A", "tier_a", "A", "1" → `a`; anything else lower-cased and trimmed.
pub fn normalize_tier(label: &str) -> String {
    let lower = label.trim().to_lowercase();
    let stripped = lower
        .strip_prefix("tier")
        .map(|rest| rest.trim_start_matches([' ', '_', '-']))
        .filter(|rest| !rest.is_empty())
        .unwrap_or(&lower);
    match stripped {
        "1" => "a".to_string(),
        "2" => "b".to_string(),
        "3" => "c".to_string(),
        "4" => "d".to_string(),
        other => other.to_string(),
    }
}

/// `a`=4, `b`=3, `c`=2, `d`=1, everything else 0.
pub fn tier_priority(normalized: &str) -> u8 {
    match normalized {
        "a" => 4,
        "b" => 3,
        "c" => 2,
        "d" => 1,
        _ => 0,
    }
}

fn tier_of(record: &RequirementRecord) -> String {
    record
        .tier
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .map(normalize_tier)
        .unwrap_or_else(|| STANDARD_TIER.to_string())
}

/// An empty selection or one naming "all trades"/"all other".
pub fn selects_all_trades(trades: &[String]) -> bool {
    trades.is_empty() || trades.iter().any(|t| is_catch_all_trade(t))
}

pub fn resolve_requirements(
    trades: &[String],
    requirements: &[RequirementRecord],
) -> ResolvedRequirements {
    let applicable: Vec<&RequirementRecord> =
        requirements.iter().filter(|r| r.applies_to(trades)).collect();

    let tiered = applicable
        .iter()
        .any(|r| r.tier.as_deref().is_some_and(|t| !t.trim().is_empty()));
    if !tiered {
        debug!(records = applicable.len(), "Untiered catalog, keeping all applicable records");
        return ResolvedRequirements {
            tier: None,
            requirements: applicable.into_iter().cloned().collect(),
        };
    }

    // BTreeSet iterates labels in order, so the first label of the chosen
    // priority is the lexicographically smallest.
    let present: BTreeSet<String> = applicable.iter().map(|r| tier_of(r)).collect();
    let all_trades = selects_all_trades(trades);
    let target = if all_trades {
        present.iter().map(|t| tier_priority(t)).min()
    } else {
        present.iter().map(|t| tier_priority(t)).max()
    };
    let selected = target
        .and_then(|p| present.iter().find(|t| tier_priority(t) == p))
        .cloned();

    let requirements = applicable
        .into_iter()
        .filter(|r| selected.as_deref() == Some(tier_of(r).as_str()))
        .cloned()
        .collect::<Vec<_>>();

    debug!(
        tier = ?selected,
        all_trades,
        kept = requirements.len(),
        "Requirements resolved"
    );

    ResolvedRequirements {
        tier: selected,
        requirements,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InsuranceType;

    fn make_req(tier: Option<&str>, trades: &[&str]) -> RequirementRecord {
        let mut req = RequirementRecord::new("prog", InsuranceType::GeneralLiability)
            .with_trades(trades.iter().copied());
        req.tier = tier.map(str::to_string);
        req
    }

    fn trades(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn normalizes_tier_spellings() {
        for label in ["Tier A", "tier_a", "A", " a ", "TIER-A", "1", "Tier 1"] {
            assert_eq!(normalize_tier(label), "a", "{label}");
        }
        assert_eq!(normalize_tier("Tier 4"), "d");
        assert_eq!(normalize_tier("Standard"), "standard");
        assert_eq!(normalize_tier("tier"), "tier");
    }

    #[test]
    fn specific_trade_takes_most_restrictive_tier() {
        let catalog = vec![
            make_req(Some("A"), &["Plumbing"]),
            make_req(Some("C"), &["All Other Trades"]),
            make_req(Some("B"), &["Electrical"]),
        ];
        let resolved = resolve_requirements(&trades(&["Plumbing"]), &catalog);
        assert_eq!(resolved.tier.as_deref(), Some("a"));
        assert_eq!(resolved.requirements.len(), 1);
        assert_eq!(resolved.requirements[0].trades, vec!["Plumbing".to_string()]);
    }

    #[test]
    fn all_trades_selection_takes_baseline_tier() {
        let catalog = vec![
            make_req(Some("A"), &[]),
            make_req(Some("C"), &[]),
        ];
        let resolved = resolve_requirements(&[], &catalog);
        assert_eq!(resolved.tier.as_deref(), Some("c"));

        let resolved = resolve_requirements(&trades(&["All Trades"]), &catalog);
        assert_eq!(resolved.tier.as_deref(), Some("c"));
    }

    #[test]
    fn unmatched_trade_scope_is_dropped() {
        let catalog = vec![
            make_req(Some("A"), &["Roofing"]),
            make_req(Some("B"), &["Plumbing"]),
        ];
        let resolved = resolve_requirements(&trades(&["plumbing"]), &catalog);
        assert_eq!(resolved.tier.as_deref(), Some("b"));
    }

    #[test]
    fn untiered_catalog_returns_everything_applicable() {
        let catalog = vec![make_req(None, &[]), make_req(None, &["Roofing"]), make_req(None, &["Plumbing"])];
        let resolved = resolve_requirements(&trades(&["Plumbing"]), &catalog);
        assert_eq!(resolved.tier, None);
        assert_eq!(resolved.requirements.len(), 2);
    }

    #[test]
    fn untiered_records_rank_as_standard() {
        let catalog = vec![make_req(None, &[]), make_req(Some("B"), &[])];
        let resolved = resolve_requirements(&[], &catalog);
        assert_eq!(resolved.tier.as_deref(), Some(STANDARD_TIER));
        assert_eq!(resolved.requirements.len(), 1);
        assert!(resolved.requirements[0].tier.is_none());
    }

    #[test]
    fn equal_priority_ties_pick_smallest_label() {
        let catalog = vec![make_req(Some("premium"), &[]), make_req(Some("basic"), &[])];
        let resolved = resolve_requirements(&trades(&["Plumbing"]), &catalog);
        assert_eq!(resolved.tier.as_deref(), Some("basic"));
    }

    #[test]
    fn resolution_is_deterministic() {
        let catalog = vec![
            make_req(Some("B"), &["Plumbing"]),
            make_req(Some("A"), &["Plumbing", "HVAC"]),
            make_req(Some("D"), &[]),
        ];
        let first = resolve_requirements(&trades(&["Plumbing"]), &catalog);
        for _ in 0..10 {
            assert_eq!(resolve_requirements(&trades(&["Plumbing"]), &catalog), first);
        }
        assert_eq!(first.tier.as_deref(), Some("a"));
    }
}
