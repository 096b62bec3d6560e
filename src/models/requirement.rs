use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::enums::{InsuranceType, InvalidEnum};

/// Trade text that marks a record (or a selection) as covering every trade.
const CATCH_ALL_MARKERS: [&str; 2] = ["all other", "all trades"];

pub fn is_catch_all_trade(trade: &str) -> bool {
    let lower = trade.trim().to_lowercase();
    CATCH_ALL_MARKERS.iter().any(|m| lower.contains(m))
}

/// One row of a program's minimum-coverage catalog.
///
/// `insurance_type` stays a raw string: a record with an unknown type is a
/// validation problem for that record only, not a deserialization failure for
/// the whole catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementRecord {
    pub program_id: String,
    /// Empty means every trade.
    #[serde(default)]
    pub trades: Vec<String>,
    #[serde(default)]
    pub all_other_trades: bool,
    #[serde(default)]
    pub tier: Option<String>,
    pub insurance_type: String,
    /// Certificate field name → minimum amount.
    #[serde(default)]
    pub minimums: BTreeMap<String, f64>,
    #[serde(default)]
    pub additional_insured_required: bool,
    #[serde(default)]
    pub waiver_required: bool,
    #[serde(default)]
    pub notes: Option<String>,
}

impl RequirementRecord {
    pub fn new(program_id: impl Into<String>, insurance_type: InsuranceType) -> Self {
        Self {
            program_id: program_id.into(),
            trades: Vec::new(),
            all_other_trades: false,
            tier: None,
            insurance_type: insurance_type.as_str().to_string(),
            minimums: BTreeMap::new(),
            additional_insured_required: false,
            waiver_required: false,
            notes: None,
        }
    }

    pub fn with_tier(mut self, tier: impl Into<String>) -> Self {
        self.tier = Some(tier.into());
        self
    }

    pub fn with_trades<I, S>(mut self, trades: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.trades = trades.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_minimum(mut self, field: impl Into<String>, amount: f64) -> Self {
        self.minimums.insert(field.into(), amount);
        self
    }

    pub fn requiring_additional_insured(mut self) -> Self {
        self.additional_insured_required = true;
        self
    }

    pub fn requiring_waiver(mut self) -> Self {
        self.waiver_required = true;
        self
    }

    pub fn parsed_type(&self) -> Result<InsuranceType, InvalidEnum> {
        InsuranceType::from_str(self.insurance_type.trim())
    }

    pub fn is_catch_all(&self) -> bool {
        self.all_other_trades || self.trades.iter().any(|t| is_catch_all_trade(t))
    }

    /// Trade scope is empty, a catch-all, or shares a trade with `trades`.
    pub fn applies_to(&self, trades: &[String]) -> bool {
        if self.trades.is_empty() || self.is_catch_all() {
            return true;
        }
        self.trades.iter().any(|own| {
            let own = own.trim();
            trades.iter().any(|t| t.trim().eq_ignore_ascii_case(own))
        })
    }
}
