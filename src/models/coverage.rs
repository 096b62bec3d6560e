//! Typed per-coverage view over a flat field map.
//!
//! Each ACORD coverage block gets its own struct so a limit can only ever be
//! read from the block it belongs to. `Coverage::collect` is the one place
//! that maps field-name prefixes onto blocks.

use chrono::NaiveDate;
use serde::Serialize;

use super::certificate::FieldMap;
use super::enums::CoverageKind;

/// A dollar-limit field on the ACORD form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LimitField {
    /// Flat field name (`gl_each_occurrence`).
    pub field: &'static str,
    pub kind: CoverageKind,
    /// Label as printed in the LIMITS column.
    pub label: &'static str,
    /// Title used in deficiency text.
    pub title: &'static str,
}

const fn limit(
    field: &'static str,
    kind: CoverageKind,
    label: &'static str,
    title: &'static str,
) -> LimitField {
    LimitField { field, kind, label, title }
}

/// Every limit the engine knows, in ACORD print order per block.
pub const LIMIT_FIELDS: &[LimitField] = &[
    limit("gl_each_occurrence", CoverageKind::General, "EACH OCCURRENCE", "General Liability Each Occurrence"),
    limit("gl_damage_to_rented_premises", CoverageKind::General, "DAMAGE TO RENTED PREMISES (Ea occurrence)", "General Liability Damage to Rented Premises"),
    limit("gl_med_exp", CoverageKind::General, "MED EXP (Any one person)", "General Liability Medical Expense"),
    limit("gl_personal_adv_injury", CoverageKind::General, "PERSONAL & ADV INJURY", "General Liability Personal & Advertising Injury"),
    limit("gl_general_aggregate", CoverageKind::General, "GENERAL AGGREGATE", "General Liability General Aggregate"),
    limit("gl_products_completed_ops", CoverageKind::General, "PRODUCTS - COMP/OP AGG", "General Liability Products-Completed Operations Aggregate"),
    limit("auto_combined_single_limit", CoverageKind::Auto, "COMBINED SINGLE LIMIT (Ea accident)", "Auto Liability Combined Single Limit"),
    limit("auto_bodily_injury_per_person", CoverageKind::Auto, "BODILY INJURY (Per person)", "Auto Liability Bodily Injury Per Person"),
    limit("auto_bodily_injury_per_accident", CoverageKind::Auto, "BODILY INJURY (Per accident)", "Auto Liability Bodily Injury Per Accident"),
    limit("auto_property_damage", CoverageKind::Auto, "PROPERTY DAMAGE (Per accident)", "Auto Liability Property Damage"),
    limit("wc_el_each_accident", CoverageKind::WorkersComp, "E.L. EACH ACCIDENT", "Employers Liability Each Accident"),
    limit("wc_el_disease_each_employee", CoverageKind::WorkersComp, "E.L. DISEASE - EA EMPLOYEE", "Employers Liability Disease Each Employee"),
    limit("wc_el_disease_policy_limit", CoverageKind::WorkersComp, "E.L. DISEASE - POLICY LIMIT", "Employers Liability Disease Policy Limit"),
    limit("umbrella_each_occurrence", CoverageKind::Umbrella, "EACH OCCURRENCE", "Umbrella Each Occurrence"),
    limit("umbrella_aggregate", CoverageKind::Umbrella, "AGGREGATE", "Umbrella Aggregate"),
];

pub fn limit_field(field: &str) -> Option<&'static LimitField> {
    LIMIT_FIELDS.iter().find(|l| l.field == field)
}

pub fn limits_for(kind: CoverageKind) -> impl Iterator<Item = &'static LimitField> {
    LIMIT_FIELDS.iter().filter(move |l| l.kind == kind)
}

/// `$1,000,000`; cents only when non-zero.
pub fn format_usd(amount: f64) -> String {
    let whole = amount.trunc() as i64;
    let digits = whole.abs().to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if whole < 0 { "-" } else { "" };
    let cents = (amount.fract().abs() * 100.0).round() as i64;
    if cents > 0 {
        format!("{sign}${grouped}.{cents:02}")
    } else {
        format!("{sign}${grouped}")
    }
}

/// Fields shared by every coverage row.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PolicyTerms {
    pub policy_number: Option<String>,
    pub effective_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
    pub insurer_letter: Option<char>,
    pub insurer: Option<String>,
}

impl PolicyTerms {
    fn from_fields(kind: CoverageKind, fields: &FieldMap) -> Self {
        let p = kind.prefix();
        Self {
            policy_number: fields.text(&format!("{p}_policy_number")).map(str::to_string),
            effective_date: fields.date(&format!("{p}_effective_date")),
            expiration_date: fields.date(&format!("{p}_expiration_date")),
            insurer_letter: fields
                .text(&format!("{p}_insurer_letter"))
                .and_then(|s| s.chars().next()),
            insurer: fields.text(&format!("{p}_insurer")).map(str::to_string),
        }
    }
}

/// Common interface over the four coverage blocks.
pub trait CoverageBlock {
    fn kind(&self) -> CoverageKind;

    fn terms(&self) -> &PolicyTerms;

    /// `(limit, amount)` pairs in print order; amount is `None` when absent.
    fn limits(&self) -> Vec<(&'static LimitField, Option<f64>)>;

    fn policy_number(&self) -> Option<&str> {
        self.terms().policy_number.as_deref()
    }

    fn effective_date(&self) -> Option<NaiveDate> {
        self.terms().effective_date
    }

    fn expiration_date(&self) -> Option<NaiveDate> {
        self.terms().expiration_date
    }

    fn insurer_letter(&self) -> Option<char> {
        self.terms().insurer_letter
    }
}

macro_rules! coverage_struct {
    ($name:ident, $kind:expr, { $($limit:ident => $field:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Default, PartialEq, Serialize)]
        pub struct $name {
            pub terms: PolicyTerms,
            $(pub $limit: Option<f64>),+
        }

        impl $name {
            pub fn from_fields(fields: &FieldMap) -> Self {
                Self {
                    terms: PolicyTerms::from_fields($kind, fields),
                    $($limit: fields.number($field)),+
                }
            }
        }

        impl CoverageBlock for $name {
            fn kind(&self) -> CoverageKind {
                $kind
            }

            fn terms(&self) -> &PolicyTerms {
                &self.terms
            }

            fn limits(&self) -> Vec<(&'static LimitField, Option<f64>)> {
                [$(limit_field($field).map(|l| (l, self.$limit))),+]
                    .into_iter()
                    .flatten()
                    .collect()
            }
        }
    };
}

coverage_struct!(GlCoverage, CoverageKind::General, {
    each_occurrence => "gl_each_occurrence",
    damage_to_rented_premises => "gl_damage_to_rented_premises",
    med_exp => "gl_med_exp",
    personal_adv_injury => "gl_personal_adv_injury",
    general_aggregate => "gl_general_aggregate",
    products_completed_ops => "gl_products_completed_ops",
});

coverage_struct!(AutoCoverage, CoverageKind::Auto, {
    combined_single_limit => "auto_combined_single_limit",
    bodily_injury_per_person => "auto_bodily_injury_per_person",
    bodily_injury_per_accident => "auto_bodily_injury_per_accident",
    property_damage => "auto_property_damage",
});

coverage_struct!(WcCoverage, CoverageKind::WorkersComp, {
    el_each_accident => "wc_el_each_accident",
    el_disease_each_employee => "wc_el_disease_each_employee",
    el_disease_policy_limit => "wc_el_disease_policy_limit",
});

coverage_struct!(UmbrellaCoverage, CoverageKind::Umbrella, {
    each_occurrence => "umbrella_each_occurrence",
    aggregate => "umbrella_aggregate",
});

/// One coverage block on a certificate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Coverage {
    General(GlCoverage),
    Auto(AutoCoverage),
    WorkersComp(WcCoverage),
    Umbrella(UmbrellaCoverage),
}

impl Coverage {
    /// Build the block for `kind`, present only when the map holds at least
    /// one field for it.
    pub fn from_fields(kind: CoverageKind, fields: &FieldMap) -> Option<Self> {
        if !fields.has_coverage(kind) {
            return None;
        }
        Some(Self::build(kind, fields))
    }

    /// Build the block for `kind` even when no field exists (all `None`).
    pub fn build(kind: CoverageKind, fields: &FieldMap) -> Self {
        match kind {
            CoverageKind::General => Self::General(GlCoverage::from_fields(fields)),
            CoverageKind::Auto => Self::Auto(AutoCoverage::from_fields(fields)),
            CoverageKind::WorkersComp => Self::WorkersComp(WcCoverage::from_fields(fields)),
            CoverageKind::Umbrella => Self::Umbrella(UmbrellaCoverage::from_fields(fields)),
        }
    }

    /// All blocks present in the map, in ACORD order.
    pub fn collect(fields: &FieldMap) -> Vec<Self> {
        CoverageKind::ALL
            .iter()
            .filter_map(|kind| Self::from_fields(*kind, fields))
            .collect()
    }

    pub fn block(&self) -> &dyn CoverageBlock {
        match self {
            Self::General(c) => c,
            Self::Auto(c) => c,
            Self::WorkersComp(c) => c,
            Self::Umbrella(c) => c,
        }
    }

    pub fn kind(&self) -> CoverageKind {
        self.block().kind()
    }
}
