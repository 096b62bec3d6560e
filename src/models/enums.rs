use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raised when a stored or caller-supplied string names no known variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid {field} value: {value}")]
pub struct InvalidEnum {
    pub field: String,
    pub value: String,
}

/// Macro to generate enum with as_str + std::str::FromStr pattern
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $s)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = InvalidEnum;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

// Declaration order doubles as rank: Critical sorts first.
str_enum!(Severity {
    Critical => "critical",
    High => "high",
    Medium => "medium",
    Low => "low",
});

str_enum!(AnalysisStatus {
    Approved => "approved",
    Deficient => "deficient",
});

str_enum!(DeficiencyCategory {
    Coverage => "coverage",
    Limits => "limits",
    Dates => "dates",
    Endorsements => "endorsements",
    Identity => "identity",
    Exclusion => "exclusion",
});

str_enum!(InsuranceType {
    GeneralLiability => "general_liability",
    AutoLiability => "auto_liability",
    WorkersCompensation => "workers_compensation",
    UmbrellaPolicy => "umbrella_policy",
    ProfessionalLiability => "professional_liability",
    PollutionLiability => "pollution_liability",
});

str_enum!(CoverageKind {
    General => "gl",
    Auto => "auto",
    WorkersComp => "wc",
    Umbrella => "umbrella",
});

str_enum!(FieldKind {
    String => "string",
    Number => "number",
    Date => "date",
    Boolean => "boolean",
    Array => "array",
    Object => "object",
});

str_enum!(ExclusionType {
    Residential => "residential",
    LaborLaw => "labor_law",
    Asbestos => "asbestos",
    Lead => "lead",
    Mold => "mold",
    Silica => "silica",
    Pollution => "pollution",
    ProfessionalLiability => "professional_liability",
    Cyber => "cyber",
    Eifs => "eifs",
    ActionOver => "action_over",
    WrapUp => "wrap_up",
});

impl InsuranceType {
    /// The ACORD coverage block this type is evaluated against, if any.
    pub fn coverage_kind(&self) -> Option<CoverageKind> {
        match self {
            Self::GeneralLiability => Some(CoverageKind::General),
            Self::AutoLiability => Some(CoverageKind::Auto),
            Self::WorkersCompensation => Some(CoverageKind::WorkersComp),
            Self::UmbrellaPolicy => Some(CoverageKind::Umbrella),
            Self::ProfessionalLiability | Self::PollutionLiability => None,
        }
    }
}

impl CoverageKind {
    pub const ALL: [CoverageKind; 4] = [
        CoverageKind::General,
        CoverageKind::Auto,
        CoverageKind::WorkersComp,
        CoverageKind::Umbrella,
    ];

    /// Field-name prefix used in the flat field map (`gl_policy_number`, ...).
    pub fn prefix(&self) -> &'static str {
        self.as_str()
    }

    /// Human title used in deficiency text.
    pub fn title(&self) -> &'static str {
        match self {
            Self::General => "General Liability",
            Self::Auto => "Automobile Liability",
            Self::WorkersComp => "Workers Compensation",
            Self::Umbrella => "Umbrella Liability",
        }
    }

    pub fn from_prefix(field: &str) -> Option<(CoverageKind, &str)> {
        Self::ALL.iter().find_map(|kind| {
            field
                .strip_prefix(kind.prefix())
                .and_then(|rest| rest.strip_prefix('_'))
                .map(|suffix| (*kind, suffix))
        })
    }
}

impl ExclusionType {
    /// Higher wins when one line matches several families.
    pub fn specificity(&self) -> u8 {
        match self {
            Self::LaborLaw => 9,
            Self::Asbestos | Self::Lead | Self::Silica => 8,
            Self::Mold | Self::Eifs => 7,
            Self::ActionOver | Self::WrapUp => 6,
            Self::ProfessionalLiability | Self::Cyber => 5,
            Self::Residential => 4,
            Self::Pollution => 3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn severity_round_trips_through_str() {
        for s in ["critical", "high", "medium", "low"] {
            assert_eq!(Severity::from_str(s).unwrap().as_str(), s);
        }
    }

    #[test]
    fn severity_orders_critical_first() {
        let mut all = vec![Severity::Low, Severity::Critical, Severity::Medium, Severity::High];
        all.sort();
        assert_eq!(
            all,
            vec![Severity::Critical, Severity::High, Severity::Medium, Severity::Low]
        );
    }

    #[test]
    fn unknown_insurance_type_is_rejected() {
        let err = InsuranceType::from_str("marine_cargo").unwrap_err();
        assert_eq!(err.field, "InsuranceType");
        assert_eq!(err.value, "marine_cargo");
    }

    #[test]
    fn coverage_prefix_split() {
        assert_eq!(
            CoverageKind::from_prefix("gl_policy_number"),
            Some((CoverageKind::General, "policy_number"))
        );
        assert_eq!(
            CoverageKind::from_prefix("umbrella_aggregate"),
            Some((CoverageKind::Umbrella, "aggregate"))
        );
        assert_eq!(CoverageKind::from_prefix("named_insured"), None);
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&InsuranceType::WorkersCompensation).unwrap();
        assert_eq!(json, "\"workers_compensation\"");
        let kind: CoverageKind = serde_json::from_str("\"wc\"").unwrap();
        assert_eq!(kind, CoverageKind::WorkersComp);
    }

    #[test]
    fn professional_has_no_acord_block() {
        assert_eq!(InsuranceType::ProfessionalLiability.coverage_kind(), None);
        assert_eq!(
            InsuranceType::UmbrellaPolicy.coverage_kind(),
            Some(CoverageKind::Umbrella)
        );
    }
}
