//! Certificate fields vs. a resolved requirement set.
//!
//! Every check is deterministic given the fields, the requirements, the
//! project and the evaluation instant.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::models::{
    format_usd, limit_field, Coverage, CoverageKind, Deficiency, DeficiencyCategory, FieldMap, FieldValue,
    PolicyAnalysis, ProjectContext, RequirementRecord, Severity,
};
use crate::pipeline::extraction::limits::parse_amount;
use crate::pipeline::extraction::policy::parse_date;
use crate::pipeline::requirements::{normalize_tier, RequirementError};

/// Evaluate against the current time.
pub fn evaluate_compliance(
    fields: &FieldMap,
    requirements: &[RequirementRecord],
    project: &ProjectContext,
) -> PolicyAnalysis {
    evaluate_compliance_at(fields, requirements, project, Utc::now())
}

pub fn evaluate_compliance_at(
    fields: &FieldMap,
    requirements: &[RequirementRecord],
    project: &ProjectContext,
    now: DateTime<Utc>,
) -> PolicyAnalysis {
    let tier = requirements
        .iter()
        .find_map(|r| r.tier.as_deref())
        .map(normalize_tier);
    let mut analysis = PolicyAnalysis::new(now, tier);

    let mut needs_additional_insured = false;
    let mut needs_waiver = false;

    for requirement in requirements {
        let insurance_type = match requirement.parsed_type() {
            Ok(t) => t,
            Err(e) => {
                let err = RequirementError::from(e);
                warn!(program_id = %requirement.program_id, error = %err, "Skipping requirement");
                analysis.note_skipped(&requirement.insurance_type);
                continue;
            }
        };
        let Some(kind) = insurance_type.coverage_kind() else {
            debug!(insurance_type = %insurance_type, "No certificate block for insurance type, skipping");
            continue;
        };

        let coverage = Coverage::build(kind, fields);
        for (field, minimum) in &requirement.minimums {
            if let Some(deficiency) = check_minimum(fields, &coverage, field, *minimum) {
                analysis.push(deficiency);
            }
        }

        needs_additional_insured |= requirement.additional_insured_required;
        needs_waiver |= requirement.waiver_required;
        debug!(insurance_type = %insurance_type, minimums = requirement.minimums.len(), "Requirement evaluated");
    }

    if needs_additional_insured && fields.flag("additional_insured") != Some(true) {
        analysis.push(
            Deficiency::new(
                Severity::High,
                DeficiencyCategory::Endorsements,
                "additional_insured",
                "Additional Insured Endorsement Missing",
                "The program requires additional insured status; the certificate does not show it.",
            )
            .with_values(fields.get("additional_insured").cloned(), Some(FieldValue::Boolean(true))),
        );
    }

    if needs_waiver && fields.flag("waiver_of_subrogation") != Some(true) {
        analysis.push(
            Deficiency::new(
                Severity::Medium,
                DeficiencyCategory::Endorsements,
                "waiver_of_subrogation",
                "Waiver of Subrogation Missing",
                "The program requires a waiver of subrogation; the certificate does not show one.",
            )
            .with_values(fields.get("waiver_of_subrogation").cloned(), Some(FieldValue::Boolean(true))),
        );
    }

    analysis.extend(check_named_insured(fields, project));
    analysis.extend(check_certificate_holder(fields, project));
    analysis.extend(check_expirations(fields, now.date_naive()));

    info!(
        status = %analysis.status(),
        deficiencies = analysis.deficiencies().len(),
        critical = analysis.severity_counts().critical,
        high = analysis.severity_counts().high,
        tier = ?analysis.tier(),
        "Compliance evaluation complete"
    );
    analysis
}

/// Title used in deficiency text for a minimum field.
fn field_title(field: &str) -> String {
    if let Some(limit) = limit_field(field) {
        return limit.title.to_string();
    }
    let words = match CoverageKind::from_prefix(field) {
        Some((kind, suffix)) => format!("{} {}", kind.title(), suffix.replace('_', " ")),
        None => field.replace('_', " "),
    };
    words
        .split_whitespace()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Certificate amount for a minimum field. Limits are read through the
/// typed coverage view; anything else falls back to the flat map.
fn certificate_amount(fields: &FieldMap, coverage: &Coverage, field: &str) -> Option<f64> {
    let typed = coverage
        .block()
        .limits()
        .into_iter()
        .find(|(limit, _)| limit.field == field)
        .map(|(_, amount)| amount);
    match typed {
        Some(amount) => amount,
        None => match fields.get(field)? {
            FieldValue::Number(n) => Some(*n),
            FieldValue::Text(s) => parse_amount(s),
            _ => None,
        },
    }
}

fn check_minimum(fields: &FieldMap, coverage: &Coverage, field: &str, minimum: f64) -> Option<Deficiency> {
    let title = field_title(field);
    match certificate_amount(fields, coverage, field) {
        None => Some(
            Deficiency::new(
                Severity::High,
                DeficiencyCategory::Coverage,
                field,
                format!("{title} Missing"),
                format!("The certificate shows no {title} limit; the program requires {}.", format_usd(minimum)),
            )
            .with_values(None, Some(FieldValue::Number(minimum))),
        ),
        Some(current) if current < minimum => Some(
            Deficiency::new(
                Severity::High,
                DeficiencyCategory::Limits,
                field,
                format!("{title} Below Program Minimum"),
                format!(
                    "The certificate shows {} for {title}; the program requires {}.",
                    format_usd(current),
                    format_usd(minimum)
                ),
            )
            .with_values(Some(FieldValue::Number(current)), Some(FieldValue::Number(minimum))),
        ),
        Some(_) => None,
    }
}

fn check_named_insured(fields: &FieldMap, project: &ProjectContext) -> Option<Deficiency> {
    let named = fields.text("named_insured")?.trim();
    let expected = project.subcontractor_name.as_deref()?.trim();
    if named.is_empty() || expected.is_empty() || named.to_lowercase() == expected.to_lowercase() {
        return None;
    }
    Some(
        Deficiency::new(
            Severity::Critical,
            DeficiencyCategory::Identity,
            "named_insured",
            "Named Insured Mismatch",
            format!("The certificate names \"{named}\" but the subcontractor is \"{expected}\"."),
        )
        .with_values(
            Some(FieldValue::Text(named.to_string())),
            Some(FieldValue::Text(expected.to_string())),
        ),
    )
}

fn check_certificate_holder(fields: &FieldMap, project: &ProjectContext) -> Option<Deficiency> {
    let gc = project.gc_name.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
    let holder = fields.text("certificate_holder");
    if holder.is_some_and(|h| h.to_lowercase().contains(&gc.to_lowercase())) {
        return None;
    }
    Some(
        Deficiency::new(
            Severity::Medium,
            DeficiencyCategory::Identity,
            "certificate_holder",
            "Certificate Holder Does Not Name General Contractor",
            format!("The certificate holder must include \"{gc}\"."),
        )
        .with_values(
            holder.map(|h| FieldValue::Text(h.to_string())),
            Some(FieldValue::Text(gc.to_string())),
        ),
    )
}

/// One critical deficiency per coverage whose expiration is in the past or
/// unreadable. A policy expiring today is still in force.
fn check_expirations(fields: &FieldMap, today: NaiveDate) -> Vec<Deficiency> {
    let mut deficiencies = Vec::new();
    for kind in CoverageKind::ALL {
        let field = format!("{}_expiration_date", kind.prefix());
        let Some(value) = fields.get(&field) else {
            continue;
        };
        let parsed = match value {
            FieldValue::Date(d) => Some(*d),
            FieldValue::Text(s) => parse_date(s),
            _ => None,
        };
        match parsed {
            Some(expires) if expires < today => deficiencies.push(
                Deficiency::new(
                    Severity::Critical,
                    DeficiencyCategory::Dates,
                    field.as_str(),
                    format!("{} Policy Expired", kind.title()),
                    format!(
                        "The {} policy expired on {}.",
                        kind.title(),
                        expires.format("%m/%d/%Y")
                    ),
                )
                .with_values(Some(FieldValue::Date(expires)), Some(FieldValue::Date(today))),
            ),
            Some(_) => {}
            None => deficiencies.push(
                Deficiency::new(
                    Severity::Critical,
                    DeficiencyCategory::Dates,
                    field.as_str(),
                    format!("Invalid {} Expiration Date", kind.title()),
                    format!("\"{value}\" is not a recognizable date."),
                )
                .with_values(Some(value.clone()), None),
            ),
        }
    }
    deficiencies
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InsuranceType;
    use chrono::TimeZone;

    fn make_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn make_project() -> ProjectContext {
        ProjectContext {
            project_name: Some("Hudson Yards Tower B".into()),
            gc_name: Some("Main Street Contractors".into()),
            subcontractor_name: Some("ABC Plumbing Corp".into()),
            ..Default::default()
        }
    }

    fn make_fields() -> FieldMap {
        let mut f = FieldMap::new();
        f.insert("named_insured", "ABC Plumbing Corp");
        f.insert("certificate_holder", "Main Street Contractors\n1 Main St, New York, NY");
        f.insert("gl_policy_number", "GL-2024-001234");
        f.insert("gl_expiration_date", ymd(2027, 1, 1));
        f.insert("gl_each_occurrence", 1_000_000.0);
        f.insert("gl_general_aggregate", 2_000_000.0);
        f.insert("wc_expiration_date", ymd(2027, 1, 1));
        f.insert("wc_el_each_accident", 1_000_000.0);
        f.insert("additional_insured", true);
        f.insert("waiver_of_subrogation", true);
        f
    }

    fn make_requirements() -> Vec<RequirementRecord> {
        vec![
            RequirementRecord::new("p1", InsuranceType::GeneralLiability)
                .with_tier("Tier A")
                .with_minimum("gl_each_occurrence", 1_000_000.0)
                .with_minimum("gl_general_aggregate", 2_000_000.0)
                .requiring_additional_insured()
                .requiring_waiver(),
            RequirementRecord::new("p1", InsuranceType::WorkersCompensation)
                .with_tier("Tier A")
                .with_minimum("wc_el_each_accident", 1_000_000.0),
        ]
    }

    #[test]
    fn fully_compliant_certificate_is_approved() {
        let analysis =
            evaluate_compliance_at(&make_fields(), &make_requirements(), &make_project(), make_now());
        assert!(analysis.is_approved(), "{:?}", analysis.deficiencies());
        assert_eq!(analysis.tier(), Some("a"));
    }

    #[test]
    fn below_minimum_is_one_high_with_verbatim_values() {
        let mut fields = make_fields();
        fields.insert("gl_each_occurrence", 500_000.0);
        let analysis = evaluate_compliance_at(&fields, &make_requirements(), &make_project(), make_now());

        assert_eq!(analysis.deficiencies().len(), 1);
        let d = &analysis.deficiencies()[0];
        assert_eq!(d.severity, Severity::High);
        assert_eq!(d.title, "General Liability Each Occurrence Below Program Minimum");
        assert_eq!(d.current_value, Some(FieldValue::Number(500_000.0)));
        assert_eq!(d.required_value, Some(FieldValue::Number(1_000_000.0)));
        assert!(d.description.contains("$500,000"));
    }

    #[test]
    fn missing_limit_is_high() {
        let mut fields = make_fields();
        fields.remove("wc_el_each_accident");
        let analysis = evaluate_compliance_at(&fields, &make_requirements(), &make_project(), make_now());
        assert_eq!(analysis.deficiencies().len(), 1);
        assert_eq!(analysis.deficiencies()[0].title, "Employers Liability Each Accident Missing");
        assert_eq!(analysis.severity_counts().high, 1);
    }

    #[test]
    fn endorsement_flags_required() {
        let mut fields = make_fields();
        fields.insert("additional_insured", false);
        fields.remove("waiver_of_subrogation");
        let analysis = evaluate_compliance_at(&fields, &make_requirements(), &make_project(), make_now());
        let counts = analysis.severity_counts();
        assert_eq!((counts.high, counts.medium), (1, 1));
    }

    #[test]
    fn named_insured_mismatch_is_critical() {
        let mut fields = make_fields();
        fields.insert("named_insured", "  abc plumbing corp ");
        let ok = evaluate_compliance_at(&fields, &[], &make_project(), make_now());
        assert!(ok.is_approved());

        fields.insert("named_insured", "XYZ Roofing LLC");
        let analysis = evaluate_compliance_at(&fields, &[], &make_project(), make_now());
        assert_eq!(analysis.severity_counts().critical, 1);
        assert_eq!(analysis.deficiencies()[0].category, DeficiencyCategory::Identity);
    }

    #[test]
    fn named_insured_match_ignores_non_ascii_case() {
        let mut fields = make_fields();
        fields.insert("named_insured", "FAÇADE BÂTIMENT SARL");
        let project = ProjectContext {
            subcontractor_name: Some("Façade Bâtiment SARL".into()),
            ..make_project()
        };
        let analysis = evaluate_compliance_at(&fields, &[], &project, make_now());
        assert_eq!(analysis.severity_counts().critical, 0);
        assert!(analysis.is_approved());
    }

    #[test]
    fn holder_must_contain_gc() {
        let mut fields = make_fields();
        fields.insert("certificate_holder", "Some Other Builder");
        let analysis = evaluate_compliance_at(&fields, &[], &make_project(), make_now());
        assert_eq!(analysis.severity_counts().medium, 1);

        fields.remove("certificate_holder");
        let analysis = evaluate_compliance_at(&fields, &[], &make_project(), make_now());
        assert_eq!(analysis.severity_counts().medium, 1);
    }

    #[test]
    fn expired_policies_one_per_coverage() {
        let mut fields = make_fields();
        fields.insert("gl_expiration_date", ymd(2026, 5, 31));
        fields.insert("wc_expiration_date", ymd(2025, 1, 1));
        let analysis = evaluate_compliance_at(&fields, &[], &make_project(), make_now());
        assert_eq!(analysis.severity_counts().critical, 2);
        assert!(analysis.deficiencies().iter().all(|d| d.category == DeficiencyCategory::Dates));
    }

    #[test]
    fn expiring_today_is_still_valid() {
        let mut fields = make_fields();
        fields.insert("gl_expiration_date", ymd(2026, 6, 1));
        let analysis = evaluate_compliance_at(&fields, &[], &make_project(), make_now());
        assert!(analysis.is_approved());
    }

    #[test]
    fn unparseable_expiration_is_critical() {
        let mut fields = make_fields();
        fields.insert("gl_expiration_date", "sometime next year");
        let analysis = evaluate_compliance_at(&fields, &[], &make_project(), make_now());
        assert_eq!(analysis.severity_counts().critical, 1);
        assert_eq!(analysis.deficiencies()[0].title, "Invalid General Liability Expiration Date");

        fields.insert("gl_expiration_date", "12/31/2026");
        assert!(evaluate_compliance_at(&fields, &[], &make_project(), make_now()).is_approved());
    }

    #[test]
    fn unknown_and_unevaluated_types_are_skipped() {
        let mut marine = RequirementRecord::new("p1", InsuranceType::GeneralLiability)
            .with_minimum("gl_each_occurrence", 9_000_000.0);
        marine.insurance_type = "marine_cargo".into();
        let professional = RequirementRecord::new("p1", InsuranceType::ProfessionalLiability)
            .with_minimum("professional_each_claim", 1_000_000.0);

        let analysis =
            evaluate_compliance_at(&make_fields(), &[marine, professional], &make_project(), make_now());
        assert!(analysis.is_approved());
        assert_eq!(analysis.skipped_requirements(), &["marine_cargo".to_string()]);
    }
}
